//! ImageFlow CLI: upload images with edits and review processed batches.
//!
//! Reads IMAGEFLOW_API_URL (or API_URL) and the other IMAGEFLOW_* settings from the
//! environment or a `.env` file.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use futures::future::join_all;
use imageflow_api_client::ApiClient;
use imageflow_cli::{init_tracing, parse_edit, ConsoleNotifier, EditAction, FsObjectStore, TextRenderer};
use imageflow_core::models::SelectedImage;
use imageflow_core::upload::{PreviewLoader, UploadSession};
use imageflow_core::validation::route_batch_id;
use imageflow_core::viewer::{BatchViewer, DownloadOutcome};
use imageflow_core::{ClientConfig, ErrorMetadata};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "imageflow", about = "ImageFlow processing service CLI")]
struct Cli {
    /// Override the backend base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload images with per-image edits
    Upload {
        /// Address notified when processing finishes
        #[arg(long)]
        email: String,
        /// Edit as INDEX:FILTER[=VALUE], e.g. 0:resize=800x600 or 1:grayscale
        #[arg(long = "edit")]
        edits: Vec<String>,
        /// Print the metadata document and previews instead of uploading
        #[arg(long)]
        dry_run: bool,
        /// Image files, in upload order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Show the before/after pairs of a batch
    Fetch {
        /// Batch id
        batch_id: String,
    },
    /// Download processed images of a batch
    Download {
        /// Batch id
        batch_id: String,
        /// Positions to download (all when omitted)
        #[arg(long = "index")]
        indices: Vec<usize>,
        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Extract the batch id from a location such as /processed/<id>
    Route {
        location: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    if let Commands::Route { location } = &cli.command {
        match route_batch_id(location) {
            Some(id) => println!("{}", id),
            None => println!("No batch id in route; enter one manually"),
        }
        return Ok(());
    }

    let mut config = ClientConfig::from_env().context("Failed to load configuration")?;
    if let Some(api_url) = cli.api_url {
        config = config.with_api_url(api_url);
    }
    let client = Arc::new(
        ApiClient::new(config.clone())
            .context("Failed to create API client. Check IMAGEFLOW_API_URL (or API_URL)")?,
    );

    match cli.command {
        Commands::Upload {
            email,
            edits,
            dry_run,
            files,
        } => upload(client, email, edits, dry_run, files).await,
        Commands::Fetch { batch_id } => {
            let viewer = open_batch(client, &config, &batch_id, PathBuf::from(".")).await?;
            let mut renderer = TextRenderer::new();
            viewer.render(&mut renderer).await;
            println!("{}", renderer.into_output());
            Ok(())
        }
        Commands::Download {
            batch_id,
            indices,
            out,
        } => download(client, &config, &batch_id, indices, out).await,
        Commands::Route { .. } => Ok(()),
    }
}

async fn upload(
    client: Arc<ApiClient>,
    email: String,
    edits: Vec<String>,
    dry_run: bool,
    files: Vec<PathBuf>,
) -> anyhow::Result<()> {
    let mut images = Vec::with_capacity(files.len());
    for path in &files {
        images.push(SelectedImage::from_path(path).await?);
    }

    let session = UploadSession::new(client, Arc::new(ConsoleNotifier));
    session.set_email(email).await;
    session.select_files(images.clone()).await;

    for raw in &edits {
        let edit = parse_edit(raw)?;
        match edit.action {
            EditAction::Rename(name) => session.rename_image(edit.index, name).await?,
            EditAction::Filters(updates) => {
                for update in updates {
                    session.update_filter(edit.index, update).await?;
                }
            }
        }
    }

    if dry_run {
        let mut form = session.snapshot().await;
        let validation = form.validate();
        println!("{}", serde_json::to_string_pretty(&form.to_document())?);

        let mut previews = PreviewLoader::new();
        previews.load(&images).await;
        previews.wait().await;
        for (index, image) in images.iter().enumerate() {
            let preview_len = previews.preview(index).await.map(|p| p.len()).unwrap_or(0);
            println!("{}: {} bytes, preview {} chars", image.name, image.size(), preview_len);
        }

        if let Err(e) = validation {
            for (index, message) in form.image_errors() {
                eprintln!("image {}: {}", index, message);
            }
            bail!(e.client_message());
        }
        return Ok(());
    }

    match session.submit().await {
        Ok(receipt) => {
            if let Some(batch_id) = receipt.batch_id() {
                println!("Batch id: {}", batch_id);
            }
            Ok(())
        }
        Err(e) => {
            for (index, message) in session.snapshot().await.image_errors() {
                eprintln!("image {}: {}", index, message);
            }
            Err(anyhow::Error::new(e).context("Upload failed"))
        }
    }
}

/// Mount a viewer on `batch_id` and print the batch summary
async fn open_batch(
    client: Arc<ApiClient>,
    config: &ClientConfig,
    batch_id: &str,
    out: PathBuf,
) -> anyhow::Result<BatchViewer> {
    let store = Arc::new(FsObjectStore::new(out)?);
    let viewer = BatchViewer::new(client, store, config);

    let result = viewer.mount(Some(batch_id.to_string())).await;
    let state = viewer.snapshot().await;
    if let Some(message) = &state.error_message {
        eprintln!("{}", message);
    }
    if let Err(e) = result {
        tracing::debug!(error = %e.detailed_message(), "Fetch failed");
        bail!(e.client_message());
    }
    if let Some(count) = state.count_text() {
        println!("{}", count);
    }

    Ok(viewer)
}

async fn download(
    client: Arc<ApiClient>,
    config: &ClientConfig,
    batch_id: &str,
    indices: Vec<usize>,
    out: PathBuf,
) -> anyhow::Result<()> {
    let viewer = open_batch(client, config, batch_id, out).await?;
    let indices = if indices.is_empty() {
        (0..viewer.snapshot().await.pairs.len()).collect()
    } else {
        indices
    };

    let outcomes = join_all(indices.iter().map(|&index| {
        let viewer = viewer.clone();
        async move { (index, viewer.download_pair(index).await) }
    }))
    .await;

    let mut failed = 0;
    for (index, outcome) in outcomes {
        match outcome {
            DownloadOutcome::Saved { file_name } => println!("[{}] saved {}", index, file_name),
            other => {
                failed += 1;
                eprintln!("[{}] {:?}", index, other);
            }
        }
    }

    if failed > 0 {
        if let Some(message) = viewer.snapshot().await.error_message {
            eprintln!("{}", message);
        }
        bail!("{} of {} downloads failed", failed, indices.len());
    }
    Ok(())
}
