use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::ClientConfig;
use crate::constants::{
    MSG_DOWNLOAD_FAILED, MSG_FETCH_FAILED, MSG_IMAGE_LOAD_FAILED, MSG_INVALID_BATCH_ID,
    MSG_MISSING_IMAGE_URL, MSG_NO_IMAGES_FOUND, MSG_ZOOM_LOAD_FAILED,
};
use crate::error::ClientError;
use crate::hooks::{BatchBackend, ComparisonRenderer, ImageSide, ObjectStore};
use crate::models::parse_image_pairs;
use crate::validation::validate_batch_id;

use super::downloads::{DownloadKey, DownloadRegistry, ObjectLease};
use super::state::{PairView, ViewerPhase, ViewerState, ZoomState};

/// Result of one download request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Saved under `file_name`, as reported by the store
    Saved { file_name: String },
    /// A download for the same key is still running
    Busy,
    MissingUrl,
    Failed,
}

/// Batch result viewer: fetches before/after pairs by batch id and drives zoom and
/// downloads.
///
/// Cloning is cheap; clones share state, so concurrent downloads can run from
/// separate tasks. The state lock is never held across a network call.
#[derive(Clone)]
pub struct BatchViewer {
    state: Arc<Mutex<ViewerState>>,
    downloads: DownloadRegistry,
    backend: Arc<dyn BatchBackend>,
    store: Arc<dyn ObjectStore>,
    placeholder_url: String,
    default_download_name: String,
}

impl BatchViewer {
    pub fn new(
        backend: Arc<dyn BatchBackend>,
        store: Arc<dyn ObjectStore>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(ViewerState::default())),
            downloads: DownloadRegistry::new(),
            backend,
            store,
            placeholder_url: config.placeholder_url.clone(),
            default_download_name: config.default_download_name.clone(),
        }
    }

    pub async fn snapshot(&self) -> ViewerState {
        self.state.lock().await.clone()
    }

    /// First display of the viewer. A batch id carried by the route is fetched once;
    /// later calls do nothing.
    pub async fn mount(&self, route_batch_id: Option<String>) -> Result<(), ClientError> {
        let batch_id = {
            let mut state = self.state.lock().await;
            if state.mounted {
                return Ok(());
            }
            state.mounted = true;
            match route_batch_id {
                Some(id) => {
                    state.batch_input = id.clone();
                    id
                }
                None => return Ok(()),
            }
        };

        self.fetch(&batch_id).await.map(|_| ())
    }

    /// Edit the typed batch id; clears the current error message
    pub async fn set_batch_input(&self, input: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.batch_input = input.into();
        state.error_message = None;
    }

    /// Fetch the typed batch id
    pub async fn submit(&self) -> Result<usize, ClientError> {
        let input = self.state.lock().await.batch_input.clone();
        self.fetch(&input).await
    }

    /// Fetch a batch and replace the displayed pairs. Returns the number of pairs shown.
    ///
    /// Overlapping fetches are not de-duplicated; whichever response resolves last
    /// determines the final state.
    pub async fn fetch(&self, raw_batch_id: &str) -> Result<usize, ClientError> {
        let batch_id = match validate_batch_id(raw_batch_id) {
            Ok(id) => id,
            Err(e) => {
                let mut state = self.state.lock().await;
                state.phase = ViewerPhase::Failed;
                state.pairs.clear();
                state.show_error(MSG_INVALID_BATCH_ID);
                tracing::debug!("Batch fetch blocked: empty batch id");
                return Err(e);
            }
        };

        {
            let mut state = self.state.lock().await;
            state.phase = ViewerPhase::Loading;
            state.error_message = None;
        }
        tracing::debug!(batch_id = %batch_id, "Fetching batch");

        let result = match self.backend.fetch_batch(&batch_id).await {
            Ok(body) => parse_image_pairs(&body),
            Err(e) => Err(e),
        };

        let mut state = self.state.lock().await;
        match result {
            Ok(Some(pairs)) => {
                let count = pairs.len();
                state.pairs = pairs.into_iter().map(PairView::from).collect();
                state.phase = ViewerPhase::Loaded;
                tracing::info!(batch_id = %batch_id, count, "Batch loaded");
                Ok(count)
            }
            Ok(None) => {
                state.pairs.clear();
                state.phase = ViewerPhase::Empty;
                state.show_error(MSG_NO_IMAGES_FOUND);
                tracing::info!(batch_id = %batch_id, "Batch has no images");
                Ok(0)
            }
            Err(e) => {
                state.pairs.clear();
                state.phase = ViewerPhase::Failed;
                state.show_error(MSG_FETCH_FAILED);
                tracing::warn!(batch_id = %batch_id, error = %e, "Batch fetch failed");
                Err(e)
            }
        }
    }

    /// One side of a card failed to load: show the placeholder and a non-blocking notice
    pub async fn image_failed(&self, index: usize, side: ImageSide) {
        let mut state = self.state.lock().await;
        let Some(view) = state.pairs.get_mut(index) else {
            tracing::debug!(index, "Load failure reported for unknown card");
            return;
        };

        let url = match side {
            ImageSide::Before => std::mem::replace(&mut view.before_src, self.placeholder_url.clone()),
            ImageSide::After => std::mem::replace(&mut view.after_src, self.placeholder_url.clone()),
        };
        let err = ClientError::ResourceLoad { url };
        tracing::warn!(index, side = ?side, error = %err, "Image failed to load");
        state.show_error(MSG_IMAGE_LOAD_FAILED);
    }

    /// Open the zoom modal on a card's after image. Returns false when there is nothing
    /// to show.
    pub async fn open_zoom(&self, index: usize) -> bool {
        let mut state = self.state.lock().await;
        let zoom = match state.pairs.get(index) {
            Some(view) if !view.pair.after_url.is_empty() => ZoomState {
                url: view.pair.after_url.clone(),
                file_name: view.pair.file_name.clone(),
            },
            _ => return false,
        };
        state.zoom = Some(zoom);
        true
    }

    pub async fn close_zoom(&self) {
        self.state.lock().await.zoom = None;
    }

    /// A click inside the modal closes it only when it landed on the overlay itself
    pub async fn overlay_clicked(&self, on_overlay: bool) {
        if on_overlay {
            self.close_zoom().await;
        }
    }

    pub async fn zoom_image_failed(&self) {
        let mut state = self.state.lock().await;
        if let Some(zoom) = state.zoom.take() {
            tracing::warn!(url = %zoom.url, "Zoomed image failed to load");
        }
        state.show_error(MSG_ZOOM_LOAD_FAILED);
    }

    /// Download the after image of the card at `index`
    pub async fn download_pair(&self, index: usize) -> DownloadOutcome {
        let target = {
            let state = self.state.lock().await;
            state.pairs.get(index).map(|view| {
                (
                    view.pair.after_url.clone(),
                    view.pair.download_name(&self.default_download_name),
                )
            })
        };

        match target {
            Some((url, file_name)) => {
                self.download(DownloadKey::Pair(index), Some(url), file_name)
                    .await
            }
            None => self.download(DownloadKey::Pair(index), None, String::new()).await,
        }
    }

    /// Download the image shown in the zoom modal
    pub async fn download_zoomed(&self) -> DownloadOutcome {
        let target = self.state.lock().await.zoom.clone();
        match target {
            Some(zoom) => {
                let file_name = zoom
                    .file_name
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| self.default_download_name.clone());
                self.download(DownloadKey::Modal, Some(zoom.url), file_name)
                    .await
            }
            None => self.download(DownloadKey::Modal, None, String::new()).await,
        }
    }

    /// Fetch `url`, materialize it through the object store and save it as `file_name`.
    ///
    /// The key's busy flag and the local object are released on every exit path. A
    /// failure only sets the error message; pairs and other keys are untouched.
    pub async fn download(
        &self,
        key: DownloadKey,
        url: Option<String>,
        file_name: String,
    ) -> DownloadOutcome {
        let Some(url) = url.filter(|u| !u.is_empty()) else {
            self.state.lock().await.show_error(MSG_MISSING_IMAGE_URL);
            tracing::debug!(key = %key, "Download skipped: no image URL");
            return DownloadOutcome::MissingUrl;
        };

        let Some(_guard) = self.downloads.try_acquire(key) else {
            tracing::debug!(key = %key, "Download already in progress");
            return DownloadOutcome::Busy;
        };

        tracing::debug!(key = %key, url = %url, "Downloading image");
        match self.fetch_and_save(&url, &file_name).await {
            Ok(saved_name) => {
                tracing::info!(key = %key, file_name = %saved_name, "Image downloaded");
                DownloadOutcome::Saved {
                    file_name: saved_name,
                }
            }
            Err(e) => {
                tracing::warn!(key = %key, url = %url, error = %e, "Download failed");
                self.state.lock().await.show_error(MSG_DOWNLOAD_FAILED);
                DownloadOutcome::Failed
            }
        }
    }

    async fn fetch_and_save(&self, url: &str, file_name: &str) -> Result<String, ClientError> {
        let bytes = self.backend.fetch_image(url).await?;
        let object = self.store.create_object(bytes)?;
        let lease = ObjectLease::new(Arc::clone(&self.store), object);
        lease.save_as(file_name)
    }

    pub fn is_downloading(&self, key: DownloadKey) -> bool {
        self.downloads.is_busy(key)
    }

    pub async fn count_text(&self) -> Option<String> {
        self.state.lock().await.count_text()
    }

    /// Hand every card to the comparison control, in response order
    pub async fn render(&self, renderer: &mut dyn ComparisonRenderer) {
        let state = self.state.lock().await;
        for (index, view) in state.pairs.iter().enumerate() {
            renderer.render_pair(
                index,
                &view.pair.display_name(index),
                &view.before_src,
                &view.after_src,
            );
        }
    }
}
