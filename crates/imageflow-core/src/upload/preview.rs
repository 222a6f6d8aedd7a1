use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::models::SelectedImage;

/// Encode bytes as a `data:` URL
pub fn data_url(content_type: &str, content: &[u8]) -> String {
    format!("data:{};base64,{}", content_type, STANDARD.encode(content))
}

type Encoder = Arc<dyn Fn(&str, &[u8]) -> String + Send + Sync>;

/// Builds preview data URLs for the current selection on the blocking pool.
///
/// Loading a new selection (or dropping the loader) aborts every read that has not
/// started yet. A read already running completes, and its generation check discards
/// the result.
pub struct PreviewLoader {
    previews: Arc<Mutex<HashMap<usize, String>>>,
    generation: Arc<AtomicU64>,
    discarded: Arc<AtomicU64>,
    encoder: Encoder,
    tasks: Vec<JoinHandle<()>>,
}

impl Default for PreviewLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewLoader {
    pub fn new() -> Self {
        Self::with_encoder(Arc::new(data_url))
    }

    fn with_encoder(encoder: Encoder) -> Self {
        Self {
            previews: Arc::new(Mutex::new(HashMap::new())),
            generation: Arc::new(AtomicU64::new(0)),
            discarded: Arc::new(AtomicU64::new(0)),
            encoder,
            tasks: Vec::new(),
        }
    }

    /// Start reading previews for `images`, replacing any previous selection
    pub async fn load(&mut self, images: &[SelectedImage]) {
        self.cancel();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.previews.lock().await.clear();

        for (index, image) in images.iter().enumerate() {
            let previews = Arc::clone(&self.previews);
            let current = Arc::clone(&self.generation);
            let discarded = Arc::clone(&self.discarded);
            let encoder = Arc::clone(&self.encoder);
            let content_type = image.content_type.clone();
            let content = image.content.clone();
            let name = image.name.clone();

            self.tasks.push(tokio::task::spawn_blocking(move || {
                let url = encoder(content_type.as_str(), &content[..]);
                let mut previews = previews.blocking_lock();
                if current.load(Ordering::SeqCst) == generation {
                    previews.insert(index, url);
                } else {
                    discarded.fetch_add(1, Ordering::SeqCst);
                    tracing::debug!(index, name = %name, "Discarding stale preview");
                }
            }));
        }
    }

    /// Abort every read that has not started
    pub fn cancel(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }

    /// Wait until every read of the current selection has settled
    pub async fn wait(&mut self) {
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    tracing::warn!(error = %e, "Preview read panicked");
                }
            }
        }
    }

    pub async fn preview(&self, index: usize) -> Option<String> {
        self.previews.lock().await.get(&index).cloned()
    }

    pub async fn loaded_count(&self) -> usize {
        self.previews.lock().await.len()
    }

    /// Reads that finished after their selection was replaced
    pub fn discarded_count(&self) -> u64 {
        self.discarded.load(Ordering::SeqCst)
    }
}

impl Drop for PreviewLoader {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn data_url_format() {
        assert_eq!(data_url("image/png", b"hi"), "data:image/png;base64,aGk=");
    }

    #[tokio::test]
    async fn previews_are_built_for_each_image() {
        let images = vec![
            SelectedImage::new("a.png", b"aaa".to_vec()),
            SelectedImage::new("b.jpg", b"bbb".to_vec()),
        ];
        let mut loader = PreviewLoader::new();
        loader.load(&images).await;
        loader.wait().await;

        assert_eq!(loader.loaded_count().await, 2);
        assert_eq!(
            loader.preview(1).await.as_deref(),
            Some(data_url("image/jpeg", b"bbb").as_str())
        );
    }

    #[tokio::test]
    async fn new_selection_replaces_stale_reads() {
        let first = vec![
            SelectedImage::new("old0.png", b"old0".to_vec()),
            SelectedImage::new("old1.png", b"old1".to_vec()),
        ];
        let second = vec![SelectedImage::new("new.png", b"new".to_vec())];

        let mut loader = PreviewLoader::new();
        loader.load(&first).await;
        loader.load(&second).await;
        loader.wait().await;

        assert_eq!(loader.loaded_count().await, 1);
        assert_eq!(
            loader.preview(0).await.as_deref(),
            Some(data_url("image/png", b"new").as_str())
        );
        assert_eq!(loader.preview(1).await, None);
    }

    #[tokio::test]
    async fn stale_read_finishing_after_reload_is_discarded() {
        let (release, gate) = std::sync::mpsc::channel::<()>();
        let gate = Arc::new(std::sync::Mutex::new(gate));
        let started = Arc::new(AtomicU64::new(0));

        let encoder: Encoder = {
            let gate = Arc::clone(&gate);
            let started = Arc::clone(&started);
            Arc::new(move |content_type: &str, content: &[u8]| {
                if content.starts_with(b"old") {
                    started.fetch_add(1, Ordering::SeqCst);
                    let _ = gate.lock().unwrap().recv();
                }
                data_url(content_type, content)
            })
        };

        let first = vec![SelectedImage::new("old0.png", b"old0".to_vec())];
        let second = vec![SelectedImage::new("new.png", b"new".to_vec())];

        let mut loader = PreviewLoader::with_encoder(encoder);
        loader.load(&first).await;
        tokio::time::timeout(Duration::from_secs(5), async {
            while started.load(Ordering::SeqCst) == 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        loader.load(&second).await;
        loader.wait().await;
        release.send(()).unwrap();

        tokio::time::timeout(Duration::from_secs(5), async {
            while loader.discarded_count() == 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        assert_eq!(loader.discarded_count(), 1);
        assert_eq!(loader.loaded_count().await, 1);
        assert_eq!(
            loader.preview(0).await.as_deref(),
            Some(data_url("image/png", b"new").as_str())
        );
    }
}
