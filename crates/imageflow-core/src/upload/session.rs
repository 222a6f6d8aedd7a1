use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::constants::{MSG_UPLOAD_FAILED, MSG_UPLOAD_SUCCESS};
use crate::error::ClientError;
use crate::hooks::{NoticeLevel, Notifier, UploadBackend};
use crate::models::{FilterUpdate, SelectedImage, SubmitReceipt};

use super::form::UploadForm;

/// Holds the submitting flag for the lifetime of one submission; the flag is cleared
/// when the guard drops, whichever way the submission ends.
struct SubmittingGuard(Arc<AtomicBool>);

impl SubmittingGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(Arc::clone(flag)))
    }
}

impl Drop for SubmittingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Upload page controller: shared form state plus the submit protocol
#[derive(Clone)]
pub struct UploadSession {
    form: Arc<Mutex<UploadForm>>,
    submitting: Arc<AtomicBool>,
    backend: Arc<dyn UploadBackend>,
    notifier: Arc<dyn Notifier>,
}

impl UploadSession {
    pub fn new(backend: Arc<dyn UploadBackend>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            form: Arc::new(Mutex::new(UploadForm::new())),
            submitting: Arc::new(AtomicBool::new(false)),
            backend,
            notifier,
        }
    }

    /// True while a submission is in flight (the blocking loading indicator)
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> UploadForm {
        self.form.lock().await.clone()
    }

    pub async fn select_files(&self, images: Vec<SelectedImage>) {
        self.form.lock().await.select_files(images);
    }

    pub async fn set_email(&self, email: impl Into<String>) {
        self.form.lock().await.set_email(email);
    }

    pub async fn rename_image(
        &self,
        index: usize,
        image_name: impl Into<String>,
    ) -> Result<(), ClientError> {
        self.form.lock().await.rename_image(index, image_name)
    }

    pub async fn update_filter(&self, index: usize, update: FilterUpdate) -> Result<(), ClientError> {
        self.form.lock().await.update_filter(index, update)
    }

    pub async fn toggle_accordion(&self, index: usize) -> bool {
        self.form.lock().await.toggle_accordion(index)
    }

    /// Validate, then send every file and the metadata document in one request.
    ///
    /// Validation failures return before any network call. On success the form is
    /// reset to its initial state; on failure it is left untouched for a retry.
    pub async fn submit(&self) -> Result<SubmitReceipt, ClientError> {
        let _guard =
            SubmittingGuard::acquire(&self.submitting).ok_or(ClientError::SubmitInProgress)?;

        let request = {
            let mut form = self.form.lock().await;
            if let Err(e) = form.validate() {
                tracing::debug!(error = %e, "Upload blocked by validation");
                return Err(e);
            }
            form.build_request()?
        };

        let file_count = request.files.len();
        tracing::info!(files = file_count, "Submitting upload");

        match self.backend.submit_upload(request).await {
            Ok(receipt) => {
                self.form.lock().await.reset();
                tracing::info!(
                    files = file_count,
                    batch_id = receipt.batch_id().unwrap_or("unknown"),
                    "Upload accepted"
                );
                self.notifier.notify(NoticeLevel::Success, MSG_UPLOAD_SUCCESS);
                Ok(receipt)
            }
            Err(e) => {
                tracing::error!(error = %e, files = file_count, "Upload failed");
                self.notifier.notify(NoticeLevel::Error, MSG_UPLOAD_FAILED);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::UploadRequest;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct RecordingNotifier {
        notices: StdMutex<Vec<(NoticeLevel, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, level: NoticeLevel, message: &str) {
            self.notices
                .lock()
                .unwrap()
                .push((level, message.to_string()));
        }
    }

    struct FakeBackend {
        fail: bool,
        requests: StdMutex<Vec<UploadRequest>>,
        gate: Option<Arc<Notify>>,
    }

    impl FakeBackend {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                requests: StdMutex::new(Vec::new()),
                gate: None,
            }
        }
    }

    #[async_trait]
    impl UploadBackend for FakeBackend {
        async fn submit_upload(&self, request: UploadRequest) -> Result<SubmitReceipt, ClientError> {
            self.requests.lock().unwrap().push(request);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail {
                Err(ClientError::HttpStatus {
                    status: 500,
                    body: "boom".to_string(),
                })
            } else {
                Ok(SubmitReceipt(json!({ "batch_id": "batch-1" })))
            }
        }
    }

    async fn filled_session(backend: Arc<FakeBackend>, notifier: Arc<RecordingNotifier>) -> UploadSession {
        let session = UploadSession::new(backend, notifier);
        session.set_email("me@example.com").await;
        session
            .select_files(vec![
                SelectedImage::new("a.jpg", b"aaa".to_vec()),
                SelectedImage::new("b.jpg", b"bbb".to_vec()),
            ])
            .await;
        session
            .update_filter(0, FilterUpdate::Grayscale(true))
            .await
            .unwrap();
        session
            .update_filter(1, FilterUpdate::Rotate("180".to_string()))
            .await
            .unwrap();
        session
    }

    #[tokio::test]
    async fn successful_submit_resets_form() {
        let backend = Arc::new(FakeBackend::new(false));
        let notifier = Arc::new(RecordingNotifier::default());
        let session = filled_session(backend.clone(), notifier.clone()).await;

        let receipt = session.submit().await.unwrap();
        assert_eq!(receipt.batch_id(), Some("batch-1"));
        assert_eq!(session.snapshot().await, UploadForm::default());
        assert!(!session.is_submitting());

        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].files.len(), 2);
        assert_eq!(
            notifier.notices.lock().unwrap().as_slice(),
            &[(NoticeLevel::Success, MSG_UPLOAD_SUCCESS.to_string())]
        );
    }

    #[tokio::test]
    async fn failed_submit_keeps_form_for_retry() {
        let backend = Arc::new(FakeBackend::new(true));
        let notifier = Arc::new(RecordingNotifier::default());
        let session = filled_session(backend.clone(), notifier.clone()).await;
        let before = session.snapshot().await;

        let err = session.submit().await.unwrap_err();
        assert!(matches!(err, ClientError::HttpStatus { status: 500, .. }));
        assert_eq!(session.snapshot().await, before);
        assert!(!session.is_submitting());
        assert_eq!(
            notifier.notices.lock().unwrap().as_slice(),
            &[(NoticeLevel::Error, MSG_UPLOAD_FAILED.to_string())]
        );
    }

    #[tokio::test]
    async fn validation_failure_makes_no_request() {
        let backend = Arc::new(FakeBackend::new(false));
        let notifier = Arc::new(RecordingNotifier::default());
        let session = UploadSession::new(backend.clone(), notifier.clone());
        session.set_email("me@example.com").await;
        session
            .select_files(vec![SelectedImage::new("a.jpg", b"a".to_vec())])
            .await;

        let err = session.submit().await.unwrap_err();
        assert!(matches!(err, ClientError::MissingFilters { .. }));
        assert!(backend.requests.lock().unwrap().is_empty());
        assert!(notifier.notices.lock().unwrap().is_empty());
        assert!(!session.is_submitting());
        assert_eq!(
            session.snapshot().await.image_error(0),
            Some(crate::constants::MSG_MISSING_FILTERS)
        );
    }

    #[tokio::test]
    async fn duplicate_submit_is_rejected_while_in_flight() {
        let gate = Arc::new(Notify::new());
        let backend = Arc::new(FakeBackend {
            gate: Some(gate.clone()),
            ..FakeBackend::new(false)
        });
        let notifier = Arc::new(RecordingNotifier::default());
        let session = filled_session(backend.clone(), notifier).await;

        let in_flight = tokio::spawn({
            let session = session.clone();
            async move { session.submit().await }
        });

        while backend.requests.lock().unwrap().is_empty() {
            tokio::task::yield_now().await;
        }
        assert!(session.is_submitting());
        assert!(matches!(
            session.submit().await,
            Err(ClientError::SubmitInProgress)
        ));

        gate.notify_one();
        in_flight.await.unwrap().unwrap();
        assert!(!session.is_submitting());
        assert_eq!(backend.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn dropped_submit_clears_flag() {
        let gate = Arc::new(Notify::new());
        let backend = Arc::new(FakeBackend {
            gate: Some(gate),
            ..FakeBackend::new(false)
        });
        let notifier = Arc::new(RecordingNotifier::default());
        let session = filled_session(backend.clone(), notifier).await;

        let in_flight = tokio::spawn({
            let session = session.clone();
            async move { session.submit().await }
        });
        while backend.requests.lock().unwrap().is_empty() {
            tokio::task::yield_now().await;
        }
        in_flight.abort();
        let _ = in_flight.await;

        assert!(!session.is_submitting());
    }
}
