//! Hooks and traits for the capabilities the core consumes
//!
//! The upload session and the batch viewer never talk to a transport, a renderer or
//! a file system directly. Front ends implement these traits; the HTTP client in
//! `imageflow-api-client` implements the two backend traits.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::ClientError;
use crate::models::SubmitReceipt;

/// One file part of a multipart submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub content: Bytes,
}

/// A fully built multipart submission: the files plus the serialized metadata document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub files: Vec<UploadFile>,
    pub metadata_json: String,
}

/// Backend upload service
#[async_trait]
pub trait UploadBackend: Send + Sync {
    /// Send the multipart submission. Only HTTP 200 counts as success.
    async fn submit_upload(&self, request: UploadRequest) -> Result<SubmitReceipt, ClientError>;
}

/// Backend query service and image retrieval
#[async_trait]
pub trait BatchBackend: Send + Sync {
    /// Fetch the raw JSON body describing a batch
    async fn fetch_batch(&self, batch_id: &str) -> Result<serde_json::Value, ClientError>;

    /// Fetch the bytes of one image
    async fn fetch_image(&self, url: &str) -> Result<Bytes, ClientError>;
}

/// Opaque reference to bytes materialized by an [`ObjectStore`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef(pub String);

/// Turns downloaded bytes into a local object that can be saved under a file name.
/// Every object handed out by `create_object` is passed back to `release` exactly once.
pub trait ObjectStore: Send + Sync {
    fn create_object(&self, bytes: Bytes) -> Result<ObjectRef, ClientError>;

    /// Save under `file_name` and return the name actually used, which differs when
    /// the store has to avoid overwriting an earlier save
    fn save_as(&self, object: &ObjectRef, file_name: &str) -> Result<String, ClientError>;

    fn release(&self, object: ObjectRef);
}

/// Which image of a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSide {
    Before,
    After,
}

/// Before/after comparison control
pub trait ComparisonRenderer {
    fn render_pair(&mut self, index: usize, label: &str, before_src: &str, after_src: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient user notifications ("toasts")
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// No-op implementation for front ends that surface outcomes themselves
pub struct NoOpNotifier;

impl Notifier for NoOpNotifier {
    fn notify(&self, _level: NoticeLevel, _message: &str) {}
}
