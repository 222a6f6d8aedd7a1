//! ImageFlow Core Library
//!
//! This crate provides the client-side logic of the ImageFlow processing service: the
//! upload request builder that turns per-image edits into a filter pipeline, and the
//! batch result viewer that fetches, compares and downloads processed pairs.
//! Transport, rendering and file saving are reached through the traits in [`hooks`].

pub mod config;
pub mod constants;
pub mod error;
pub mod hooks;
pub mod models;
pub mod upload;
pub mod validation;
pub mod viewer;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{ClientError, ErrorKind, ErrorMetadata, LogLevel};
pub use hooks::{
    BatchBackend, ComparisonRenderer, ImageSide, NoOpNotifier, NoticeLevel, Notifier, ObjectRef,
    ObjectStore, UploadBackend, UploadFile, UploadRequest,
};
pub use upload::{PreviewLoader, UploadForm, UploadSession};
pub use viewer::{BatchViewer, DownloadKey, DownloadOutcome, ViewerPhase, ViewerState};
