//! Error types module
//!
//! All client-side failures are unified under [`ClientError`]. Every variant belongs to
//! exactly one [`ErrorKind`]: validation errors never reach the network, transport and
//! data-shape errors come back from the backend, and resource-load errors are isolated
//! to a single image.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a failed image load
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Error taxonomy used to decide how a failure propagates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Transport,
    DataShape,
    ResourceLoad,
    Internal,
}

/// Metadata for error presentation - lets errors self-describe how they surface to the user
pub trait ErrorMetadata {
    /// Taxonomy class of this error
    fn kind(&self) -> ErrorKind;

    /// Machine-readable error code (e.g., "TRANSPORT_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same action may succeed
    fn is_recoverable(&self) -> bool;

    /// User-facing message (may differ from the internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid batch id: {0:?}")]
    InvalidBatchId(String),

    #[error("No filters applied to images at positions {indices:?}")]
    MissingFilters { indices: Vec<usize> },

    #[error("Image index {index} is out of range for a selection of {len}")]
    ImageIndexOutOfRange { index: usize, len: usize },

    #[error("A submission is already in progress")]
    SubmitInProgress,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request failed with status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Unexpected response shape: {0}")]
    DataShape(String),

    #[error("Failed to load image: {url}")]
    ResourceLoad { url: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for ClientError {
    fn from(err: anyhow::Error) -> Self {
        ClientError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::DataShape(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(format!("IO error: {}", err))
    }
}

/// Static metadata for each variant: (kind, error_code, recoverable, log_level).
fn client_error_static_metadata(err: &ClientError) -> (ErrorKind, &'static str, bool, LogLevel) {
    match err {
        ClientError::InvalidInput(_) => (
            ErrorKind::Validation,
            "INVALID_INPUT",
            false,
            LogLevel::Debug,
        ),
        ClientError::InvalidBatchId(_) => (
            ErrorKind::Validation,
            "INVALID_BATCH_ID",
            false,
            LogLevel::Debug,
        ),
        ClientError::MissingFilters { .. } => (
            ErrorKind::Validation,
            "MISSING_FILTERS",
            false,
            LogLevel::Debug,
        ),
        ClientError::ImageIndexOutOfRange { .. } => (
            ErrorKind::Validation,
            "IMAGE_INDEX_OUT_OF_RANGE",
            false,
            LogLevel::Debug,
        ),
        ClientError::SubmitInProgress => (
            ErrorKind::Validation,
            "SUBMIT_IN_PROGRESS",
            true,
            LogLevel::Debug,
        ),
        ClientError::Transport(_) => (
            ErrorKind::Transport,
            "TRANSPORT_ERROR",
            true,
            LogLevel::Error,
        ),
        ClientError::HttpStatus { .. } => (
            ErrorKind::Transport,
            "HTTP_STATUS_ERROR",
            true,
            LogLevel::Warn,
        ),
        ClientError::DataShape(_) => (
            ErrorKind::DataShape,
            "DATA_SHAPE_ERROR",
            false,
            LogLevel::Warn,
        ),
        ClientError::ResourceLoad { .. } => (
            ErrorKind::ResourceLoad,
            "RESOURCE_LOAD_ERROR",
            true,
            LogLevel::Warn,
        ),
        ClientError::Storage(_) => (
            ErrorKind::Internal,
            "STORAGE_ERROR",
            true,
            LogLevel::Error,
        ),
        ClientError::InternalWithSource { .. } => (
            ErrorKind::Internal,
            "INTERNAL_ERROR",
            true,
            LogLevel::Error,
        ),
    }
}

impl ClientError {
    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for ClientError {
    fn kind(&self) -> ErrorKind {
        client_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        client_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        client_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        client_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            ClientError::InvalidInput(ref msg) => msg.clone(),
            ClientError::InvalidBatchId(_) => crate::constants::MSG_INVALID_BATCH_ID.to_string(),
            ClientError::MissingFilters { .. } => crate::constants::MSG_MISSING_FILTERS.to_string(),
            ClientError::ImageIndexOutOfRange { index, .. } => {
                format!("No image selected at position {}", index + 1)
            }
            ClientError::SubmitInProgress => "Upload already in progress".to_string(),
            ClientError::Transport(_) | ClientError::HttpStatus { .. } => {
                "Request failed. Please try again.".to_string()
            }
            ClientError::DataShape(_) => "Unexpected response from server".to_string(),
            ClientError::ResourceLoad { .. } => crate::constants::MSG_IMAGE_LOAD_FAILED.to_string(),
            ClientError::Storage(_) => "Failed to save file".to_string(),
            ClientError::InternalWithSource { .. } => "Internal error".to_string(),
        }
    }
}
