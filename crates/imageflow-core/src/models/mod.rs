//! Data models for the client
//!
//! Upload-side edit state, the wire-facing filter pipeline, and the processed
//! image pairs returned for a batch.

mod edit;
mod image;
mod pipeline;

// Re-export all models for convenient imports
pub use edit::*;
pub use image::*;
pub use pipeline::*;
