//! Batch result viewer
//!
//! Fetches the before/after pairs of a batch, tracks the fetch lifecycle and the zoom
//! modal, and runs keyed downloads with independent busy flags.

mod batch_viewer;
mod downloads;
mod state;

pub use batch_viewer::{BatchViewer, DownloadOutcome};
pub use downloads::{DownloadGuard, DownloadKey, DownloadRegistry};
pub use state::{PairView, ViewerPhase, ViewerState, ZoomState};
