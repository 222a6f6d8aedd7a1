//! Validation modules

pub mod batch;
pub mod upload;

pub use batch::{route_batch_id, validate_batch_id};
pub use upload::{missing_filters, validate_email, validate_selection};
