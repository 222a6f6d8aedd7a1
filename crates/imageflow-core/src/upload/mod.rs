//! Upload request builder
//!
//! [`UploadForm`] is the plain state of the upload page and owns every edit rule;
//! [`UploadSession`] wraps it for the asynchronous submit protocol and
//! [`PreviewLoader`] produces the thumbnails shown next to each selected file.

mod form;
mod preview;
mod session;

pub use form::UploadForm;
pub use preview::{data_url, PreviewLoader};
pub use session::UploadSession;
