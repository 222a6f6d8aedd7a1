//! User-facing copy and fixed keys shared by the upload form and the batch viewer

pub const MSG_MISSING_FILTERS: &str = "Please apply at least one filter";
pub const MSG_UPLOAD_SUCCESS: &str = "Images uploaded successfully!";
pub const MSG_UPLOAD_FAILED: &str = "Failed to upload images.";

pub const MSG_INVALID_BATCH_ID: &str = "Please enter a valid BatchID";
pub const MSG_NO_IMAGES_FOUND: &str = "No images found for this UUID";
pub const MSG_FETCH_FAILED: &str = "Failed to fetch images. Please try again.";
pub const MSG_IMAGE_LOAD_FAILED: &str = "Failed to load some images";
pub const MSG_ZOOM_LOAD_FAILED: &str = "Failed to load zoomed image";
pub const MSG_DOWNLOAD_FAILED: &str = "Failed to download image. Please try again.";
pub const MSG_MISSING_IMAGE_URL: &str = "Image URL is missing";

/// Prefix of the count line shown above a loaded batch
pub const BATCH_COUNT_PREFIX: &str = "Number of images in this batch: ";

/// Route segment that carries a batch id (`/processed/<id>`)
pub const PROCESSED_ROUTE_SEGMENT: &str = "processed";

/// Download key used by the zoom modal
pub const MODAL_DOWNLOAD_KEY: &str = "modal";

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
