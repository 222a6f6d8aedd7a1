//! Selected upload files and processed before/after pairs

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::DEFAULT_CONTENT_TYPE;
use crate::error::ClientError;

/// One file chosen for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    pub name: String,
    pub content_type: String,
    pub content: Bytes,
}

impl SelectedImage {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let name = name.into();
        let content_type = content_type_for_name(&name).to_string();
        Self {
            name,
            content_type,
            content: content.into(),
        }
    }

    /// Read a file from disk; the display name is the file name component
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ClientError::InvalidInput(format!("Invalid file path: {}", path.display()))
            })?
            .to_string();

        let content = tokio::fs::read(path).await.map_err(|e| {
            ClientError::InvalidInput(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Ok(Self::new(name, content))
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// Guess a MIME type from the file extension
pub fn content_type_for_name(name: &str) -> &'static str {
    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tif") | Some("tiff") => "image/tiff",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

/// One processed result reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePair {
    #[serde(default)]
    pub file_name: Option<String>,
    pub before_url: String,
    pub after_url: String,
}

impl ImagePair {
    fn named(&self) -> Option<&str> {
        self.file_name.as_deref().filter(|name| !name.is_empty())
    }

    /// Card label: the file name, or "Image N" (1-based) when absent
    pub fn display_name(&self, index: usize) -> String {
        self.named()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Image {}", index + 1))
    }

    pub fn download_name(&self, default_name: &str) -> String {
        self.named().unwrap_or(default_name).to_string()
    }
}

/// Extract `image_pairs` from a batch response body.
///
/// `Ok(None)` means the batch has no results: the field is missing, is not an array,
/// or is empty. Elements that are not valid pairs are a data-shape error.
pub fn parse_image_pairs(body: &serde_json::Value) -> Result<Option<Vec<ImagePair>>, ClientError> {
    let entries = match body.get("image_pairs").and_then(|v| v.as_array()) {
        Some(entries) if !entries.is_empty() => entries,
        _ => return Ok(None),
    };

    let pairs = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            ImagePair::deserialize(entry).map_err(|e| {
                ClientError::DataShape(format!("image_pairs[{}] is invalid: {}", index, e))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(pairs))
}

/// Reply to a successful upload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmitReceipt(pub serde_json::Value);

impl SubmitReceipt {
    /// Batch id announced by the backend, either at the top level or on the first
    /// per-image entry
    pub fn batch_id(&self) -> Option<&str> {
        self.0
            .get("batch_id")
            .or_else(|| self.0.get(0).and_then(|first| first.get("batch_id")))
            .and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_type_guess() {
        assert_eq!(content_type_for_name("a.JPG"), "image/jpeg");
        assert_eq!(content_type_for_name("b.webp"), "image/webp");
        assert_eq!(content_type_for_name("noext"), DEFAULT_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn from_path_reads_name_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, b"png-bytes").unwrap();

        let image = SelectedImage::from_path(&path).await.unwrap();
        assert_eq!(image.name, "photo.png");
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.size(), 9);
    }

    #[tokio::test]
    async fn from_path_missing_file_is_invalid_input() {
        let err = SelectedImage::from_path("/definitely/not/here.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
    }

    #[test]
    fn pair_labels() {
        let pair = ImagePair {
            file_name: None,
            before_url: "u1".to_string(),
            after_url: "u2".to_string(),
        };
        assert_eq!(pair.display_name(2), "Image 3");
        assert_eq!(pair.download_name("processed-image.jpg"), "processed-image.jpg");

        let named = ImagePair {
            file_name: Some("a.jpg".to_string()),
            ..pair
        };
        assert_eq!(named.display_name(0), "a.jpg");
        assert_eq!(named.download_name("processed-image.jpg"), "a.jpg");
    }

    #[test]
    fn parse_pairs_shapes() {
        let body = json!({ "image_pairs": [{ "file_name": "a.jpg", "before_url": "u1", "after_url": "u2" }] });
        let pairs = parse_image_pairs(&body).unwrap().unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].after_url, "u2");

        assert_eq!(parse_image_pairs(&json!({ "image_pairs": [] })).unwrap(), None);
        assert_eq!(parse_image_pairs(&json!({ "image_pairs": "x" })).unwrap(), None);
        assert_eq!(parse_image_pairs(&json!({ "other": 1 })).unwrap(), None);
        assert_eq!(parse_image_pairs(&json!(null)).unwrap(), None);

        let err = parse_image_pairs(&json!({ "image_pairs": [{ "before_url": "u1" }] })).unwrap_err();
        assert!(matches!(err, ClientError::DataShape(_)));
    }

    #[test]
    fn receipt_batch_id() {
        let receipt = SubmitReceipt(json!({ "status": "success", "batch_id": "b-1" }));
        assert_eq!(receipt.batch_id(), Some("b-1"));

        let receipt = SubmitReceipt(json!([{ "image_name": "a", "batch_id": "b-2" }]));
        assert_eq!(receipt.batch_id(), Some("b-2"));

        assert_eq!(SubmitReceipt::default().batch_id(), None);
    }
}
