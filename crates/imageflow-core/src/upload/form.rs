use std::collections::{BTreeMap, BTreeSet};

use crate::constants::MSG_MISSING_FILTERS;
use crate::error::ClientError;
use crate::hooks::{UploadFile, UploadRequest};
use crate::models::{FilterUpdate, ImageEditMetadata, SelectedImage, UploadDocument};
use crate::validation::{missing_filters, validate_email, validate_selection};

/// State of the upload page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadForm {
    email: String,
    images: Vec<SelectedImage>,
    metadata: Vec<ImageEditMetadata>,
    open_accordions: BTreeSet<usize>,
    image_errors: BTreeMap<usize, String>,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn images(&self) -> &[SelectedImage] {
        &self.images
    }

    pub fn metadata(&self) -> &[ImageEditMetadata] {
        &self.metadata
    }

    pub fn image_errors(&self) -> &BTreeMap<usize, String> {
        &self.image_errors
    }

    pub fn image_error(&self, index: usize) -> Option<&str> {
        self.image_errors.get(&index).map(String::as_str)
    }

    pub fn open_accordions(&self) -> &BTreeSet<usize> {
        &self.open_accordions
    }

    pub fn is_open(&self, index: usize) -> bool {
        self.open_accordions.contains(&index)
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Replace the selection. All metadata is regenerated at its inert defaults and
    /// only the first editor stays expanded.
    pub fn select_files(&mut self, images: Vec<SelectedImage>) {
        self.metadata = images
            .iter()
            .map(|image| ImageEditMetadata::for_file(image.name.clone()))
            .collect();
        self.open_accordions = if images.is_empty() {
            BTreeSet::new()
        } else {
            BTreeSet::from([0])
        };
        self.image_errors.clear();
        self.images = images;

        tracing::debug!(count = self.images.len(), "Selection replaced");
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    pub fn rename_image(&mut self, index: usize, image_name: impl Into<String>) -> Result<(), ClientError> {
        let slot = self.slot(index)?;
        *slot = std::mem::take(slot).renamed(image_name);
        Ok(())
    }

    /// Apply one field-level edit. Any edit clears the validation errors of every
    /// image; they are only recomputed on submit.
    pub fn update_filter(&mut self, index: usize, update: FilterUpdate) -> Result<(), ClientError> {
        let filter = update.filter_name();
        let slot = self.slot(index)?;
        *slot = std::mem::take(slot).with_update(update);
        self.image_errors.clear();

        tracing::debug!(index, filter, "Filter updated");
        Ok(())
    }

    /// Flip the expanded state of one editor; returns the new state
    pub fn toggle_accordion(&mut self, index: usize) -> bool {
        if self.open_accordions.remove(&index) {
            false
        } else {
            self.open_accordions.insert(index);
            true
        }
    }

    /// Run the submit-time checks and record per-image errors
    pub fn validate(&mut self) -> Result<(), ClientError> {
        validate_email(&self.email)?;

        self.image_errors = missing_filters(&self.metadata)
            .into_iter()
            .map(|index| (index, MSG_MISSING_FILTERS.to_string()))
            .collect();

        validate_selection(&self.metadata)
    }

    pub fn to_document(&self) -> UploadDocument {
        UploadDocument::new(self.email.trim(), &self.metadata)
    }

    /// Build the multipart submission: one file part per image, in selection order,
    /// plus the serialized metadata document
    pub fn build_request(&self) -> Result<UploadRequest, ClientError> {
        let metadata_json = serde_json::to_string(&self.to_document())?;
        let files = self
            .images
            .iter()
            .map(|image| UploadFile {
                file_name: image.name.clone(),
                content_type: image.content_type.clone(),
                content: image.content.clone(),
            })
            .collect();

        Ok(UploadRequest {
            files,
            metadata_json,
        })
    }

    /// Back to the initial empty form
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn slot(&mut self, index: usize) -> Result<&mut ImageEditMetadata, ClientError> {
        let len = self.metadata.len();
        self.metadata
            .get_mut(index)
            .ok_or(ClientError::ImageIndexOutOfRange { index, len })
    }
}
