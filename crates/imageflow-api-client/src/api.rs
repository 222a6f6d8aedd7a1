//! Backend trait implementations for the ImageFlow endpoints.
//!
//! - submit: multipart POST to the upload path (`files` parts plus one `metadata` part)
//! - batch fetch: GET the batch path with `?batch_id=<id>`
//! - image retrieval: plain GET of an image URL

use async_trait::async_trait;
use bytes::Bytes;
use imageflow_core::models::SubmitReceipt;
use imageflow_core::{BatchBackend, ClientError, UploadBackend, UploadRequest};
use reqwest::multipart::{Form, Part};

use crate::ApiClient;

/// Build the multipart body: one `files` part per image, in order, then `metadata`.
pub fn build_form(request: UploadRequest) -> Result<Form, ClientError> {
    let mut form = Form::new();

    for file in request.files {
        let part = Part::bytes(file.content.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| {
                ClientError::InvalidInput(format!(
                    "Invalid content type '{}' for {}: {}",
                    file.content_type, file.file_name, e
                ))
            })?;
        form = form.part("files", part);
    }

    Ok(form.text("metadata", request.metadata_json))
}

#[async_trait]
impl UploadBackend for ApiClient {
    async fn submit_upload(&self, request: UploadRequest) -> Result<SubmitReceipt, ClientError> {
        let file_count = request.files.len();
        let form = build_form(request)?;

        tracing::debug!(
            url = %self.build_url(&self.config().upload_path),
            files = file_count,
            "Posting upload"
        );
        let body = self.post_multipart(&self.config().upload_path, form).await?;
        Ok(SubmitReceipt(body))
    }
}

#[async_trait]
impl BatchBackend for ApiClient {
    async fn fetch_batch(&self, batch_id: &str) -> Result<serde_json::Value, ClientError> {
        tracing::debug!(batch_id = %batch_id, "Requesting batch");
        self.get_json(&self.config().batch_path, &[("batch_id", batch_id)])
            .await
    }

    async fn fetch_image(&self, url: &str) -> Result<Bytes, ClientError> {
        self.get_bytes(url).await
    }
}
