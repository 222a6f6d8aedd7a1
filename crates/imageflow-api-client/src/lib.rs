//! Shared HTTP client for the ImageFlow backend.
//!
//! Provides a minimal client built from [`ClientConfig`], generic GET/POST helpers that
//! map failures into the core error taxonomy, and implementations of the core's
//! backend traits (see [`api`]). The CLI uses this client directly.

pub mod api;

use anyhow::{Context, Result};
use bytes::Bytes;
use imageflow_core::{ClientConfig, ClientError};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;

/// HTTP client for the ImageFlow backend.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate().context("Invalid client configuration")?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    /// Create client from environment (see [`ClientConfig::from_env`]).
    pub fn from_env() -> Result<Self> {
        let config = ClientConfig::from_env().context("Failed to load client configuration")?;
        Self::new(config)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.config.api_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url, path)
    }

    /// Send a request and require a 2xx status. Non-success statuses carry the body text.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, response).await);
        }

        Ok(response)
    }

    /// GET request with optional query parameters. Returns the JSON body.
    pub async fn get_json(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<serde_json::Value, ClientError> {
        let url = self.build_url(path);
        let mut request = self.client.get(&url);

        if !query.is_empty() {
            request = request.query(query);
        }

        let response = self.send(request).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(format!("Failed to read response body: {}", e)))?;

        serde_json::from_str(&text)
            .map_err(|e| ClientError::DataShape(format!("Response is not valid JSON: {}", e)))
    }

    /// POST multipart form. Only `200 OK` is accepted; the reply body is returned as
    /// JSON when it parses, otherwise as a JSON string (or null when empty).
    pub async fn post_multipart(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<serde_json::Value, ClientError> {
        let url = self.build_url(path);
        let request = self.client.post(&url).multipart(form);

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(status_error(status, response).await);
        }

        let text = response.text().await.unwrap_or_default();
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text)))
    }

    /// GET an absolute URL and return the raw body.
    pub async fn get_bytes(&self, url: &str) -> Result<Bytes, ClientError> {
        let response = self.send(self.client.get(url)).await?;
        response
            .bytes()
            .await
            .map_err(|e| ClientError::Transport(format!("Failed to read image data: {}", e)))
    }

    /// Raw client for custom requests.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

async fn status_error(status: StatusCode, response: Response) -> ClientError {
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    ClientError::HttpStatus {
        status: status.as_u16(),
        body,
    }
}
