//! Configuration module
//!
//! Client configuration is read from the environment (optionally seeded from a `.env`
//! file) and validated before any client is built.

use std::env;

const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_UPLOAD_PATH: &str = "/upload-images";
const DEFAULT_BATCH_PATH: &str = "/get-processed-images";
const HTTP_TIMEOUT_SECS: u64 = 60;
const DEFAULT_PLACEHOLDER_URL: &str = "placeholder-image-url";
const DEFAULT_DOWNLOAD_NAME: &str = "processed-image.jpg";

/// Settings shared by the upload session, the batch viewer and the HTTP client
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub upload_path: String,
    pub batch_path: String,
    pub http_timeout_secs: u64,
    /// Image source substituted when a before/after image fails to load
    pub placeholder_url: String,
    /// File name used when a pair carries no `file_name`
    pub default_download_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            upload_path: DEFAULT_UPLOAD_PATH.to_string(),
            batch_path: DEFAULT_BATCH_PATH.to_string(),
            http_timeout_secs: HTTP_TIMEOUT_SECS,
            placeholder_url: DEFAULT_PLACEHOLDER_URL.to_string(),
            default_download_name: DEFAULT_DOWNLOAD_NAME.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let api_url = env::var("IMAGEFLOW_API_URL")
            .or_else(|_| env::var("API_URL"))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let http_timeout_secs = match env::var("IMAGEFLOW_HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse().map_err(|_| {
                anyhow::anyhow!("IMAGEFLOW_HTTP_TIMEOUT_SECS must be a valid number")
            })?,
            Err(_) => HTTP_TIMEOUT_SECS,
        };

        let config = Self {
            api_url: api_url.trim().trim_end_matches('/').to_string(),
            upload_path: env::var("IMAGEFLOW_UPLOAD_PATH")
                .unwrap_or_else(|_| DEFAULT_UPLOAD_PATH.to_string()),
            batch_path: env::var("IMAGEFLOW_BATCH_PATH")
                .unwrap_or_else(|_| DEFAULT_BATCH_PATH.to_string()),
            http_timeout_secs,
            placeholder_url: env::var("IMAGEFLOW_PLACEHOLDER_URL")
                .unwrap_or_else(|_| DEFAULT_PLACEHOLDER_URL.to_string()),
            default_download_name: env::var("IMAGEFLOW_DEFAULT_DOWNLOAD_NAME")
                .unwrap_or_else(|_| DEFAULT_DOWNLOAD_NAME.to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Override the backend base URL (trailing slashes are dropped)
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "IMAGEFLOW_API_URL must start with http:// or https://"
            ));
        }

        if !self.upload_path.starts_with('/') {
            return Err(anyhow::anyhow!("IMAGEFLOW_UPLOAD_PATH must start with '/'"));
        }

        if !self.batch_path.starts_with('/') {
            return Err(anyhow::anyhow!("IMAGEFLOW_BATCH_PATH must start with '/'"));
        }

        if self.http_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "IMAGEFLOW_HTTP_TIMEOUT_SECS must be greater than zero"
            ));
        }

        if self.default_download_name.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "IMAGEFLOW_DEFAULT_DOWNLOAD_NAME cannot be empty"
            ));
        }

        Ok(())
    }

    pub fn upload_url(&self) -> String {
        format!("{}{}", self.api_url, self.upload_path)
    }

    pub fn batch_url(&self) -> String {
        format!("{}{}", self.api_url, self.batch_path)
    }
}
