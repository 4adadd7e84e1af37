use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;

use crate::config::DeployConfig;

/// Multipart field that carries the forwarded file
pub const FILE_FIELD: &str = "file";

/// Successful reply from the deployment API
#[derive(Debug, Clone, PartialEq)]
pub struct DeployOutcome {
    pub status: u16,
    /// Parsed JSON body, or the raw text as a JSON string
    pub response: JsonValue,
}

#[derive(Debug)]
pub enum DeployError {
    /// The API answered with a non-2xx status
    Status { status: u16, body: String },
    /// The request never produced a response
    Transport(reqwest::Error),
}

impl fmt::Display for DeployError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployError::Status { status, .. } => {
                write!(f, "deployment API returned status {}", status)
            }
            DeployError::Transport(err) => write!(f, "deployment API request failed: {}", err),
        }
    }
}

impl std::error::Error for DeployError {}

/// Client for the single configured deployment API
#[derive(Clone)]
pub struct DeployClient {
    http: reqwest::Client,
    config: Arc<DeployConfig>,
}

impl DeployClient {
    pub fn from_config(config: &DeployConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build deployment HTTP client")?;

        tracing::info!("Deployment forwarding enabled for {}", config.api_url);

        Ok(Self {
            http,
            config: Arc::new(config.clone()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.api_url
    }

    /// Upload `contents` as `filename` with bearer authentication
    ///
    /// The request is a `multipart/form-data` POST with one `file` part typed
    /// `application/json`. No retries are attempted.
    ///
    /// # Errors
    /// * [`DeployError::Status`] - the API rejected the upload
    /// * [`DeployError::Transport`] - connection, timeout, or body read failure
    pub async fn forward(
        &self,
        filename: &str,
        contents: Vec<u8>,
    ) -> Result<DeployOutcome, DeployError> {
        let size = contents.len();
        let part = Part::bytes(contents)
            .file_name(filename.to_string())
            .mime_str("application/json")
            .map_err(DeployError::Transport)?;
        let form = Form::new().part(FILE_FIELD, part);

        tracing::info!("Forwarding {} ({} bytes) to {}", filename, size, self.config.api_url);

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_token)
            .multipart(form)
            .send()
            .await
            .map_err(DeployError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(DeployError::Transport)?;

        if !status.is_success() {
            tracing::warn!("Deployment API rejected {} with status {}", filename, status);
            return Err(DeployError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response = serde_json::from_str(&body).unwrap_or(JsonValue::String(body));

        tracing::info!("Deployment API accepted {} with status {}", filename, status);
        Ok(DeployOutcome {
            status: status.as_u16(),
            response,
        })
    }
}
