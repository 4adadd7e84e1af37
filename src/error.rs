use crate::deploy::DeployError;
use crate::storage::InvalidFilename;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Longest slice of an upstream response body echoed back to the client
const UPSTREAM_BODY_PREVIEW: usize = 500;

/// Error response type
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Response type for health check endpoint
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Response type for unhealthy status
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct UnhealthyResponse {
    pub status: String,
    pub error: String,
}

/// Custom error type for API endpoints
///
/// Every variant maps to one HTTP status code and renders as an
/// [`ErrorResponse`] JSON body.
#[derive(Debug)]
pub enum ApiError {
    /// No request location carried both `filename` and `jsonData`
    MissingFields { method: String },
    /// Query-only save without the named parameters
    MissingQueryParams(Vec<&'static str>),
    /// `jsonData` text is not valid JSON
    InvalidJson(serde_json::Error),
    /// Filename rejected by the store
    InvalidFilename(InvalidFilename),
    /// No saved file with that name
    FileNotFound(String),
    /// Forwarding requested but no deployment API configured
    DeployNotConfigured,
    /// Deployment API answered with a non-success status
    UpstreamStatus { status: u16, body: String },
    /// Deployment API could not be reached
    UpstreamUnreachable(String),
    /// Filesystem operation error
    StorageError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::MissingFields { method } => (
                StatusCode::BAD_REQUEST,
                format!(
                    "Missing required fields: filename and jsonData (received method {})",
                    method
                ),
                None,
            ),
            ApiError::MissingQueryParams(missing) => (
                StatusCode::BAD_REQUEST,
                "Missing required query parameters".to_string(),
                Some(format!("required: filename, jsonData; missing: {}", missing.join(", "))),
            ),
            ApiError::InvalidJson(err) => (
                StatusCode::BAD_REQUEST,
                "Invalid JSON in jsonData".to_string(),
                Some(err.to_string()),
            ),
            ApiError::InvalidFilename(err) => (
                StatusCode::BAD_REQUEST,
                "Invalid filename".to_string(),
                Some(err.to_string()),
            ),
            ApiError::FileNotFound(filename) => (
                StatusCode::NOT_FOUND,
                format!("File not found: {}", filename),
                None,
            ),
            ApiError::DeployNotConfigured => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Deployment API is not configured".to_string(),
                Some("set DEPLOY_API_URL and DEPLOY_API_TOKEN".to_string()),
            ),
            ApiError::UpstreamStatus { status, body } => (
                StatusCode::BAD_GATEWAY,
                format!("Deployment API returned status {}", status),
                Some(format!(
                    "status {}: {}",
                    status,
                    body.chars().take(UPSTREAM_BODY_PREVIEW).collect::<String>()
                )),
            ),
            ApiError::UpstreamUnreachable(reason) => (
                StatusCode::BAD_GATEWAY,
                "Deployment API is unreachable".to_string(),
                Some(reason),
            ),
            ApiError::StorageError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Storage error".to_string(),
                Some(format!("{:#}", err)),
            ),
        };

        if status.is_server_error() {
            tracing::error!("{} ({})", error, details.as_deref().unwrap_or(""));
        } else {
            tracing::warn!("{} ({})", error, details.as_deref().unwrap_or(""));
        }

        let body = Json(ErrorResponse { error, details });

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<InvalidFilename>() {
            Ok(invalid) => ApiError::InvalidFilename(invalid),
            Err(err) => ApiError::StorageError(err),
        }
    }
}

impl From<InvalidFilename> for ApiError {
    fn from(err: InvalidFilename) -> Self {
        ApiError::InvalidFilename(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InvalidJson(err)
    }
}

impl From<DeployError> for ApiError {
    fn from(err: DeployError) -> Self {
        match err {
            DeployError::Status { status, body } => ApiError::UpstreamStatus { status, body },
            DeployError::Transport(err) => ApiError::UpstreamUnreachable(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    async fn render(err: ApiError) -> (StatusCode, ErrorResponse) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_invalid_filename_downcasts_through_anyhow() {
        let invalid = crate::storage::normalize_filename("../x").unwrap_err();
        let err: anyhow::Error = anyhow::Error::new(invalid);

        let (status, body) = render(ApiError::from(err)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Invalid filename");
        assert!(body.details.unwrap().contains("path separators"));
    }

    #[tokio::test]
    async fn test_io_error_is_internal() {
        let err = std::fs::read("/definitely/not/here")
            .context("Failed to read /definitely/not/here")
            .unwrap_err();

        let (status, body) = render(ApiError::from(err)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.details.unwrap().contains("Failed to read"));
    }

    #[tokio::test]
    async fn test_upstream_body_is_truncated() {
        let err = ApiError::UpstreamStatus {
            status: 500,
            body: "x".repeat(2_000),
        };

        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let details = body.details.unwrap();
        assert!(details.starts_with("status 500: "));
        assert_eq!(details.len(), "status 500: ".len() + UPSTREAM_BODY_PREVIEW);
    }

    #[tokio::test]
    async fn test_missing_fields_names_method() {
        let (status, body) = render(ApiError::MissingFields {
            method: "GET".to_string(),
        })
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.contains("GET"));
        assert!(body.details.is_none());
    }
}
