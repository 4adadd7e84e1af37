use crate::error::{ApiError, ErrorResponse};
use crate::models::DeployResponse;
use crate::routes;
use crate::state::AppState;
use crate::storage::normalize_filename;
use axum::{extract::Path, extract::State, http::StatusCode, Json};

/// POST /deploy/{filename} handler - Forward a saved file to the deployment API
#[utoipa::path(
    post,
    path = routes::DEPLOY_FILE,
    params(
        ("filename" = String, Path, description = "Saved file name; `.json` is appended when missing")
    ),
    responses(
        (status = 200, description = "Deployment API accepted the file", body = DeployResponse),
        (status = 400, description = "Invalid filename", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 502, description = "Deployment API rejected the file or is unreachable", body = ErrorResponse),
        (status = 503, description = "Deployment API is not configured", body = ErrorResponse)
    ),
    tag = "deploy"
)]
pub async fn deploy_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<(StatusCode, Json<DeployResponse>), ApiError> {
    let deployer = state.deployer.as_ref().ok_or(ApiError::DeployNotConfigured)?;

    let filename = normalize_filename(&filename)?;
    let contents = state
        .store
        .read(&filename)
        .await?
        .ok_or_else(|| ApiError::FileNotFound(filename.clone()))?;

    let outcome = deployer.forward(&filename, contents).await?;

    tracing::info!("Forwarded {} to {} (status {})", filename, deployer.endpoint(), outcome.status);
    Ok((
        StatusCode::OK,
        Json(DeployResponse {
            success: true,
            filename,
            upstream_status: outcome.status,
            upstream_response: outcome.response,
        }),
    ))
}
