use crate::error::{ApiError, ErrorResponse};
use crate::models::{FileEntryResponse, ListFilesResponse};
use crate::routes;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};

/// GET /list-files handler - List saved JSON files
///
/// Returns every `.json` file in the storage directory, sorted by name,
/// with its size and last modification time (RFC 3339, UTC).
#[utoipa::path(
    get,
    path = routes::LIST_FILES,
    responses(
        (status = 200, description = "Saved files", body = ListFilesResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    ),
    tag = "files"
)]
pub async fn list_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ListFilesResponse>), ApiError> {
    let listing = state.store.list().await?;

    let files: Vec<FileEntryResponse> = listing
        .files
        .into_iter()
        .map(|file| FileEntryResponse {
            filename: file.filename,
            size_bytes: file.size_bytes,
            modified: file.modified.to_rfc3339(),
        })
        .collect();

    let response = ListFilesResponse {
        total: files.len(),
        files,
        folder_path: listing.folder_path.display().to_string(),
    };

    tracing::info!("Listed {} files in {}", response.total, response.folder_path);

    Ok((StatusCode::OK, Json(response)))
}
