use crate::error::{ApiError, ErrorResponse};
use crate::models::{SavePayload, SaveQuery, SaveResponse};
use crate::payload::{self, SaveRequest};
use crate::routes;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, Method, StatusCode},
    Json,
};
use std::collections::HashMap;

const SAVED_MESSAGE: &str = "File saved successfully";

/// GET|POST|PUT /save-json handler - Save a JSON document
///
/// Also mounted at `/api/save` and `/upload`. The `filename`/`jsonData` pair
/// is looked up in this order: query parameters, JSON body (any content
/// type), a `data`/`body` query parameter holding the whole object, then
/// url-encoded or multipart form fields.
#[utoipa::path(
    post,
    path = routes::SAVE_JSON,
    params(
        ("filename" = Option<String>, Query, description = "Target file name; `.json` is appended when missing"),
        ("jsonData" = Option<String>, Query, description = "JSON document as text"),
        ("data" = Option<String>, Query, description = "Whole payload object as JSON text")
    ),
    request_body = SavePayload,
    responses(
        (status = 200, description = "File saved", body = SaveResponse),
        (status = 400, description = "Missing fields, invalid JSON, or invalid filename", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    ),
    tag = "files"
)]
pub async fn save_handler(
    State(state): State<AppState>,
    method: Method,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<SaveResponse>), ApiError> {
    tracing::info!(
        "Save request: method={}, query keys={:?}, body={} bytes",
        method,
        query.keys().collect::<Vec<_>>(),
        body.len()
    );
    tracing::debug!("Save request headers: {:?}", headers);

    let request = payload::resolve(&method, &query, &headers, &body)?;
    tracing::info!("Resolved save request for '{}' from {:?}", request.filename, request.source);

    store(&state, request).await
}

/// GET /save handler - Save a JSON document from query parameters only
#[utoipa::path(
    get,
    path = routes::SAVE_QUERY,
    params(SaveQuery),
    responses(
        (status = 200, description = "File saved", body = SaveResponse),
        (status = 400, description = "Missing parameters, invalid JSON, or invalid filename", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    ),
    tag = "files"
)]
pub async fn save_query_handler(
    State(state): State<AppState>,
    Query(query): Query<SaveQuery>,
) -> Result<(StatusCode, Json<SaveResponse>), ApiError> {
    let params: HashMap<String, String> = [
        (payload::FILENAME_FIELD, query.filename),
        (payload::JSON_DATA_FIELD, query.json_data),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.map(|value| (key.to_string(), value)))
    .collect();

    let request = payload::from_query(&params)?;
    store(&state, request).await
}

async fn store(
    state: &AppState,
    request: SaveRequest,
) -> Result<(StatusCode, Json<SaveResponse>), ApiError> {
    let saved = state.store.save(&request.filename, &request.json_data).await?;

    Ok((
        StatusCode::OK,
        Json(SaveResponse {
            success: true,
            message: SAVED_MESSAGE.to_string(),
            filename: saved.filename,
            path: saved.path.display().to_string(),
        }),
    ))
}
