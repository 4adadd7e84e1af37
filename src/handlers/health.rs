use crate::error::{HealthResponse, UnhealthyResponse};
use crate::models::StatusResponse;
use crate::routes;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};

/// GET / handler - Liveness banner
#[utoipa::path(
    get,
    path = routes::ROOT,
    responses(
        (status = 200, description = "Service is running", body = StatusResponse)
    ),
    tag = "health"
)]
pub async fn root_handler() -> (StatusCode, Json<StatusResponse>) {
    (
        StatusCode::OK,
        Json(StatusResponse {
            status: "OK".to_string(),
            message: "API is running".to_string(),
        }),
    )
}

/// GET /health handler - Health check endpoint
///
/// Verifies that the storage directory is still present.
/// Returns 200 OK when it is, 503 Service Unavailable otherwise.
#[utoipa::path(
    get,
    path = routes::HEALTH,
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = UnhealthyResponse)
    ),
    tag = "health"
)]
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<HealthResponse>), (StatusCode, Json<UnhealthyResponse>)> {
    if state.store.exists().await {
        tracing::debug!("Health check passed");
        Ok((
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
            }),
        ))
    } else {
        let root = state.store.root().display().to_string();
        tracing::error!("Health check failed: storage directory {} is missing", root);
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(UnhealthyResponse {
                status: "unhealthy".to_string(),
                error: format!("Storage directory is missing: {}", root),
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_state;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn setup_test_app(dir: &TempDir) -> Router {
        let state = test_state(dir.path(), None).await;

        Router::new()
            .route(routes::ROOT, get(root_handler))
            .route(routes::HEALTH, get(health_handler))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_root_endpoint() {
        let dir = TempDir::new().unwrap();
        let app = setup_test_app(&dir).await;

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let response_json: StatusResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(response_json.status, "OK");
    }

    #[tokio::test]
    async fn test_health_endpoint_healthy() {
        let dir = TempDir::new().unwrap();
        let app = setup_test_app(&dir).await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let response_json: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(response_json.status, "healthy");
    }

    #[tokio::test]
    async fn test_health_endpoint_unhealthy() {
        let dir = TempDir::new().unwrap();
        let app = setup_test_app(&dir).await;

        // Pull the directory out from under the running service
        std::fs::remove_dir_all(dir.path()).unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let response_json: UnhealthyResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(response_json.status, "unhealthy");
        assert!(response_json.error.contains("Storage directory is missing"));
    }
}
