use crate::api_doc::ApiDoc;
use crate::handlers::{
    deploy_handler, health_handler, list_handler, request_echo_handler, root_handler,
    save_handler, save_query_handler,
};
use crate::routes;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Largest request body accepted by any route
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Build the full application router
///
/// CORS is fully permissive, so `OPTIONS` preflights are answered by the
/// CORS layer before any handler runs.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(routes::ROOT, get(root_handler))
        .route(routes::HEALTH, get(health_handler))
        .route(
            routes::REQUEST_ECHO,
            get(request_echo_handler).post(request_echo_handler),
        )
        .route(
            routes::SAVE_JSON,
            get(save_handler).post(save_handler).put(save_handler),
        )
        .route(routes::API_SAVE, post(save_handler).put(save_handler))
        .route(
            routes::UPLOAD,
            get(save_handler).post(save_handler).put(save_handler),
        )
        .route(routes::SAVE_QUERY, get(save_query_handler))
        .route(routes::LIST_FILES, get(list_handler))
        .route(routes::DEPLOY_FILE, post(deploy_handler))
        .merge(SwaggerUi::new(routes::SWAGGER_UI).url(routes::OPENAPI_JSON, ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
