use utoipa::OpenApi;

use crate::error::{ErrorResponse, HealthResponse, UnhealthyResponse};
use crate::handlers;
use crate::models::{
    DeployResponse, FileEntryResponse, ListFilesResponse, RequestEchoResponse, SavePayload,
    SaveResponse, StatusResponse,
};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "json-drop API",
        version = "1.0.0",
        description = "Saves JSON documents as files, lists them, and forwards them to a deployment API"
    ),
    paths(
        handlers::health::root_handler,
        handlers::health::health_handler,
        handlers::echo::request_echo_handler,
        handlers::save::save_handler,
        handlers::save::save_query_handler,
        handlers::list::list_handler,
        handlers::deploy::deploy_handler
    ),
    components(
        schemas(
            StatusResponse,
            SavePayload,
            SaveResponse,
            FileEntryResponse,
            ListFilesResponse,
            DeployResponse,
            RequestEchoResponse,
            ErrorResponse,
            HealthResponse,
            UnhealthyResponse
        )
    ),
    tags(
        (name = "health", description = "Health check and diagnostics"),
        (name = "files", description = "Saving and listing JSON files"),
        (name = "deploy", description = "Forwarding files to the deployment API")
    )
)]
pub struct ApiDoc;
