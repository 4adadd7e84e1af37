use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Response type for the root endpoint
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

/// Body accepted by the save endpoints
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct SavePayload {
    pub filename: String,
    #[serde(rename = "jsonData")]
    pub json_data: JsonValue,
}

/// Query parameters for the query-only save endpoint
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SaveQuery {
    /// Target file name; `.json` is appended when missing
    pub filename: Option<String>,
    /// JSON document, as text
    #[serde(rename = "jsonData")]
    pub json_data: Option<String>,
}

/// Response type for successful saves
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct SaveResponse {
    pub success: bool,
    pub message: String,
    pub filename: String,
    pub path: String,
}

/// Individual file in list response
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct FileEntryResponse {
    pub filename: String,
    pub size_bytes: u64,
    pub modified: String,
}

/// Response type for list endpoint
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ListFilesResponse {
    pub files: Vec<FileEntryResponse>,
    pub total: usize,
    pub folder_path: String,
}

/// Response type for successful forwards to the deployment API
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct DeployResponse {
    pub success: bool,
    pub filename: String,
    pub upstream_status: u16,
    pub upstream_response: JsonValue,
}

/// Diagnostic echo of what the service received
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct RequestEchoResponse {
    pub method: String,
    pub has_json: bool,
    pub headers: BTreeMap<String, String>,
    pub args: BTreeMap<String, String>,
    pub form: BTreeMap<String, String>,
    pub json_data: Option<JsonValue>,
    pub raw_body: Option<String>,
}
