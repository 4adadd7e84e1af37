// Route path constants - single source of truth for all API paths

pub const ROOT: &str = "/";
pub const HEALTH: &str = "/health";
pub const REQUEST_ECHO: &str = "/test";
pub const SAVE_JSON: &str = "/save-json";
pub const API_SAVE: &str = "/api/save";
pub const UPLOAD: &str = "/upload";
pub const SAVE_QUERY: &str = "/save";
pub const LIST_FILES: &str = "/list-files";
pub const DEPLOY_FILE: &str = "/deploy/{filename}";
pub const SWAGGER_UI: &str = "/swagger-ui";
pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";
