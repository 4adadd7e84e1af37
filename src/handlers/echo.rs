use crate::models::RequestEchoResponse;
use crate::payload;
use crate::routes;
use axum::{
    body::Bytes,
    extract::Query,
    http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode},
    Json,
};
use std::collections::{BTreeMap, HashMap};

const RAW_BODY_PREVIEW: usize = 200;

/// GET|POST /test handler - Echo what the service actually received
///
/// Useful for seeing how a proxy in front of the service rewrote a request.
/// The `Authorization` header value is never echoed.
#[utoipa::path(
    post,
    path = routes::REQUEST_ECHO,
    request_body(content = String, content_type = "*/*"),
    responses(
        (status = 200, description = "What the service received", body = RequestEchoResponse)
    ),
    tag = "health"
)]
pub async fn request_echo_handler(
    method: Method,
    Query(args): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<RequestEchoResponse>) {
    let has_json = payload::content_type(&headers).contains("application/json");

    let json_data = if has_json {
        serde_json::from_slice(&body).ok()
    } else {
        None
    };

    let form = payload::form_fields(&headers, &body)
        .map(|(fields, _)| fields)
        .unwrap_or_default();

    let raw_body: Option<String> = if body.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(&body).chars().take(RAW_BODY_PREVIEW).collect())
    };

    let headers: BTreeMap<String, String> = headers
        .iter()
        .filter_map(|(name, value)| {
            let value = if *name == AUTHORIZATION {
                "<redacted>"
            } else {
                value.to_str().ok()?
            };
            Some((name.as_str().to_string(), value.to_string()))
        })
        .collect();

    tracing::info!("Echoing {} request ({} bytes)", method, body.len());

    (
        StatusCode::OK,
        Json(RequestEchoResponse {
            method: method.to_string(),
            has_json,
            headers,
            args: args.into_iter().collect::<BTreeMap<_, _>>(),
            form,
            json_data,
            raw_body,
        }),
    )
}
