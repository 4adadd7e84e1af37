//! Recovery of a `filename`/`jsonData` pair from an incoming request.
//!
//! Some hosting proxies rewrite `POST` to `GET` and drop the body, others strip
//! the content type. Clients therefore send the pair in whichever place
//! survives, and the resolver checks each of them in a fixed order.

use crate::error::ApiError;
use axum::http::{header::CONTENT_TYPE, HeaderMap, Method};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};

pub const FILENAME_FIELD: &str = "filename";
pub const JSON_DATA_FIELD: &str = "jsonData";

/// Where a save request was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSource {
    /// `?filename=..&jsonData=..`
    QueryParams,
    /// JSON object body, whatever the declared content type
    JsonBody,
    /// `?data=..` or `?body=..` holding the whole JSON object
    QueryEnvelope,
    /// `application/x-www-form-urlencoded` fields
    UrlEncodedForm,
    /// `multipart/form-data` text fields
    MultipartForm,
}

/// A resolved request to store `json_data` under `filename`
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub filename: String,
    pub json_data: JsonValue,
    pub source: PayloadSource,
}

/// Resolve a save request, trying every supported location in order.
///
/// # Errors
/// * [`ApiError::InvalidJson`] - a textual `jsonData` was found but does not parse
/// * [`ApiError::MissingFields`] - no location carried both fields
pub fn resolve(
    method: &Method,
    query: &HashMap<String, String>,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<SaveRequest, ApiError> {
    if let Some(request) = from_query_params(query)? {
        return Ok(request);
    }

    if let Some(object) = parse_json_body(body) {
        if let Some(request) = from_json_object(&object, PayloadSource::JsonBody) {
            return Ok(request);
        }
    }

    if let Some(request) = from_query_envelope(query) {
        return Ok(request);
    }

    if let Some((fields, source)) = form_fields(headers, body) {
        if let Some(request) = from_text_fields(&fields, source)? {
            return Ok(request);
        }
    }

    Err(ApiError::MissingFields {
        method: method.to_string(),
    })
}

/// Resolve a save request from query parameters only.
///
/// # Errors
/// * [`ApiError::MissingQueryParams`] - `filename` or `jsonData` absent or empty
/// * [`ApiError::InvalidJson`] - `jsonData` does not parse
pub fn from_query(query: &HashMap<String, String>) -> Result<SaveRequest, ApiError> {
    let missing: Vec<&'static str> = [FILENAME_FIELD, JSON_DATA_FIELD]
        .into_iter()
        .filter(|field| non_empty(query, field).is_none())
        .collect();

    if !missing.is_empty() {
        return Err(ApiError::MissingQueryParams(missing));
    }

    from_query_params(query)?.ok_or(ApiError::MissingQueryParams(vec![
        FILENAME_FIELD,
        JSON_DATA_FIELD,
    ]))
}

/// Text fields of a form-encoded or multipart body, keyed by field name.
///
/// Returns `None` when the content type is neither form encoding.
pub fn form_fields(
    headers: &HeaderMap,
    body: &[u8],
) -> Option<(BTreeMap<String, String>, PayloadSource)> {
    let content_type = content_type(headers);

    if content_type.contains("application/x-www-form-urlencoded") {
        let fields: BTreeMap<String, String> = form_urlencoded::parse(body)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        return Some((fields, PayloadSource::UrlEncodedForm));
    }

    if content_type.contains("multipart/form-data") {
        return parse_multipart_text_fields(body, content_type)
            .map(|fields| (fields, PayloadSource::MultipartForm));
    }

    None
}

pub fn content_type(headers: &HeaderMap) -> &str {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

fn non_empty<'a>(fields: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
}

fn from_query_params(query: &HashMap<String, String>) -> Result<Option<SaveRequest>, ApiError> {
    let (Some(filename), Some(json_text)) = (
        non_empty(query, FILENAME_FIELD),
        non_empty(query, JSON_DATA_FIELD),
    ) else {
        return Ok(None);
    };

    let json_data = serde_json::from_str(json_text).map_err(ApiError::InvalidJson)?;
    Ok(Some(SaveRequest {
        filename: filename.to_string(),
        json_data,
        source: PayloadSource::QueryParams,
    }))
}

fn parse_json_body(body: &[u8]) -> Option<JsonValue> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }

    match serde_json::from_slice(body) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!("Request body is not JSON: {}", err);
            None
        }
    }
}

/// `jsonData` is taken verbatim here, since the object is already typed JSON.
fn from_json_object(object: &JsonValue, source: PayloadSource) -> Option<SaveRequest> {
    let filename = object.get(FILENAME_FIELD)?.as_str()?;
    if filename.trim().is_empty() {
        return None;
    }
    let json_data = object.get(JSON_DATA_FIELD)?.clone();

    Some(SaveRequest {
        filename: filename.to_string(),
        json_data,
        source,
    })
}

fn from_query_envelope(query: &HashMap<String, String>) -> Option<SaveRequest> {
    let envelope = non_empty(query, "data").or_else(|| non_empty(query, "body"))?;

    match serde_json::from_str::<JsonValue>(envelope) {
        Ok(object) => from_json_object(&object, PayloadSource::QueryEnvelope),
        Err(err) => {
            tracing::warn!("Ignoring unparseable query envelope: {}", err);
            None
        }
    }
}

fn from_text_fields(
    fields: &BTreeMap<String, String>,
    source: PayloadSource,
) -> Result<Option<SaveRequest>, ApiError> {
    let (Some(filename), Some(json_text)) = (
        fields.get(FILENAME_FIELD).filter(|v| !v.trim().is_empty()),
        fields.get(JSON_DATA_FIELD).filter(|v| !v.trim().is_empty()),
    ) else {
        return Ok(None);
    };

    let json_data = serde_json::from_str(json_text).map_err(ApiError::InvalidJson)?;
    Ok(Some(SaveRequest {
        filename: filename.clone(),
        json_data,
        source,
    }))
}

/// Text fields of a `multipart/form-data` body. File parts are skipped.
fn parse_multipart_text_fields(
    body: &[u8],
    content_type: &str,
) -> Option<BTreeMap<String, String>> {
    let boundary = content_type
        .split(';')
        .find_map(|param| param.trim().strip_prefix("boundary="))?
        .trim_matches('"');
    if boundary.is_empty() {
        return None;
    }
    let delimiter = format!("--{}", boundary);

    let body = String::from_utf8_lossy(body);
    let mut fields = BTreeMap::new();

    for part in body.split(delimiter.as_str()) {
        if part.trim().is_empty() || part.starts_with("--") {
            continue;
        }

        let Some((part_headers, content)) = part.split_once("\r\n\r\n") else {
            continue;
        };

        let Some(disposition) = part_headers
            .lines()
            .find(|line| line.to_ascii_lowercase().starts_with("content-disposition:"))
        else {
            continue;
        };

        let mut name = None;
        let mut is_file = false;
        for param in disposition.split(';').map(str::trim) {
            if let Some(value) = param.strip_prefix("name=") {
                name = Some(value.trim_matches('"'));
            } else if param.starts_with("filename=") {
                is_file = true;
            }
        }

        if let (Some(name), false) = (name, is_file) {
            let value = content.strip_suffix("\r\n").unwrap_or(content);
            fields.insert(name.to_string(), value.to_string());
        }
    }

    Some(fields)
}
