//! Adapter that runs the router inside a serverless function invocation.
//!
//! The function host hands over one JSON event per request and expects one
//! JSON envelope back. Everything in between goes through the same router as
//! the HTTP server.

use axum::{
    body::Body,
    http::{header::HeaderName, HeaderMap, HeaderValue, Method, Request, StatusCode},
    response::Response,
    Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tower::ServiceExt;

/// Prefix the function host puts in front of every routed path.
pub const FUNCTION_BASE_PATH: &str = "/.netlify/functions/api";

const CORS_HEADERS: [(&str, &str); 3] = [
    ("access-control-allow-origin", "*"),
    ("access-control-allow-headers", "Content-Type, Authorization"),
    ("access-control-allow-methods", "GET, POST, PUT, DELETE, OPTIONS"),
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionEvent {
    pub http_method: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub query_string_parameters: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("invalid HTTP method: {0:?}")]
    Method(String),
    #[error("body is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid request: {0}")]
    Request(#[from] axum::http::Error),
    #[error("failed to read response body: {0}")]
    ResponseBody(#[from] axum::Error),
}

impl FunctionResponse {
    fn with_cors(status: StatusCode, body: String) -> Self {
        let mut response = Self {
            status_code: status.as_u16(),
            headers: BTreeMap::new(),
            body,
            is_base64_encoded: false,
        };
        response.add_cors_headers();
        response
    }

    fn add_cors_headers(&mut self) {
        for (name, value) in CORS_HEADERS {
            self.headers.insert(name.to_string(), value.to_string());
        }
    }
}

/// Strips the function prefix so `/.netlify/functions/api/projects` routes
/// as `/projects`.
pub fn route_path(raw: &str) -> String {
    let path = raw.strip_prefix(FUNCTION_BASE_PATH).unwrap_or(raw);
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Translates one event into a request.
pub fn into_request(event: FunctionEvent) -> Result<Request<Body>, AdapterError> {
    let method = Method::from_bytes(event.http_method.to_ascii_uppercase().as_bytes())
        .map_err(|_| AdapterError::Method(event.http_method.clone()))?;

    let mut uri = route_path(&event.path);
    if let Some(params) = event.query_string_parameters.filter(|p| !p.is_empty()) {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter())
            .finish();
        uri.push('?');
        uri.push_str(&query);
    }

    let body = match event.body {
        Some(body) if event.is_base64_encoded => Body::from(BASE64.decode(body)?),
        Some(body) => Body::from(body),
        None => Body::empty(),
    };

    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in &event.headers {
        // Skip headers that cannot be represented rather than failing the call.
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            builder = builder.header(name, value);
        }
    }

    Ok(builder.body(body)?)
}

/// One entry per header name; repeated values (`vary`) are joined with ", ".
/// Values that are not visible ASCII are dropped.
fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .keys()
        .filter_map(|name| {
            let values: Vec<&str> = headers
                .get_all(name)
                .iter()
                .filter_map(|value| value.to_str().ok())
                .collect();
            (!values.is_empty()).then(|| (name.as_str().to_string(), values.join(", ")))
        })
        .collect()
}

/// Translates a response into the outbound envelope. Bodies that are not
/// UTF-8 (compressed or binary) are sent base64-encoded.
pub async fn from_response(response: Response) -> Result<FunctionResponse, AdapterError> {
    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await?;

    let headers = flatten_headers(&parts.headers);

    let (body, is_base64_encoded) = match String::from_utf8(bytes.to_vec()) {
        Ok(text) => (text, false),
        Err(raw) => (BASE64.encode(raw.into_bytes()), true),
    };

    let mut envelope = FunctionResponse {
        status_code: parts.status.as_u16(),
        headers,
        body,
        is_base64_encoded,
    };
    envelope.add_cors_headers();
    Ok(envelope)
}

/// Runs one event through `app`. Preflight requests are answered here and
/// never reach a handler.
pub async fn handle_event(app: Router, event: FunctionEvent) -> FunctionResponse {
    if event.http_method.eq_ignore_ascii_case("OPTIONS") {
        return FunctionResponse::with_cors(StatusCode::OK, String::new());
    }

    let request = match into_request(event) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Rejected serverless event: {}", e);
            let body = serde_json::json!({ "message": e.to_string() }).to_string();
            return FunctionResponse::with_cors(StatusCode::BAD_REQUEST, body);
        }
    };

    let response = match app.oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    match from_response(response).await {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::error!("Failed to translate response: {}", e);
            let body = serde_json::json!({ "message": "Internal server error" }).to_string();
            FunctionResponse::with_cors(StatusCode::INTERNAL_SERVER_ERROR, body)
        }
    }
}
