//! Response construction.
//!
//! # Responsibilities
//! - Relay the final driver response (status and body, byte-for-byte)
//! - Synthesize `{"value": <bool>}` for derived endpoints
//! - Shape proxy-side failures like WebDriver errors
//!
//! # Design Decisions
//! - Every response is `application/json`
//! - Backend headers are not relayed; status and body carry the protocol

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

pub const APPLICATION_JSON: &str = "application/json";

/// A driver response with its body fully drained.
#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl BackendResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Relay a driver response to the caller unchanged.
pub fn relay(response: BackendResponse) -> Response {
    json_response(response.status, response.body)
}

/// The proxy's own answer for derived ("is") endpoints.
pub fn derived(value: bool) -> Response {
    json_response(StatusCode::OK, json!({ "value": value }).to_string())
}

/// A WebDriver-style error body: `{"value": {"error", "message", "stacktrace"}}`.
pub fn webdriver_error(status: StatusCode, error: &str, message: &str) -> Response {
    let body = json!({
        "value": {
            "error": error,
            "message": message,
            "stacktrace": "",
        }
    });
    json_response(status, body.to_string())
}

fn json_response(status: StatusCode, body: impl Into<Body>) -> Response {
    let mut response = (status, body.into()).into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(APPLICATION_JSON),
    );
    response
}
