//! Proxy error type and its single mapping to an HTTP response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::http::response::webdriver_error;
use crate::resilience::verify::VerifyError;

/// Errors that abort a proxied request.
///
/// A soft poll timeout is not one of these: it produces a normal response.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Backend unreachable, connection refused or reset. Never retried.
    #[error("driver request failed: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    /// The backend answered with something the verifier cannot interpret.
    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error("invalid driver uri: {0}")]
    InvalidUri(#[from] axum::http::uri::InvalidUri),

    #[error("failed to build driver request: {0}")]
    BuildRequest(#[from] axum::http::Error),

    #[error("failed to read request body: {0}")]
    RequestBody(#[source] axum::Error),

    #[error("failed to read driver response body: {0}")]
    ResponseBody(#[source] axum::Error),
}

impl ProxyError {
    /// Short machine-readable kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Transport(_) => "transport",
            ProxyError::Verify(_) => "verify",
            ProxyError::InvalidUri(_) => "invalid_uri",
            ProxyError::BuildRequest(_) => "build_request",
            ProxyError::RequestBody(_) => "request_body",
            ProxyError::ResponseBody(_) => "response_body",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        tracing::error!(kind = self.kind(), error = %self, "Proxy request failed");
        webdriver_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "unknown error",
            &self.to_string(),
        )
    }
}
