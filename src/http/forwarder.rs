//! Single-shot relay to the WebDriver server.
//!
//! # Responsibilities
//! - Build the driver request from a buffered request (method, path, body)
//! - Execute it on a shared, pooled connection
//! - Drain the driver's body so the connection can be reused
//!
//! # Design Decisions
//! - Stateless apart from the client pool; safe to call repeatedly
//! - Transport errors are returned unchanged, never retried here
//! - Redirects are not followed

use std::future::Future;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, Request, Response, Uri};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::{DriverConfig, LimitsConfig};
use crate::http::error::ProxyError;
use crate::http::request::BufferedRequest;
use crate::http::response::BackendResponse;

/// Anything that can send one buffered request to the driver.
pub trait Forward: Send + Sync {
    fn forward(
        &self,
        request: &BufferedRequest,
    ) -> impl Future<Output = Result<BackendResponse, ProxyError>> + Send;
}

/// Headers that describe the inbound hop and must not be replayed.
/// Includes `Accept-Encoding`: driver bodies must arrive uncompressed.
const HOP_HEADERS: [HeaderName; 9] = [
    header::ACCEPT_ENCODING,
    header::HOST,
    header::CONTENT_LENGTH,
    header::CONNECTION,
    header::TRANSFER_ENCODING,
    header::TE,
    header::TRAILER,
    header::UPGRADE,
    header::PROXY_AUTHORIZATION,
];

/// Forwards requests to `{driver.address}{path}`.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    base: String,
    max_response_bytes: usize,
}

impl Forwarder {
    pub fn new(driver: &DriverConfig, limits: &LimitsConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(driver.connect_timeout()));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(driver.pool_idle_timeout())
            .build(connector);

        Self {
            client,
            base: driver.address.trim_end_matches('/').to_string(),
            max_response_bytes: limits.max_response_body_bytes,
        }
    }

    /// Driver URL for a request path.
    pub fn target(&self, request: &BufferedRequest) -> Result<Uri, ProxyError> {
        Ok(format!("{}{}", self.base, request.path_and_query()).parse()?)
    }
}

impl Forward for Forwarder {
    async fn forward(&self, request: &BufferedRequest) -> Result<BackendResponse, ProxyError> {
        let uri = self.target(request)?;

        let mut builder = Request::builder().method(request.method.clone()).uri(uri);
        if let Some(headers) = builder.headers_mut() {
            copy_end_to_end(&request.headers, headers);
        }
        let outbound = builder.body(Body::from(request.body.clone()))?;

        let response: Response<Incoming> = self.client.request(outbound).await?;
        let status = response.status();
        let body = axum::body::to_bytes(Body::new(response.into_body()), self.max_response_bytes)
            .await
            .map_err(ProxyError::ResponseBody)?;

        tracing::trace!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            bytes = body.len(),
            "Driver responded"
        );

        Ok(BackendResponse { status, body })
    }
}

fn copy_end_to_end(from: &HeaderMap, to: &mut HeaderMap) {
    for (name, value) in from.iter() {
        if HOP_HEADERS.contains(name) || name.as_str() == "keep-alive" {
            continue;
        }
        to.append(name.clone(), value.clone());
    }
}
