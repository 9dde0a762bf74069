//! Request logging middleware.
//! Records method, path, status and latency once the response is ready.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::http::request::request_id;
use crate::observability::metrics;

pub async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request_id(&request).to_string();

    let response = next.run(request).await;

    let status = response.status();
    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        status = status.as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );
    metrics::record_request(method.as_str(), status.as_u16(), start);

    response
}
