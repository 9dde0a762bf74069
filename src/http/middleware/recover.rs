//! Panic recovery.
//!
//! The one fault boundary for anything not already expressed as a
//! `ProxyError`: a panic in a handler becomes a 500 instead of a dropped
//! connection. A panic carrying [`AbortRequest`] is resumed untouched so the
//! handler can deliberately abandon the response.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::task::{Context, Poll};

use axum::http::{Request, StatusCode};
use axum::response::Response;
use futures_util::future::{BoxFuture, FutureExt};
use tower::{Layer, Service};

use crate::http::response::webdriver_error;

/// Panic payload that aborts the request instead of producing a 500.
#[derive(Debug, Clone, Copy)]
pub struct AbortRequest;

/// Wraps services with [`Recover`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RecoverLayer;

impl<S> Layer<S> for RecoverLayer {
    type Service = Recover<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Recover { inner }
    }
}

/// Converts panics from the inner service into 500 responses.
#[derive(Debug, Clone)]
pub struct Recover<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for Recover<S>
where
    S: Service<Request<B>, Response = Response>,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<B>) -> Self::Future {
        let future = match panic::catch_unwind(AssertUnwindSafe(|| self.inner.call(request))) {
            Ok(future) => future,
            Err(payload) => {
                let response = recovered(payload);
                return Box::pin(async move { Ok(response) });
            }
        };

        Box::pin(async move {
            match AssertUnwindSafe(future).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => Ok(recovered(payload)),
            }
        })
    }
}

fn recovered(payload: Box<dyn Any + Send>) -> Response {
    if payload.is::<AbortRequest>() {
        panic::resume_unwind(payload);
    }

    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    tracing::error!(panic = %message, "Handler panicked");

    webdriver_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "unknown error",
        "internal proxy error",
    )
}
