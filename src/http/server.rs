//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the proxy handler
//! - Wire up middleware (request ID, logging, panic recovery, timeout)
//! - Dispatch requests through the route table
//! - Forward directly, or poll until the driver reports ready
//! - Serve until the shutdown signal fires

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware,
    response::Response,
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
};

use crate::config::ProxyConfig;
use crate::http::error::ProxyError;
use crate::http::forwarder::{Forward, Forwarder};
use crate::http::middleware::{log_requests, RecoverLayer};
use crate::http::request::{BufferedRequest, MakeRequestUuidV4};
use crate::http::response::{self, APPLICATION_JSON};
use crate::observability::{metrics, screenshot::ScreenshotCapture};
use crate::resilience::poller::{PollPolicy, Poller};
use crate::routing::{rewrite_path, Handling, Reply, Router as ProxyRouter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ProxyRouter>,
    pub poller: Arc<Poller<Forwarder>>,
    pub max_request_body_bytes: usize,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Self {
        let forwarder = Forwarder::new(&config.driver, &config.limits);

        let mut poller = Poller::new(forwarder, PollPolicy::from(&config.polling));
        if config.polling.screenshot_on_fail {
            poller = poller.with_screenshots(ScreenshotCapture::new(&config.polling.screenshots_dir));
        }

        let state = AppState {
            router: Arc::new(ProxyRouter::webdriver()),
            poller: Arc::new(poller),
            max_request_body_bytes: config.limits.max_request_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(RecoverLayer)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::from_fn(log_requests))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
            .layer(SetResponseHeaderLayer::overriding(
                header::CONTENT_TYPE,
                HeaderValue::from_static(APPLICATION_JSON),
            ))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            driver = %self.config.driver.address,
            poll_timeout_ms = self.config.polling.timeout_ms,
            poll_interval_ms = self.config.polling.interval_ms,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn into_router(self) -> Router {
        self.router
    }
}

/// Main proxy handler.
/// Looks up the route, rewrites the path if needed, then forwards or polls.
async fn proxy_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Response, ProxyError> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let Some(route) = state.router.match_request(&method, &path) else {
        tracing::warn!(method = %method, path = %path, "No route matched");
        return Ok(response::webdriver_error(
            StatusCode::NOT_FOUND,
            "unknown command",
            &format!("{} {}", method, path),
        ));
    };

    let mut buffered = BufferedRequest::from_request(request, state.max_request_body_bytes).await?;
    if route.rewrite {
        buffered.path = rewrite_path(&buffered.path).into_owned();
    }

    tracing::debug!(
        route = route.name,
        method = %method,
        path = %path,
        driver_path = %buffered.path,
        "Proxying request"
    );

    match &route.handling {
        Handling::Forward => {
            let backend = state.poller.forwarder().forward(&buffered).await?;
            Ok(response::relay(backend))
        }
        Handling::Poll { verifier, reply } => {
            let outcome = state.poller.poll(&buffered, verifier.as_ref()).await?;
            metrics::record_poll(route.name, outcome.attempts, outcome.timed_out);

            Ok(match reply {
                Reply::Relay => response::relay(outcome.response),
                Reply::Derived => response::derived(outcome.verdict.is_ready()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_unknown_command_is_404_json() {
        let app = HttpServer::new(ProxyConfig::default()).into_router();

        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[header::CONTENT_TYPE], APPLICATION_JSON);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_existing_request_id_kept() {
        let app = HttpServer::new(ProxyConfig::default()).into_router();

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/session")
                    .header("x-request-id", "given-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["x-request-id"], "given-id");
    }
}
