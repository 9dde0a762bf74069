//! Route lookup.
//!
//! # Responsibilities
//! - Hold the supported WebDriver surface as `(method, template)` routes
//! - Decide per route: plain forward, or rewrite + poll with a verifier
//! - Return the matched route or an explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (shared without locks)
//! - First match wins, in table order
//! - The table knows which responses mean "ready", nothing more

use std::sync::Arc;

use axum::http::Method;

use crate::resilience::verify::{StatusOk, ValueTrue, Verifier};
use crate::routing::matcher::RequestMatcher;

/// What the proxy writes back after a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// The final driver status and body, unchanged.
    Relay,
    /// `{"value": <verified>}` computed by the proxy.
    Derived,
}

/// How a matched request is handled.
#[derive(Debug, Clone)]
pub enum Handling {
    /// One request to the driver, relayed as is.
    Forward,
    /// Repeat until `verifier` accepts or the poll times out.
    Poll {
        verifier: Arc<dyn Verifier>,
        reply: Reply,
    },
}

/// A single route in the table.
#[derive(Debug, Clone)]
pub struct Route {
    /// Route identifier for logging/metrics.
    pub name: &'static str,
    pub matcher: RequestMatcher,
    /// Apply the convenience path rewrite before forwarding.
    pub rewrite: bool,
    pub handling: Handling,
}

impl Route {
    pub fn forward(name: &'static str, method: Method, template: &'static str) -> Self {
        Self {
            name,
            matcher: RequestMatcher::new(method, template),
            rewrite: false,
            handling: Handling::Forward,
        }
    }

    pub fn poll(
        name: &'static str,
        method: Method,
        template: &'static str,
        verifier: Arc<dyn Verifier>,
        reply: Reply,
    ) -> Self {
        Self {
            name,
            matcher: RequestMatcher::new(method, template),
            rewrite: false,
            handling: Handling::Poll { verifier, reply },
        }
    }

    /// Rewrite the shorthand path before it reaches the driver.
    pub fn rewritten(mut self) -> Self {
        self.rewrite = true;
        self
    }
}

/// Immutable route table.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new(routes: Vec<Route>) -> Self {
        tracing::debug!(routes = routes.len(), "Route table compiled");
        Self { routes }
    }

    /// The WebDriver surface this proxy exposes.
    pub fn webdriver() -> Self {
        let found: Arc<dyn Verifier> = Arc::new(StatusOk);
        let displayed: Arc<dyn Verifier> = Arc::new(ValueTrue);

        Self::new(vec![
            Route::forward("status", Method::GET, "/status"),
            // Sessions
            Route::forward("new_session", Method::POST, "/session"),
            Route::forward("delete_session", Method::DELETE, "/session/{session_id}"),
            // Navigation
            Route::forward("navigate", Method::POST, "/session/{session_id}/url"),
            Route::forward("current_url", Method::GET, "/session/{session_id}/url"),
            Route::forward("back", Method::POST, "/session/{session_id}/back"),
            Route::forward("forward", Method::POST, "/session/{session_id}/forward"),
            Route::forward("refresh", Method::POST, "/session/{session_id}/refresh"),
            Route::forward("title", Method::GET, "/session/{session_id}/title"),
            Route::forward("page_source", Method::GET, "/session/{session_id}/source"),
            // Element lookup
            Route::poll(
                "find_element",
                Method::POST,
                "/session/{session_id}/element",
                found.clone(),
                Reply::Relay,
            ),
            Route::poll(
                "find_elements",
                Method::POST,
                "/session/{session_id}/elements",
                found.clone(),
                Reply::Relay,
            ),
            Route::poll(
                "find_element_from_element",
                Method::POST,
                "/session/{session_id}/element/{element_id}/element",
                found.clone(),
                Reply::Relay,
            ),
            Route::poll(
                "find_elements_from_element",
                Method::POST,
                "/session/{session_id}/element/{element_id}/elements",
                found,
                Reply::Relay,
            ),
            Route::forward("active_element", Method::GET, "/session/{session_id}/element/active"),
            // Element interaction and state
            Route::forward("click", Method::POST, "/session/{session_id}/element/{element_id}/click"),
            Route::forward("clear", Method::POST, "/session/{session_id}/element/{element_id}/clear"),
            Route::forward("send_keys", Method::POST, "/session/{session_id}/element/{element_id}/value"),
            Route::forward("text", Method::GET, "/session/{session_id}/element/{element_id}/text"),
            Route::forward(
                "attribute",
                Method::GET,
                "/session/{session_id}/element/{element_id}/attribute/{name}",
            ),
            Route::forward(
                "property",
                Method::GET,
                "/session/{session_id}/element/{element_id}/property/{name}",
            ),
            Route::poll(
                "displayed",
                Method::GET,
                "/session/{session_id}/element/{element_id}/displayed",
                displayed.clone(),
                Reply::Derived,
            ),
            Route::poll(
                "is",
                Method::GET,
                "/session/{session_id}/element/{element_id}/is",
                displayed,
                Reply::Derived,
            )
            .rewritten(),
            // Scripts and screenshots
            Route::forward("execute_sync", Method::POST, "/session/{session_id}/execute/sync"),
            Route::forward("script", Method::POST, "/session/{session_id}/script").rewritten(),
            Route::forward("screenshot", Method::GET, "/session/{session_id}/screenshot"),
            // Windows and tabs
            Route::forward("window_handle", Method::GET, "/session/{session_id}/window"),
            Route::forward("switch_window", Method::POST, "/session/{session_id}/window"),
            Route::forward("close_window", Method::DELETE, "/session/{session_id}/window"),
            Route::forward("window_handles", Method::GET, "/session/{session_id}/window/handles"),
            Route::forward("new_window", Method::POST, "/session/{session_id}/window/new"),
            // Input actions
            Route::forward("perform_actions", Method::POST, "/session/{session_id}/actions"),
            Route::forward("release_actions", Method::DELETE, "/session/{session_id}/actions"),
        ])
    }

    /// Find the first route matching `method` and `path`.
    pub fn match_request(&self, method: &Method, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.matcher.matches(method, path))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}
