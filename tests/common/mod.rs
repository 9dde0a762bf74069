//! Shared utilities for integration testing.
#![allow(dead_code)]

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Router;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::net::TcpListener;

use wait_proxy::{HttpServer, ProxyConfig, Shutdown};

/// One request as the mock driver saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub at: Instant,
}

type ReplyFn = dyn Fn(&Recorded, usize) -> (u16, String) + Send + Sync;

/// A programmable WebDriver stand-in listening on an ephemeral port.
pub struct MockDriver {
    pub addr: SocketAddr,
    calls: Arc<Mutex<Vec<Recorded>>>,
}

impl MockDriver {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<Recorded> {
        self.calls().into_iter().filter(|c| c.path == path).collect()
    }
}

/// Start a mock driver.
///
/// `reply` gets the request and how many times its path has been hit,
/// counting this call (1-based), and returns status and JSON body.
pub async fn start_programmable_backend<F>(reply: F) -> MockDriver
where
    F: Fn(&Recorded, usize) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let calls: Arc<Mutex<Vec<Recorded>>> = Arc::default();
    let reply: Arc<ReplyFn> = Arc::new(reply);

    let recorded = calls.clone();
    let app = Router::new().fallback(move |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| {
        let calls = recorded.clone();
        let reply = reply.clone();
        async move {
            let request = Recorded {
                method,
                path: uri.path().to_string(),
                query: uri.query().map(str::to_string),
                headers,
                body,
                at: Instant::now(),
            };
            let hits = {
                let mut calls = calls.lock().unwrap();
                calls.push(request.clone());
                calls.iter().filter(|c| c.path == request.path).count()
            };

            let (status, body) = reply(&request, hits);
            (
                StatusCode::from_u16(status).unwrap(),
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response()
        }
    });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockDriver { addr, calls }
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Config pointing at `driver_url` with the given poll timing.
pub fn proxy_config(driver_url: &str, timeout_ms: u64, interval_ms: u64) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.driver.address = driver_url.to_string();
    config.polling.timeout_ms = timeout_ms;
    config.polling.interval_ms = interval_ms;
    config
}

/// A proxy running on an ephemeral port.
pub struct TestProxy {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_proxy(mut config: ProxyConfig) -> TestProxy {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = HttpServer::new(config).run(listener, server_shutdown).await;
    });

    TestProxy { addr, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
