//! Retrying WebDriver proxy library.
//!
//! Sits between test code and a WebDriver server and turns element lookups
//! and visibility checks into bounded polling loops.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
