//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, buffer method/path/headers/body once)
//!     → [routing decides: forward, or rewrite + poll]
//!     → forwarder.rs (one round-trip to the driver, body drained)
//!     → response.rs (relay, derived value, or error body)
//!     → Send to client
//! ```

pub mod error;
pub mod forwarder;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use error::ProxyError;
pub use forwarder::{Forward, Forwarder};
pub use request::{BufferedRequest, MakeRequestUuidV4, X_REQUEST_ID};
pub use response::BackendResponse;
pub use server::HttpServer;
