//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (route lookup over the WebDriver table)
//!     → matcher.rs (structural template match)
//!     → Return: matched Route or NoMatch
//!     → rewrite.rs (shorthand last segment → driver path), when flagged
//! ```
//!
//! # Design Decisions
//! - Routes built at startup, immutable at runtime
//! - No regex in the hot path
//! - Deterministic: same input always matches same route

pub mod matcher;
pub mod rewrite;
pub mod router;

pub use rewrite::rewrite_path;
pub use router::{Handling, Reply, Route, Router};
