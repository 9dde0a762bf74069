//! Cross-cutting request middleware.

pub mod logger;
pub mod recover;

pub use logger::log_requests;
pub use recover::{AbortRequest, RecoverLayer};
