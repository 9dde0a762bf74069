//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!     → screenshot.rs (session screenshot when a poll times out)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//!     → screenshots directory
//! ```

pub mod logging;
pub mod metrics;
pub mod screenshot;
