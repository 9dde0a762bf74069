//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to the driver that may not be ready yet:
//!     → poller.rs (repeat at a fixed interval until the deadline)
//!     → verify.rs (decide whether this response means "ready")
//! ```
//!
//! # Design Decisions
//! - Every poll has a deadline, computed once
//! - Transport failures are not "not ready"; they end the poll
//! - "Element absent" and "not rendered yet" look the same and are both retried

pub mod poller;
pub mod verify;

pub use poller::{PollOutcome, PollPolicy, PollSession, Poller};
pub use verify::{StatusOk, ValueTrue, Verdict, Verifier, VerifyError};
