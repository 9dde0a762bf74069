//! Bounded fixed-interval polling.
//!
//! # Algorithm
//! ```text
//! deadline = start + timeout            (computed once)
//! loop:
//!     response = forward(request)       transport error → return Err
//!     verdict  = verify(response)       malformed payload → return Err
//!     Ready            → return response
//!     now > deadline   → return last response (soft timeout)
//!     drop(response); sleep(interval)
//! ```
//!
//! # Design Decisions
//! - Fixed interval, no backoff
//! - Only the final response leaves the poller; nothing is written mid-loop
//! - A soft timeout is a normal outcome, not an error
//! - Dropping the poll future (client gone, shutdown) stops it at the next await

use std::time::Duration;
use tokio::time::Instant;

use crate::config::PollConfig;
use crate::http::error::ProxyError;
use crate::http::forwarder::Forward;
use crate::http::request::BufferedRequest;
use crate::http::response::BackendResponse;
use crate::observability::metrics;
use crate::observability::screenshot::ScreenshotCapture;
use crate::resilience::verify::{Verdict, Verifier};
use crate::routing::matcher::session_id;

/// Timing knobs for a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub timeout: Duration,
    pub interval: Duration,
}

impl From<&PollConfig> for PollPolicy {
    fn from(config: &PollConfig) -> Self {
        Self {
            timeout: config.timeout(),
            interval: config.interval(),
        }
    }
}

/// Per-request polling state. Lives only as long as one poll.
#[derive(Debug)]
pub struct PollSession {
    started: Instant,
    deadline: Instant,
    attempts: u32,
}

impl PollSession {
    pub fn start(timeout: Duration) -> Self {
        let started = Instant::now();
        Self {
            started,
            deadline: started + timeout,
            attempts: 0,
        }
    }

    pub fn expired(&self) -> bool {
        Instant::now() > self.deadline
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    fn next_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }
}

/// The final state of a finished poll.
#[derive(Debug)]
pub struct PollOutcome {
    /// Last driver response: the verified one, or the last unverified one.
    pub response: BackendResponse,
    pub verdict: Verdict,
    pub attempts: u32,
    pub elapsed: Duration,
    pub timed_out: bool,
}

/// Repeats a forwarded request until a verifier accepts it or time runs out.
pub struct Poller<F> {
    forwarder: F,
    policy: PollPolicy,
    screenshots: Option<ScreenshotCapture>,
}

impl<F: Forward> Poller<F> {
    pub fn new(forwarder: F, policy: PollPolicy) -> Self {
        Self {
            forwarder,
            policy,
            screenshots: None,
        }
    }

    /// Capture a session screenshot whenever a poll times out.
    pub fn with_screenshots(mut self, capture: ScreenshotCapture) -> Self {
        self.screenshots = Some(capture);
        self
    }

    pub fn forwarder(&self) -> &F {
        &self.forwarder
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    pub async fn poll(
        &self,
        request: &BufferedRequest,
        verifier: &dyn Verifier,
    ) -> Result<PollOutcome, ProxyError> {
        let mut session = PollSession::start(self.policy.timeout);

        loop {
            let attempt = session.next_attempt();
            let response = self.forwarder.forward(request).await?;
            let verdict = verifier.verify(&response)?;

            if verdict.is_ready() {
                tracing::debug!(
                    path = %request.path,
                    attempt,
                    elapsed_ms = session.elapsed().as_millis() as u64,
                    "Poll verified"
                );
                return Ok(PollOutcome {
                    response,
                    verdict,
                    attempts: attempt,
                    elapsed: session.elapsed(),
                    timed_out: false,
                });
            }

            if session.expired() {
                tracing::info!(
                    path = %request.path,
                    attempts = attempt,
                    status = response.status.as_u16(),
                    timeout_ms = self.policy.timeout.as_millis() as u64,
                    "Poll timed out"
                );
                self.on_timeout(request).await;
                return Ok(PollOutcome {
                    response,
                    verdict,
                    attempts: attempt,
                    elapsed: session.elapsed(),
                    timed_out: true,
                });
            }

            tracing::debug!(
                path = %request.path,
                attempt,
                status = response.status.as_u16(),
                "Not ready, retrying"
            );
            drop(response);
            tokio::time::sleep(self.policy.interval).await;
        }
    }

    async fn on_timeout(&self, request: &BufferedRequest) {
        let Some(capture) = &self.screenshots else {
            return;
        };
        let Some(session) = session_id(&request.path) else {
            return;
        };

        match capture.capture(&self.forwarder, session).await {
            Ok(path) => {
                metrics::record_screenshot(true);
                tracing::info!(session = %session, path = %path.display(), "Saved timeout screenshot");
            }
            Err(e) => {
                metrics::record_screenshot(false);
                tracing::warn!(session = %session, error = %e, "Timeout screenshot failed");
            }
        }
    }
}
