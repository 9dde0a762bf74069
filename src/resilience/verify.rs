//! Response verifiers.
//!
//! A verifier decides whether a driver response means "ready" and the poll
//! may stop. Verifiers are stateless and shared across requests.

use axum::http::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::http::response::BackendResponse;

/// Result of inspecting one driver response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Ready,
    Pending,
}

impl Verdict {
    pub fn is_ready(self) -> bool {
        matches!(self, Verdict::Ready)
    }
}

/// The driver broke the response contract.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("malformed driver payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

/// Predicate over a driver response.
pub trait Verifier: Send + Sync + std::fmt::Debug {
    fn verify(&self, response: &BackendResponse) -> Result<Verdict, VerifyError>;
}

/// Ready once the driver answers 200.
///
/// Used where the driver's success already means the element is there
/// (element lookup).
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusOk;

impl Verifier for StatusOk {
    fn verify(&self, response: &BackendResponse) -> Result<Verdict, VerifyError> {
        Ok(if response.status == StatusCode::OK {
            Verdict::Ready
        } else {
            Verdict::Pending
        })
    }
}

/// Ready once the driver answers 200 with `{"value": true}`.
///
/// Used for boolean endpoints such as `displayed`. A 200 body that is not
/// `{"value": <bool>}` is an error, not a pending state.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueTrue;

#[derive(Deserialize)]
struct BoolReply {
    value: bool,
}

impl Verifier for ValueTrue {
    fn verify(&self, response: &BackendResponse) -> Result<Verdict, VerifyError> {
        if response.status != StatusCode::OK {
            return Ok(Verdict::Pending);
        }

        let reply: BoolReply = serde_json::from_slice(&response.body)?;
        Ok(if reply.value {
            Verdict::Ready
        } else {
            Verdict::Pending
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &'static str) -> BackendResponse {
        BackendResponse::new(StatusCode::from_u16(status).unwrap(), body)
    }

    #[test]
    fn test_status_ok() {
        assert_eq!(StatusOk.verify(&response(200, "")).unwrap(), Verdict::Ready);
        assert_eq!(
            StatusOk.verify(&response(404, r#"{"value":{"error":"no such element"}}"#)).unwrap(),
            Verdict::Pending
        );
        assert_eq!(StatusOk.verify(&response(500, "")).unwrap(), Verdict::Pending);
    }

    #[test]
    fn test_value_true() {
        assert_eq!(
            ValueTrue.verify(&response(200, r#"{"value":true}"#)).unwrap(),
            Verdict::Ready
        );
        assert_eq!(
            ValueTrue.verify(&response(200, r#"{"value":false}"#)).unwrap(),
            Verdict::Pending
        );
    }

    #[test]
    fn test_value_true_skips_decoding_on_error_status() {
        // Error bodies never decode as a bool reply.
        assert_eq!(
            ValueTrue
                .verify(&response(404, r#"{"value":{"error":"stale element reference"}}"#))
                .unwrap(),
            Verdict::Pending
        );
    }

    #[test]
    fn test_value_true_malformed_is_fatal() {
        assert!(ValueTrue.verify(&response(200, "not json")).is_err());
        assert!(ValueTrue.verify(&response(200, r#"{"value":"yes"}"#)).is_err());
        assert!(ValueTrue.verify(&response(200, r#"{}"#)).is_err());
    }
}
