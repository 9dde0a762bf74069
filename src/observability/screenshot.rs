//! Screenshots of a session when a poll gives up.
//!
//! Best effort: the caller logs failures and carries on with the timeout
//! result it already has.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::{Method, StatusCode};
use base64::Engine;
use serde::Deserialize;
use thiserror::Error;

use crate::http::error::ProxyError;
use crate::http::forwarder::Forward;
use crate::http::request::BufferedRequest;

#[derive(Debug, Error)]
pub enum ScreenshotError {
    #[error(transparent)]
    Forward(#[from] ProxyError),

    #[error("driver answered {0}")]
    Status(StatusCode),

    #[error("unexpected screenshot payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("screenshot is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("failed to write screenshot: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Deserialize)]
struct ScreenshotReply {
    value: String,
}

/// Fetches `GET /session/{id}/screenshot` and stores the PNG on disk.
#[derive(Debug, Clone)]
pub struct ScreenshotCapture {
    dir: PathBuf,
}

impl ScreenshotCapture {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn capture<F: Forward>(
        &self,
        forwarder: &F,
        session_id: &str,
    ) -> Result<PathBuf, ScreenshotError> {
        let request =
            BufferedRequest::empty(Method::GET, format!("/session/{}/screenshot", session_id));
        let response = forwarder.forward(&request).await?;
        if response.status != StatusCode::OK {
            return Err(ScreenshotError::Status(response.status));
        }

        let reply: ScreenshotReply = serde_json::from_slice(&response.body)?;
        let png = base64::engine::general_purpose::STANDARD.decode(reply.value.as_bytes())?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(file_name(session_id));
        tokio::fs::write(&path, png).await?;
        Ok(path)
    }
}

fn file_name(session_id: &str) -> String {
    let session: String = session_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("{}-{}.png", session, millis)
}
