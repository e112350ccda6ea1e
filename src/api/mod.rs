//! Typed wrappers around the VietGuardScan backend REST API.

pub mod access_log;
pub mod ip;
pub mod scan;

use serde::Deserialize;

/// Error type for backend API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status}: {message}")]
    Backend {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("failed to write report file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Deserialize)]
struct BackendErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Turn a non-2xx response into [`ApiError::Backend`], surfacing the
/// backend's `message` (or `error`) field when the body carries one.
pub(crate) async fn check_backend(
    response: reqwest::Response,
    fallback: &str,
) -> Result<reqwest::Response, ApiError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let message = match response.json::<BackendErrorBody>().await {
        Ok(body) => body
            .message
            .or(body.error)
            .unwrap_or_else(|| fallback.to_string()),
        Err(_) => fallback.to_string(),
    };

    Err(ApiError::Backend { status, message })
}
