use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the `sdcloud-api` crate.
///
/// Every failure surfaces to the immediate caller: there are no internal
/// retries and no silent suppression anywhere in the crate. Write
/// operations fail with [`Error::Api`] on any non-success HTTP status
/// rather than returning a success flag.
#[derive(Debug, Error)]
pub enum Error {
    // ── Local validation ────────────────────────────────────────────
    /// An argument failed local validation (malformed name, subnet, IP,
    /// or port range). Raised before any request is issued.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    // ── Remote API ──────────────────────────────────────────────────
    /// Non-success HTTP status from the remote API, with the raw body.
    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    /// The decoded body lacks an expected field or is not the expected
    /// shape (e.g. no `enabled` key in an outbound PAT response).
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Polling ─────────────────────────────────────────────────────
    /// A polling loop hit its caller-supplied deadline before the
    /// status condition was met.
    #[error("Timed out after {waited:?} polling on status {status:?}")]
    PollTimeout { status: String, waited: Duration },
}

impl Error {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// The HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if this is a "not found" error from the remote API.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
