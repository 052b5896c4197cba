//! Error taxonomy for the Jikan client.
//!
//! Every failure a facade method can produce is a [`JikanError`]. Callers that
//! want to special-case a condition (most commonly "not found") use the
//! predicates on [`JikanError`] rather than matching on message text.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, JikanError>;

/// Boxed error carried by transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Maximum number of body characters kept in error messages.
const SNIPPET_CHARS: usize = 200;

/// Top-level error returned by every client operation.
#[derive(Debug, Error)]
pub enum JikanError {
    /// Caller input rejected before any network call was made.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The HTTP round-trip did not complete.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a success status but the body is not the
    /// expected JSON envelope.
    #[error("failed to decode response body: {source} (body: {snippet})")]
    Decode {
        #[source]
        source: serde_json::Error,
        snippet: String,
    },

    /// The server answered with a non-success status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The client could not be constructed from the supplied configuration.
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl JikanError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// The API error, if the server rejected the request.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Classification of the API error, if any.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.api_error().map(|err| err.kind)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == Some(ErrorKind::NotFound)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.kind() == Some(ErrorKind::RateLimited)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// True when the request context was cancelled explicitly.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Transport(TransportError::Cancelled))
    }

    /// True when the request context's deadline (or the client's default
    /// timeout) passed before the response arrived.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(TransportError::DeadlineExceeded))
    }
}

/// Failures below the HTTP status line.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request cancelled")]
    Cancelled,

    #[error("request deadline exceeded")]
    DeadlineExceeded,

    /// Connection, DNS, TLS or body-read failure reported by the transport.
    #[error("network error: {0}")]
    Network(#[source] BoxError),
}

impl TransportError {
    pub fn network(err: impl Into<BoxError>) -> Self {
        Self::Network(err.into())
    }
}

/// Classification of a non-success HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    RateLimited,
    BadRequest,
    ServerError,
    Unknown,
}

impl ErrorKind {
    /// 404 and 429 are singled out; the rest of 4xx is a bad request and
    /// 5xx a server error. Anything else (1xx, 3xx) is unknown.
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => Self::NotFound,
            429 => Self::RateLimited,
            400..=499 => Self::BadRequest,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::BadRequest => "bad_request",
            Self::ServerError => "server_error",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error reported by the API for a non-success status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("API error {status} ({kind}): {message}")]
pub struct ApiError {
    /// HTTP status of the response.
    pub status: u16,
    pub kind: ErrorKind,
    /// Exception name reported by the API, e.g. `NotFoundException`.
    pub error_type: String,
    pub message: String,
}

impl ApiError {
    /// Build an API error from a status code and the raw response body.
    ///
    /// The body is decoded leniently as `{status, type, message, error}`.
    /// The HTTP status always wins over the body's `status` field. When the
    /// body carries no usable message, a snippet of the raw body (or the
    /// status' reason phrase for an empty body) is used instead.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let parsed = serde_json::from_slice::<ErrorBody>(body).ok();

        let (error_type, message) = match parsed {
            Some(body) => {
                let message = body
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .or(body.error.filter(|e| !e.trim().is_empty()));
                (body.error_type.unwrap_or_default(), message)
            }
            None => (String::new(), None),
        };

        let message = message.unwrap_or_else(|| {
            let raw = snippet(body);
            if raw.is_empty() {
                reason_phrase(status).to_string()
            } else {
                raw
            }
        });

        Self {
            status,
            kind: ErrorKind::from_status(status),
            error_type,
            message,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    pub fn is_rate_limited(&self) -> bool {
        self.kind == ErrorKind::RateLimited
    }
}

/// Error body shape used by the API. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    #[allow(dead_code)]
    status: Option<serde_json::Value>,
    #[serde(rename = "type")]
    error_type: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

/// First few characters of a body, lossily decoded.
pub(crate) fn snippet(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    let mut out: String = text.chars().take(SNIPPET_CHARS).collect();
    if text.chars().count() > SNIPPET_CHARS {
        out.push_str("...");
    }
    out
}

fn reason_phrase(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("unknown status")
}
