use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classified failure of a non-200 HTTP response.
///
/// The variant is chosen from the status code alone; the message is built from
/// the response body (structured `error`/`error_description` when available,
/// raw text otherwise).
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HttpError {
    /// Client-side errors (400, 401, 403, 404, 408, 413, 414, 429).
    #[error("bad request ({code}): {message}")]
    BadRequest {
        /// HTTP status code.
        code: u16,
        /// Human-readable message including the status label.
        message: String,
    },

    /// Server-side errors (500, 503, 509).
    #[error("server error ({code}): {message}")]
    ServerError {
        /// HTTP status code.
        code: u16,
        /// Human-readable message including the status label.
        message: String,
    },

    /// Any status code outside the documented table.
    #[error("unexpected status ({code}): {body}")]
    Unexpected {
        /// HTTP status code.
        code: u16,
        /// Raw response body.
        body: String,
    },
}

impl HttpError {
    /// Status code carried by every variant.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::BadRequest { code, .. }
            | Self::ServerError { code, .. }
            | Self::Unexpected { code, .. } => *code,
        }
    }
}

/// Unified error type for the tempo workspace.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TempoError {
    /// The client-credentials exchange was rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Transport-level failure (connect, TLS, timeout, reset).
    #[error("network error: {0}")]
    Network(String),

    /// A non-200 response classified by status code.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Malformed or schema-violating JSON.
    #[error("parse error: {0}")]
    Parse(String),

    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TempoError {
    /// Helper: build an `Auth` error.
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Helper: build a `Network` error.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Helper: build a `Parse` error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Helper: build an `InvalidConfig` error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// HTTP status code, when this error came from a classified response.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http(e) => Some(e.code()),
            _ => None,
        }
    }

    /// Returns true if the remote rejected the bearer token (HTTP 401).
    #[must_use]
    pub const fn is_token_expiry(&self) -> bool {
        matches!(self, Self::Http(HttpError::BadRequest { code: 401, .. }))
    }

    /// Stable key a configuration form can display for this failure.
    #[must_use]
    pub const fn reason_key(&self) -> &'static str {
        match self {
            Self::Auth(_) => "oauth_error",
            Self::Network(_) => "network_error",
            Self::Http(HttpError::BadRequest { .. }) => "http_client_error",
            Self::Http(HttpError::ServerError { .. }) => "http_server_error",
            Self::Http(HttpError::Unexpected { .. }) => "http_unexpected_error",
            Self::Parse(_) => "parse_error",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }
}

impl From<serde_json::Error> for TempoError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}
