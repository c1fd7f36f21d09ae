//! Error types for API communication.

use thiserror::Error;

/// Errors raised by a [`Transport`](crate::Transport) while exchanging a request.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The remote object does not exist (HTTP 404).
    #[error("not found: {path}")]
    NotFound { path: String },

    /// The session is missing or was rejected (HTTP 401/403).
    #[error("unauthorized ({status}) for {path}")]
    Unauthorized { status: u16, path: String },

    /// Any other non-success HTTP status.
    #[error("unexpected status {status} for {path}: {body}")]
    Status {
        status: u16,
        path: String,
        body: String,
    },

    /// Connection, TLS or protocol failure.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl TransportError {
    /// Returns true if the remote reported the object as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// A response body could not be decoded into the expected shape.
#[derive(Debug, Error)]
#[error("failed to decode {what}: {source}")]
pub struct DecodeError {
    /// What was being decoded (e.g. "reservation").
    pub what: &'static str,
    #[source]
    pub source: serde_json::Error,
}

impl DecodeError {
    pub fn new(what: &'static str, source: serde_json::Error) -> Self {
        Self { what, source }
    }
}

/// Errors returned by [`TurboClient`](crate::TurboClient) operations.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The request body could not be serialized.
    #[error("failed to encode {what}: {source}")]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A lookup by name matched nothing.
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    /// A lookup by name matched more than one object.
    #[error("found {count} {kind} objects matching '{name}'")]
    Ambiguous {
        kind: &'static str,
        name: String,
        count: usize,
    },
}

impl ApiError {
    pub(crate) fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Returns true if the transport or a name lookup reported the object as missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(err) => err.is_not_found(),
            Self::NotFound { .. } => true,
            _ => false,
        }
    }
}

/// Result alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
