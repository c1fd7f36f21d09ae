//! Reservation workflow errors.

use std::time::Duration;

use thiserror::Error;
use turbo_api::{ApiError, DecodeError, ReservationId, TransportError};

/// Errors returned by the reservation workflow.
#[derive(Debug, Error)]
pub enum ReservationError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The request body could not be serialized.
    #[error("failed to encode reservation request: {0}")]
    Encode(#[source] serde_json::Error),

    /// A response decoded but is missing data the workflow relies on.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The market could not place the demand.
    #[error("placement failed for reservation {id}")]
    PlacementFailed { id: ReservationId },

    /// The service reported a status this client does not recognize.
    #[error("reservation {id} reported unknown status '{status}'")]
    UnknownStatus { id: ReservationId, status: String },

    /// The job was still pending when the poll budget ran out.
    #[error("timeout after {budget:?} waiting for reservation {id}")]
    Timeout { id: ReservationId, budget: Duration },
}

impl ReservationError {
    /// Returns true if running the workflow again could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Transport(_))
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }
}

impl From<ApiError> for ReservationError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Transport(err) => Self::Transport(err),
            ApiError::Decode(err) => Self::Decode(err),
            ApiError::Encode { source, .. } => Self::Encode(source),
            other @ (ApiError::NotFound { .. } | ApiError::Ambiguous { .. }) => {
                Self::MalformedResponse(other.to_string())
            }
        }
    }
}

/// A reservation request failed validation before anything was sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("demand name must not be empty")]
    EmptyDemandName,

    #[error("reservation request has no placement parameters")]
    NoPlacements,

    #[error("placement {index} has no template id")]
    MissingTemplate { index: usize },

    #[error("placement {index} has a count of zero")]
    ZeroCount { index: usize },
}

/// Result alias for reservation workflow operations.
pub type Result<T> = std::result::Result<T, ReservationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        let timeout = ReservationError::Timeout {
            id: ReservationId::new("r-1"),
            budget: Duration::from_secs(120),
        };
        let transport = ReservationError::Transport(TransportError::Status {
            status: 503,
            path: "reservations/r-1".to_string(),
            body: String::new(),
        });
        let failed = ReservationError::PlacementFailed {
            id: ReservationId::new("r-1"),
        };

        assert!(timeout.is_retryable());
        assert!(transport.is_retryable());
        assert!(!failed.is_retryable());
        assert!(!ReservationError::malformed("no demand entities").is_retryable());
    }

    #[test]
    fn test_lookup_errors_become_malformed() {
        let err = ReservationError::from(ApiError::NotFound {
            kind: "template",
            name: "small".to_string(),
        });
        assert!(matches!(err, ReservationError::MalformedResponse(ref msg) if msg.contains("small")));
    }
}
