//! Reservation job status and its classification.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Coarse outcome of a status, used to drive the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    /// The market is still working on the job.
    Pending,

    /// The job produced a placement.
    Succeeded,

    /// The market could not place the workload.
    Failed,

    /// The status is not one we know; treated as a failure.
    Unknown,
}

impl StatusClass {
    /// Returns true if polling should stop.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Status of a reservation job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobStatus {
    /// Local initial state before the first status read. Never parsed from
    /// the wire.
    Submitted,
    InProgress,
    Loading,
    Retrying,
    Future,
    Unfulfilled,
    PlacementSucceeded,
    Reserved,
    PlacementFailed,
    /// Any status string not listed above, kept verbatim.
    Unknown(String),
}

impl JobStatus {
    /// Parse a wire status. Total: unrecognized strings become [`JobStatus::Unknown`].
    pub fn parse(raw: &str) -> Self {
        match raw {
            "IN_PROGRESS" => Self::InProgress,
            "LOADING" => Self::Loading,
            "RETRYING" => Self::Retrying,
            "FUTURE" => Self::Future,
            "UNFULFILLED" => Self::Unfulfilled,
            "PLACEMENT_SUCCEEDED" => Self::PlacementSucceeded,
            "RESERVED" => Self::Reserved,
            "PLACEMENT_FAILED" => Self::PlacementFailed,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Submitted => "SUBMITTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Loading => "LOADING",
            Self::Retrying => "RETRYING",
            Self::Future => "FUTURE",
            Self::Unfulfilled => "UNFULFILLED",
            Self::PlacementSucceeded => "PLACEMENT_SUCCEEDED",
            Self::Reserved => "RESERVED",
            Self::PlacementFailed => "PLACEMENT_FAILED",
            Self::Unknown(raw) => raw,
        }
    }

    pub fn class(&self) -> StatusClass {
        match self {
            Self::Submitted
            | Self::InProgress
            | Self::Loading
            | Self::Retrying
            | Self::Future
            | Self::Unfulfilled => StatusClass::Pending,
            Self::PlacementSucceeded | Self::Reserved => StatusClass::Succeeded,
            Self::PlacementFailed => StatusClass::Failed,
            Self::Unknown(_) => StatusClass::Unknown,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.class().is_terminal()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for JobStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
