//! Placement reservation workflow.
//!
//! A reservation is a remote job: it is created, the market works on it for
//! a while, and it ends in a placement or a failure. This crate drives that
//! job to an outcome:
//!
//! - **Submit**: one create call, returning the job id.
//! - **Await completion**: sequential status reads under an overall timeout.
//! - **Compensate**: best-effort delete of a job that did not succeed.
//!
//! # Invariants
//!
//! - At most one request is in flight per workflow
//! - Any status not known to this crate is treated as a failure
//! - A failed cleanup never replaces the error that triggered it

mod error;
mod job;
mod orchestrator;
mod request;
mod status;

pub use error::{RequestError, ReservationError, Result};
pub use job::{PlacementResult, Progress, ReservationJob};
pub use orchestrator::{
    Compensation, Orchestrator, PollConfig, DEFAULT_INITIAL_DELAY, DEFAULT_POLL_INTERVAL,
    DEFAULT_POLL_TIMEOUT,
};
pub use request::{ReservationRequest, ReservationRequestBuilder};
pub use status::{JobStatus, StatusClass};
