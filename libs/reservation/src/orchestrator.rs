//! Reservation workflow: submit, poll until terminal, compensate on failure.

use std::time::Duration;

use tracing::{debug, info, warn};
use turbo_api::{ReservationId, Transport, TurboClient};

use crate::error::{ReservationError, Result};
use crate::job::{PlacementResult, Progress, ReservationJob};
use crate::request::ReservationRequest;

/// Default overall budget for [`Orchestrator::await_completion`].
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(120);

/// Default pause between status reads.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Default pause before the first status read.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(5);

/// Poll loop timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Overall budget, covering every sleep and every status read.
    pub timeout: Duration,

    /// Pause after each pending status read.
    pub min_interval: Duration,

    /// Pause before the first status read.
    pub initial_delay: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_POLL_TIMEOUT,
            min_interval: DEFAULT_POLL_INTERVAL,
            initial_delay: DEFAULT_INITIAL_DELAY,
        }
    }
}

/// Outcome of a best-effort delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compensation {
    Deleted,
    /// The service no longer knows the job.
    AlreadyGone,
    /// The delete failed; the job may still hold capacity.
    Failed(String),
}

impl Compensation {
    /// Returns true if the job is known to be gone.
    pub fn is_clean(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Drives reservation jobs against the API.
///
/// One orchestrator can run any number of workflows concurrently; each
/// workflow is strictly sequential.
#[derive(Debug, Clone)]
pub struct Orchestrator<T> {
    client: TurboClient<T>,
    poll: PollConfig,
}

impl<T: Transport> Orchestrator<T> {
    pub fn new(transport: T) -> Self {
        Self::with_poll_config(transport, PollConfig::default())
    }

    pub fn with_poll_config(transport: T, poll: PollConfig) -> Self {
        Self {
            client: TurboClient::new(transport),
            poll,
        }
    }

    pub fn client(&self) -> &TurboClient<T> {
        &self.client
    }

    pub fn poll_config(&self) -> &PollConfig {
        &self.poll
    }

    /// Create the reservation job. No cleanup is attempted on failure.
    pub async fn submit(&self, request: &ReservationRequest) -> Result<ReservationJob> {
        let response = self
            .client
            .create_reservation(request.as_wire(), request.is_blocking())
            .await?;
        let job = ReservationJob::from_response(&response)?;

        info!(
            reservation_id = %job.id(),
            status = %job.status(),
            demand_name = %request.demand_name(),
            blocking = request.is_blocking(),
            "Reservation submitted"
        );
        Ok(job)
    }

    /// Poll the job until it reaches a terminal status or the budget runs out.
    ///
    /// Does not compensate; a timed-out job is left for the caller.
    pub async fn await_completion(&self, id: &ReservationId) -> Result<PlacementResult> {
        let budget = self.poll.timeout;
        match tokio::time::timeout(budget, self.poll_until_terminal(id)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    reservation_id = %id,
                    budget_secs = budget.as_secs_f64(),
                    "Reservation still pending at poll timeout"
                );
                Err(ReservationError::Timeout {
                    id: id.clone(),
                    budget,
                })
            }
        }
    }

    async fn poll_until_terminal(&self, id: &ReservationId) -> Result<PlacementResult> {
        let mut job = ReservationJob::pending(id.clone());
        tokio::time::sleep(self.poll.initial_delay).await;

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let response = self.client.read_reservation(id).await?;
            debug!(
                reservation_id = %id,
                status = %response.status,
                attempt,
                "Polled reservation"
            );

            match job.observe(response)? {
                Progress::Succeeded(result) => {
                    info!(
                        reservation_id = %id,
                        status = %result.status,
                        compute_provider = %result.compute_provider,
                        storage_provider = %result.storage_provider,
                        "Reservation placed"
                    );
                    return Ok(result);
                }
                Progress::Pending => tokio::time::sleep(self.poll.min_interval).await,
            }
        }
    }

    /// Delete the job, best effort. Never fails; a remote "not found" counts
    /// as already gone.
    pub async fn compensate(&self, id: &ReservationId) -> Compensation {
        match self.client.delete_reservation(id).await {
            Ok(()) => {
                info!(reservation_id = %id, "Reservation deleted");
                Compensation::Deleted
            }
            Err(err) if err.is_not_found() => {
                debug!(reservation_id = %id, "Reservation already gone");
                Compensation::AlreadyGone
            }
            Err(err) => {
                warn!(reservation_id = %id, error = %err, "Failed to delete reservation");
                Compensation::Failed(err.to_string())
            }
        }
    }

    /// Submit, wait for the outcome, and delete the job if it did not succeed.
    ///
    /// The error from the wait is returned even when the delete fails.
    pub async fn reserve(&self, request: &ReservationRequest) -> Result<PlacementResult> {
        let job = self.submit(request).await?;

        match self.await_completion(job.id()).await {
            Ok(result) => Ok(result),
            Err(err) => {
                warn!(reservation_id = %job.id(), error = %err, "Reservation did not complete");
                let compensation = self.compensate(job.id()).await;
                debug!(
                    reservation_id = %job.id(),
                    clean = compensation.is_clean(),
                    ?compensation,
                    "Compensation finished"
                );
                Err(err)
            }
        }
    }

    /// Remove a reservation if it exists.
    ///
    /// Returns false when the service does not know the id.
    pub async fn destroy(&self, id: &ReservationId) -> Result<bool> {
        match self.client.read_reservation(id).await {
            Ok(_) => {}
            Err(err) if err.is_not_found() => {
                debug!(reservation_id = %id, "Reservation not found, nothing to delete");
                return Ok(false);
            }
            Err(err) => return Err(err.into()),
        }

        self.client.delete_reservation(id).await?;
        info!(reservation_id = %id, "Reservation destroyed");
        Ok(true)
    }
}
