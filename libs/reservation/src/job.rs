//! Reservation job state machine.
//!
//! A job starts as [`JobStatus::Submitted`] and advances as status reads are
//! observed. Once it reaches a terminal status it no longer changes, and every
//! later observation reports the same outcome.

use serde::Serialize;
use turbo_api::{DemandEntity, ReservationId, ReservationResponse};

use crate::error::{ReservationError, Result};
use crate::status::{JobStatus, StatusClass};

/// What the market decided for a successful job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementResult {
    /// Terminal status string as reported (`PLACEMENT_SUCCEEDED` or `RESERVED`).
    pub status: String,
    /// Display name of the first entity's compute provider.
    pub compute_provider: String,
    /// Display name of the first entity's storage provider.
    pub storage_provider: String,
    /// All demand entities of the job, with their stats.
    pub entities: Vec<DemandEntity>,
}

impl PlacementResult {
    /// Build the result from a successful status read.
    pub fn from_response(response: ReservationResponse) -> Result<Self> {
        let first = response.demand_entities.first().ok_or_else(|| {
            ReservationError::malformed(format!(
                "reservation {} reported {} with no demand entities",
                response.uuid, response.status
            ))
        })?;

        let compute_provider = first
            .placements
            .compute_resources
            .first()
            .map(|resource| resource.provider.display_name.clone())
            .ok_or_else(|| {
                ReservationError::malformed(format!(
                    "demand entity {} has no compute placement",
                    first.display_name
                ))
            })?;

        let storage_provider = first
            .placements
            .storage_resources
            .first()
            .map(|resource| resource.provider.display_name.clone())
            .ok_or_else(|| {
                ReservationError::malformed(format!(
                    "demand entity {} has no storage placement",
                    first.display_name
                ))
            })?;

        Ok(Self {
            status: response.status,
            compute_provider,
            storage_provider,
            entities: response.demand_entities,
        })
    }
}

/// Where a job stands after an observation.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    Pending,
    Succeeded(PlacementResult),
}

/// A submitted reservation job.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationJob {
    id: ReservationId,
    status: JobStatus,
    outcome: Option<PlacementResult>,
}

impl ReservationJob {
    /// A job known only by id, not yet read.
    pub fn pending(id: ReservationId) -> Self {
        Self {
            id,
            status: JobStatus::Submitted,
            outcome: None,
        }
    }

    /// A job from the create call's response.
    ///
    /// A blocking create can already carry a terminal status; the job is then
    /// settled and the placement, if the response has one, is recorded.
    pub fn from_response(response: &ReservationResponse) -> Result<Self> {
        if response.uuid.is_empty() {
            return Err(ReservationError::malformed(
                "create response carries no reservation uuid",
            ));
        }

        let status = if response.status.is_empty() {
            JobStatus::Submitted
        } else {
            JobStatus::parse(&response.status)
        };

        let outcome = match status.class() {
            StatusClass::Succeeded => PlacementResult::from_response(response.clone()).ok(),
            _ => None,
        };

        Ok(Self {
            id: ReservationId::new(response.uuid.clone()),
            status,
            outcome,
        })
    }

    pub fn id(&self) -> &ReservationId {
        &self.id
    }

    pub fn status(&self) -> &JobStatus {
        &self.status
    }

    /// The placement, once the job has succeeded.
    pub fn outcome(&self) -> Option<&PlacementResult> {
        self.outcome.as_ref()
    }

    /// Apply a status read.
    ///
    /// Pending statuses keep the job open. A success status records the
    /// placement; failed and unknown statuses are returned as errors. Once the
    /// job is terminal, reads are ignored and the settled outcome is returned
    /// again.
    pub fn observe(&mut self, response: ReservationResponse) -> Result<Progress> {
        if self.status.is_terminal() {
            return self.settled();
        }

        self.status = JobStatus::parse(&response.status);

        match self.status.class() {
            StatusClass::Pending => Ok(Progress::Pending),
            StatusClass::Succeeded => {
                let result = PlacementResult::from_response(response)?;
                self.outcome = Some(result.clone());
                Ok(Progress::Succeeded(result))
            }
            StatusClass::Failed | StatusClass::Unknown => self.settled(),
        }
    }

    /// Outcome implied by the current status.
    fn settled(&self) -> Result<Progress> {
        match self.status.class() {
            StatusClass::Pending => Ok(Progress::Pending),
            StatusClass::Succeeded => self.outcome.clone().map(Progress::Succeeded).ok_or_else(|| {
                ReservationError::malformed(format!(
                    "reservation {} reported {} without a usable placement",
                    self.id, self.status
                ))
            }),
            StatusClass::Failed => Err(ReservationError::PlacementFailed {
                id: self.id.clone(),
            }),
            StatusClass::Unknown => Err(ReservationError::UnknownStatus {
                id: self.id.clone(),
                status: self.status.as_str().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use turbo_api::decode;

    fn response(value: serde_json::Value) -> ReservationResponse {
        decode("reservation", value.to_string().as_bytes()).unwrap()
    }

    fn placed(status: &str) -> ReservationResponse {
        response(json!({
            "uuid": "r-1",
            "status": status,
            "demandEntities": [{
                "displayName": "web-01",
                "placements": {
                    "computeResources": [{ "provider": { "uuid": "pm-1", "displayName": "host-1" } }],
                    "storageResources": [{
                        "provider": { "uuid": "st-1", "displayName": "lun-1" },
                        "stats": [{ "name": "diskIops", "value": "Infinity" }]
                    }]
                }
            }]
        }))
    }

    #[test]
    fn test_from_create_response() {
        let job = ReservationJob::from_response(&response(json!({ "uuid": "r-1" }))).unwrap();
        assert_eq!(job.id().as_str(), "r-1");
        assert_eq!(job.status(), &JobStatus::Submitted);

        let job = ReservationJob::from_response(&response(
            json!({ "uuid": "r-2", "status": "LOADING" }),
        ))
        .unwrap();
        assert_eq!(job.status(), &JobStatus::Loading);
    }

    #[test]
    fn test_create_response_without_uuid_is_malformed() {
        let err = ReservationJob::from_response(&response(json!({ "status": "LOADING" })))
            .unwrap_err();
        assert!(matches!(err, ReservationError::MalformedResponse(_)));
    }

    #[test]
    fn test_observe_pending_then_succeeded() {
        let mut job = ReservationJob::pending(ReservationId::new("r-1"));

        let progress = job
            .observe(response(json!({ "uuid": "r-1", "status": "IN_PROGRESS" })))
            .unwrap();
        assert_eq!(progress, Progress::Pending);
        assert_eq!(job.status(), &JobStatus::InProgress);

        let Progress::Succeeded(result) = job.observe(placed("RESERVED")).unwrap() else {
            panic!("expected success");
        };
        assert_eq!(result.status, "RESERVED");
        assert_eq!(result.compute_provider, "host-1");
        assert_eq!(result.storage_provider, "lun-1");
        assert!(result.entities[0].placements.storage_resources[0].stats[0]
            .value
            .is_unbounded());
    }

    #[test]
    fn test_terminal_job_ignores_later_reads() {
        let mut job = ReservationJob::pending(ReservationId::new("r-1"));
        job.observe(placed("PLACEMENT_SUCCEEDED")).unwrap();

        let again = job
            .observe(response(json!({ "uuid": "r-1", "status": "PLACEMENT_FAILED" })))
            .unwrap();
        assert!(matches!(again, Progress::Succeeded(_)));
        assert_eq!(job.status(), &JobStatus::PlacementSucceeded);
        assert_eq!(job.outcome().map(|o| o.compute_provider.as_str()), Some("host-1"));
    }

    #[test]
    fn test_failed_job_stays_failed() {
        let mut job = ReservationJob::pending(ReservationId::new("r-1"));
        job.observe(response(json!({ "uuid": "r-1", "status": "PLACEMENT_FAILED" })))
            .unwrap_err();

        let err = job
            .observe(response(json!({ "uuid": "r-1", "status": "IN_PROGRESS" })))
            .unwrap_err();
        assert!(matches!(err, ReservationError::PlacementFailed { .. }));
        assert_eq!(job.status(), &JobStatus::PlacementFailed);

        let err = job.observe(placed("RESERVED")).unwrap_err();
        assert!(matches!(err, ReservationError::PlacementFailed { .. }));
        assert!(job.outcome().is_none());
    }

    #[test]
    fn test_unknown_job_stays_unknown() {
        let mut job = ReservationJob::pending(ReservationId::new("r-1"));
        job.observe(response(json!({ "status": "BOGUS" }))).unwrap_err();

        let err = job
            .observe(response(json!({ "status": "LOADING" })))
            .unwrap_err();
        assert!(
            matches!(err, ReservationError::UnknownStatus { ref status, .. } if status == "BOGUS")
        );
        assert!(job.status().is_terminal());
    }

    #[test]
    fn test_terminal_create_response_is_settled() {
        let mut job = ReservationJob::from_response(&placed("RESERVED")).unwrap();
        assert_eq!(job.status(), &JobStatus::Reserved);
        assert_eq!(job.outcome().map(|o| o.storage_provider.as_str()), Some("lun-1"));

        let progress = job
            .observe(response(json!({ "uuid": "r-1", "status": "LOADING" })))
            .unwrap();
        assert!(matches!(progress, Progress::Succeeded(ref result) if result.status == "RESERVED"));
        assert_eq!(job.status(), &JobStatus::Reserved);

        let mut job = ReservationJob::from_response(&response(
            json!({ "uuid": "r-2", "status": "RESERVED" }),
        ))
        .unwrap();
        let err = job
            .observe(response(json!({ "uuid": "r-2", "status": "LOADING" })))
            .unwrap_err();
        assert!(matches!(err, ReservationError::MalformedResponse(_)));
        assert_eq!(job.status(), &JobStatus::Reserved);
    }

    #[test]
    fn test_failed_and_unknown_statuses() {
        let mut job = ReservationJob::pending(ReservationId::new("r-1"));
        let err = job
            .observe(response(json!({ "status": "PLACEMENT_FAILED" })))
            .unwrap_err();
        assert!(matches!(err, ReservationError::PlacementFailed { ref id } if id.as_str() == "r-1"));

        let mut job = ReservationJob::pending(ReservationId::new("r-2"));
        let err = job
            .observe(response(json!({ "status": "BOGUS" })))
            .unwrap_err();
        assert!(
            matches!(err, ReservationError::UnknownStatus { ref status, .. } if status == "BOGUS")
        );
    }

    #[test]
    fn test_success_without_entities_is_malformed() {
        let mut job = ReservationJob::pending(ReservationId::new("r-1"));
        let err = job
            .observe(response(json!({ "uuid": "r-1", "status": "RESERVED", "demandEntities": [] })))
            .unwrap_err();
        assert!(matches!(err, ReservationError::MalformedResponse(_)));
        assert!(job.outcome().is_none());
    }

    #[test]
    fn test_success_without_storage_is_malformed() {
        let mut job = ReservationJob::pending(ReservationId::new("r-1"));
        let err = job
            .observe(response(json!({
                "status": "PLACEMENT_SUCCEEDED",
                "demandEntities": [{
                    "displayName": "web-01",
                    "placements": {
                        "computeResources": [{ "provider": { "displayName": "host-1" } }],
                        "storageResources": null
                    }
                }]
            })))
            .unwrap_err();
        assert!(matches!(err, ReservationError::MalformedResponse(ref msg) if msg.contains("storage")));
    }
}
