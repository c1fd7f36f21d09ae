//! Reservation workflow against a scripted transport.
//!
//! Every test runs on a paused tokio clock, so poll delays and the overall
//! timeout elapse instantly and deterministically.

use std::sync::Arc;
use std::time::Duration;

use rstest::rstest;
use tokio::time::Instant;
use turbo_api::{Method, ReservationAction, ReservationId};
use turbo_reservation::{
    Compensation, JobStatus, Orchestrator, PollConfig, ReservationError, ReservationRequest,
};
use turbo_testing::fixtures::{placed_reservation, reservation, reservation_with_entities};
use turbo_testing::{Reply, ScriptedTransport};

type Harness = (Orchestrator<Arc<ScriptedTransport>>, Arc<ScriptedTransport>);

fn scripted(transport: ScriptedTransport) -> Harness {
    let transport = Arc::new(transport);
    (Orchestrator::new(Arc::clone(&transport)), transport)
}

fn assert_elapsed(started: Instant, secs: u64) {
    let elapsed = started.elapsed();
    let expected = Duration::from_secs(secs);
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(10),
        "elapsed {elapsed:?}, expected {expected:?}"
    );
}

fn request() -> ReservationRequest {
    ReservationRequest::single_entity(ReservationAction::Placement, "web-01", "tmpl-1")
        .build()
        .unwrap()
}

fn id() -> ReservationId {
    ReservationId::new("r-1")
}

#[tokio::test(start_paused = true)]
async fn test_reserve_succeeds_after_pending_reads() {
    let (orchestrator, transport) = scripted(
        ScriptedTransport::new()
            .on_create(Reply::json(reservation("r-1", "")))
            .on_read(Reply::json(reservation("r-1", "LOADING")))
            .on_read(Reply::json(placed_reservation(
                "r-1",
                "PLACEMENT_SUCCEEDED",
                "host-1",
                "lun-1",
            ))),
    );

    let started = Instant::now();
    let result = orchestrator.reserve(&request()).await.unwrap();

    assert_eq!(result.status, "PLACEMENT_SUCCEEDED");
    assert_eq!(result.compute_provider, "host-1");
    assert_eq!(result.storage_provider, "lun-1");
    assert_eq!(transport.count(&Method::GET), 2);
    assert_eq!(transport.count(&Method::DELETE), 0);

    // initial delay + one interval
    assert_elapsed(started, 8);
}

#[tokio::test(start_paused = true)]
async fn test_submit_sends_body_and_blocking_flag() {
    let (orchestrator, transport) = scripted(
        ScriptedTransport::new().on_create(Reply::json(reservation("r-9", "IN_PROGRESS"))),
    );
    let request = ReservationRequest::single_entity(ReservationAction::Reservation, "db-01", "tmpl-2")
        .blocking(true)
        .build()
        .unwrap();

    let job = orchestrator.submit(&request).await.unwrap();
    assert_eq!(job.id().as_str(), "r-9");
    assert_eq!(job.status(), &JobStatus::InProgress);

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(requests[0].path, "reservations?apiCallBlock=true");

    let body = requests[0].json().unwrap();
    assert_eq!(body["action"], "RESERVATION");
    assert_eq!(body["demandName"], "db-01");
    assert_eq!(body["parameters"][0]["placementParameters"]["templateID"], "tmpl-2");
    assert_eq!(body["parameters"][0]["placementParameters"]["count"], 1);
}

#[rstest]
#[case("IN_PROGRESS")]
#[case("LOADING")]
#[case("RETRYING")]
#[case("FUTURE")]
#[case("UNFULFILLED")]
#[tokio::test(start_paused = true)]
async fn test_pending_status_keeps_polling(#[case] pending: &str) {
    let (orchestrator, transport) = scripted(
        ScriptedTransport::new()
            .on_read(Reply::json(reservation("r-1", pending)))
            .on_read(Reply::json(reservation("r-1", pending)))
            .on_read(Reply::json(placed_reservation("r-1", "RESERVED", "host-2", "lun-2"))),
    );

    let result = orchestrator.await_completion(&id()).await.unwrap();
    assert_eq!(result.status, "RESERVED");
    assert_eq!(transport.count(&Method::GET), 3);
}

#[tokio::test(start_paused = true)]
async fn test_placement_failed_compensates_once() {
    let (orchestrator, transport) = scripted(
        ScriptedTransport::new()
            .on_create(Reply::json(reservation("r-1", "")))
            .on_read(Reply::json(reservation("r-1", "LOADING")))
            .on_read(Reply::json(reservation("r-1", "PLACEMENT_FAILED")))
            .on_delete(Reply::Empty),
    );

    let err = orchestrator.reserve(&request()).await.unwrap_err();

    assert!(matches!(err, ReservationError::PlacementFailed { ref id } if id.as_str() == "r-1"));
    assert_eq!(transport.count(&Method::DELETE), 1);
    let delete = transport
        .requests()
        .into_iter()
        .find(|r| r.method == Method::DELETE)
        .unwrap();
    assert_eq!(delete.path, "reservations/r-1");
}

#[tokio::test(start_paused = true)]
async fn test_unknown_status_fails_closed() {
    let (orchestrator, transport) = scripted(
        ScriptedTransport::new()
            .on_create(Reply::json(reservation("r-1", "")))
            .on_read(Reply::json(reservation("r-1", "BOGUS")))
            .on_delete(Reply::Empty),
    );

    let err = orchestrator.reserve(&request()).await.unwrap_err();

    assert!(matches!(err, ReservationError::UnknownStatus { ref status, .. } if status == "BOGUS"));
    assert_eq!(transport.count(&Method::GET), 1);
    assert_eq!(transport.count(&Method::DELETE), 1);
}

#[tokio::test(start_paused = true)]
async fn test_success_without_demand_entities_is_malformed() {
    let (orchestrator, transport) = scripted(
        ScriptedTransport::new()
            .on_create(Reply::json(reservation("r-1", "")))
            .on_read(Reply::json(reservation_with_entities("r-1", "RESERVED", vec![])))
            .on_delete(Reply::Empty),
    );

    let err = orchestrator.reserve(&request()).await.unwrap_err();

    assert!(matches!(err, ReservationError::MalformedResponse(_)));
    assert_eq!(transport.count(&Method::DELETE), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stuck_job_times_out() {
    let (orchestrator, transport) = scripted(
        ScriptedTransport::new().on_read(Reply::json(reservation("r-1", "IN_PROGRESS"))),
    );

    let started = Instant::now();
    let err = orchestrator.await_completion(&id()).await.unwrap_err();

    assert!(matches!(
        err,
        ReservationError::Timeout { budget, .. } if budget == Duration::from_secs(120)
    ));
    assert!(err.is_retryable());
    assert_elapsed(started, 120);
    assert!(transport.count(&Method::GET) > 1);
    // await_completion never cleans up on its own
    assert_eq!(transport.count(&Method::DELETE), 0);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_survives_failed_compensation() {
    let (orchestrator, transport) = scripted(
        ScriptedTransport::new()
            .on_create(Reply::json(reservation("r-1", "")))
            .on_read(Reply::json(reservation("r-1", "IN_PROGRESS")))
            .on_delete(Reply::Status(500, "internal error".to_string())),
    );

    let err = orchestrator.reserve(&request()).await.unwrap_err();

    assert!(matches!(err, ReservationError::Timeout { ref id, .. } if id.as_str() == "r-1"));
    assert_eq!(transport.count(&Method::DELETE), 1);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_covers_slow_reads() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .with_latency(Duration::from_secs(50))
            .on_read(Reply::json(reservation("r-1", "IN_PROGRESS"))),
    );
    let orchestrator = Orchestrator::with_poll_config(
        Arc::clone(&transport),
        PollConfig {
            timeout: Duration::from_secs(120),
            ..PollConfig::default()
        },
    );

    let started = Instant::now();
    let err = orchestrator.await_completion(&id()).await.unwrap_err();

    assert!(matches!(err, ReservationError::Timeout { .. }));
    assert_elapsed(started, 120);
    // reads start at 5s, 58s and 111s; the third is cut off
    assert_eq!(transport.count(&Method::GET), 3);
}

#[tokio::test(start_paused = true)]
async fn test_custom_poll_config_timing() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .on_read(Reply::json(reservation("r-1", "LOADING")))
            .on_read(Reply::json(reservation("r-1", "LOADING")))
            .on_read(Reply::json(placed_reservation("r-1", "RESERVED", "host-1", "lun-1"))),
    );
    let orchestrator = Orchestrator::with_poll_config(
        Arc::clone(&transport),
        PollConfig {
            timeout: Duration::from_secs(30),
            min_interval: Duration::from_secs(1),
            initial_delay: Duration::ZERO,
        },
    );

    let started = Instant::now();
    orchestrator.await_completion(&id()).await.unwrap();
    assert_elapsed(started, 2);
}

#[tokio::test(start_paused = true)]
async fn test_poll_errors_surface_immediately() {
    let (orchestrator, transport) = scripted(
        ScriptedTransport::new()
            .on_read(Reply::json(reservation("r-1", "LOADING")))
            .on_read(Reply::Status(503, "unavailable".to_string())),
    );

    let err = orchestrator.await_completion(&id()).await.unwrap_err();
    assert!(matches!(err, ReservationError::Transport(_)));
    assert_eq!(transport.count(&Method::GET), 2);

    let (orchestrator, _) =
        orchestrator_with_reads(vec![Reply::raw("{\"status\": \"LOADING\"")]);
    let err = orchestrator.await_completion(&id()).await.unwrap_err();
    assert!(matches!(err, ReservationError::Decode(_)));
    assert!(!err.is_retryable());
}

fn orchestrator_with_reads(replies: Vec<Reply>) -> Harness {
    let transport = replies
        .into_iter()
        .fold(ScriptedTransport::new(), ScriptedTransport::on_read);
    scripted(transport)
}

#[tokio::test(start_paused = true)]
async fn test_submit_failure_skips_cleanup() {
    let (orchestrator, transport) = scripted(
        ScriptedTransport::new().on_create(Reply::Status(500, "boom".to_string())),
    );

    let err = orchestrator.reserve(&request()).await.unwrap_err();

    assert!(matches!(err, ReservationError::Transport(_)));
    assert_eq!(transport.count(&Method::GET), 0);
    assert_eq!(transport.count(&Method::DELETE), 0);
}

#[tokio::test(start_paused = true)]
async fn test_create_response_without_uuid_skips_cleanup() {
    let (orchestrator, transport) = scripted(
        ScriptedTransport::new().on_create(Reply::json(serde_json::json!({ "status": "LOADING" }))),
    );

    let err = orchestrator.reserve(&request()).await.unwrap_err();

    assert!(matches!(err, ReservationError::MalformedResponse(_)));
    assert_eq!(transport.count(&Method::DELETE), 0);
}

#[tokio::test(start_paused = true)]
async fn test_compensate_is_idempotent() {
    let (orchestrator, transport) = scripted(
        ScriptedTransport::new()
            .on_delete(Reply::Empty)
            .on_delete(Reply::NotFound),
    );

    assert_eq!(orchestrator.compensate(&id()).await, Compensation::Deleted);
    assert_eq!(orchestrator.compensate(&id()).await, Compensation::AlreadyGone);
    assert_eq!(
        orchestrator.compensate(&ReservationId::new("never-created")).await,
        Compensation::AlreadyGone
    );
    assert_eq!(transport.count(&Method::DELETE), 3);
}

#[tokio::test(start_paused = true)]
async fn test_compensate_reports_failure() {
    let (orchestrator, _) = scripted(
        ScriptedTransport::new().on_delete(Reply::Unauthorized),
    );

    let outcome = orchestrator.compensate(&id()).await;
    assert!(matches!(outcome, Compensation::Failed(ref reason) if reason.contains("401")));
}

#[tokio::test(start_paused = true)]
async fn test_destroy_deletes_existing_reservation() {
    let (orchestrator, transport) = scripted(
        ScriptedTransport::new()
            .on_read(Reply::json(reservation("r-1", "RESERVED")))
            .on_delete(Reply::Empty),
    );

    assert!(orchestrator.destroy(&id()).await.unwrap());
    assert_eq!(transport.count(&Method::DELETE), 1);
}

#[tokio::test(start_paused = true)]
async fn test_destroy_missing_reservation_is_noop() {
    let (orchestrator, transport) = scripted(ScriptedTransport::new());

    assert!(!orchestrator.destroy(&id()).await.unwrap());
    assert_eq!(transport.count(&Method::GET), 1);
    assert_eq!(transport.count(&Method::DELETE), 0);
}

#[tokio::test(start_paused = true)]
async fn test_null_stat_sub_fields_do_not_fail_a_placed_read() {
    let entity = serde_json::json!({
        "displayName": "web-01",
        "placements": {
            "computeResources": [{
                "provider": { "uuid": "pm-1", "displayName": "host-1" },
                "stats": [{ "name": "numOfCpu", "value": 2, "filters": null, "capacity": null }]
            }],
            "storageResources": [{
                "provider": { "uuid": "st-1", "displayName": "lun-1" },
                "stats": [{ "name": "diskSize", "value": "Infinity", "links": null, "relatedEntity": null }]
            }]
        }
    });
    let (orchestrator, transport) = scripted(
        ScriptedTransport::new()
            .on_create(Reply::json(reservation("r-1", "")))
            .on_read(Reply::json(reservation_with_entities(
                "r-1",
                "PLACEMENT_SUCCEEDED",
                vec![entity],
            ))),
    );

    let result = orchestrator.reserve(&request()).await.unwrap();

    assert_eq!(result.compute_provider, "host-1");
    assert_eq!(result.storage_provider, "lun-1");
    let storage_stat = &result.entities[0].placements.storage_resources[0].stats[0];
    assert!(storage_stat.value.is_unbounded());
    assert_eq!(transport.count(&Method::DELETE), 0);
}
