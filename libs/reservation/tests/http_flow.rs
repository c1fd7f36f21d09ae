//! End-to-end reservation flows over HTTP against a mock API server.

use std::time::Duration;

use serde_json::json;
use turbo_api::{Credentials, HttpTransport, ReservationAction, ReservationId};
use turbo_reservation::{Orchestrator, PollConfig, ReservationError, ReservationRequest};
use turbo_testing::fixtures::{placed_reservation, reservation};
use wiremock::matchers::{
    body_partial_json, body_string_contains, header, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_poll() -> PollConfig {
    PollConfig {
        timeout: Duration::from_secs(5),
        min_interval: Duration::from_millis(10),
        initial_delay: Duration::ZERO,
    }
}

fn orchestrator(server: &MockServer, poll: PollConfig) -> Orchestrator<HttpTransport> {
    let transport = HttpTransport::new(format!("{}/api/v3", server.uri()), false).unwrap();
    Orchestrator::with_poll_config(transport, poll)
}

#[tokio::test]
async fn test_reserve_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v3/reservations"))
        .and(query_param("apiCallBlock", "false"))
        .and(body_partial_json(json!({
            "action": "PLACEMENT",
            "demandName": "web-01",
            "parameters": [{ "placementParameters": { "templateID": "tmpl-1", "count": 1 } }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reservation("r-1", "LOADING")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v3/reservations/r-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reservation("r-1", "LOADING")))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v3/reservations/r-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(placed_reservation(
            "r-1",
            "PLACEMENT_SUCCEEDED",
            "host-1",
            "lun-1",
        )))
        .with_priority(2)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let request = ReservationRequest::single_entity(ReservationAction::Placement, "web-01", "tmpl-1")
        .build()
        .unwrap();
    let result = orchestrator(&server, fast_poll())
        .reserve(&request)
        .await
        .unwrap();

    assert_eq!(result.status, "PLACEMENT_SUCCEEDED");
    assert_eq!(result.compute_provider, "host-1");
    assert_eq!(result.storage_provider, "lun-1");

    let storage_stats = &result.entities[0].placements.storage_resources[0].stats;
    let iops = storage_stats.iter().find(|s| s.name == "diskIops").unwrap();
    assert!(iops.value.is_unbounded());
}

#[tokio::test]
async fn test_failed_placement_deletes_job_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v3/reservations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reservation("r-2", "")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v3/reservations/r-2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(reservation("r-2", "PLACEMENT_FAILED")),
        )
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/v3/reservations/r-2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let request = ReservationRequest::single_entity(ReservationAction::Placement, "web-02", "tmpl-1")
        .build()
        .unwrap();
    let err = orchestrator(&server, fast_poll())
        .reserve(&request)
        .await
        .unwrap_err();

    assert!(matches!(err, ReservationError::PlacementFailed { .. }));
}

#[tokio::test]
async fn test_timeout_with_missing_job_on_cleanup() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v3/reservations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reservation("r-3", "")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v3/reservations/r-3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reservation("r-3", "RETRYING")))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/v3/reservations/r-3"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let poll = PollConfig {
        timeout: Duration::from_millis(200),
        ..fast_poll()
    };
    let request = ReservationRequest::single_entity(ReservationAction::Reservation, "web-03", "tmpl-1")
        .build()
        .unwrap();
    let err = orchestrator(&server, poll).reserve(&request).await.unwrap_err();

    assert!(matches!(err, ReservationError::Timeout { .. }));
}

#[tokio::test]
async fn test_session_cookie_reused_after_login() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v3/login"))
        .and(body_string_contains("username=administrator"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "JSESSIONID=abc123; Path=/")
                .set_body_json(json!({ "username": "administrator" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v3/reservations/r-4"))
        .and(header("cookie", "JSESSIONID=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reservation("r-4", "RESERVED")))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/v3/reservations/r-4"))
        .and(header("cookie", "JSESSIONID=abc123"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(format!("{}/api/v3", server.uri()), false).unwrap();
    transport
        .login(&Credentials::new("administrator", "secret"))
        .await
        .unwrap();

    let orchestrator = Orchestrator::new(transport);
    assert!(orchestrator.destroy(&ReservationId::new("r-4")).await.unwrap());
}
