//! End-to-end orchestrator tests against a wiremock booking API.

use std::sync::Arc;

use citawatch_api::{ApiError, Orchestrator};
use citawatch_core::ApiConfig;
use citawatch_notify::RecordingNotifier;
use tokio::sync::watch;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: &str, health_centre_ids: Vec<i64>, specialty_ids: Vec<i64>) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        username: "user".to_string(),
        password: "secret".to_string(),
        health_centre_ids,
        specialty_ids,
        agreement_id: 90_002,
        format_id: 1,
        max_concurrent_jobs: 5,
        job_timeout_secs: 300,
        request_timeout_secs: 30,
    }
}

async fn mount_login_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "tok-123",
            "customer_id": "c-9",
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn slot_json(doctor: &str) -> serde_json::Value {
    serde_json::json!([{
        "availability_id": "a-1",
        "date_time": "2026/08/07 09:00",
        "format_name": "Presencial",
        "doctor_full_name": doctor,
        "location_name": "Centro Norte",
        "consultation_name": "Consulta 3",
    }])
}

#[tokio::test]
async fn every_job_key_is_queried_exactly_once_and_notified() {
    let server = MockServer::start().await;
    mount_login_ok(&server).await;

    Mock::given(method("GET"))
        .and(path("/me/appointment-availabilities"))
        .and(query_param("health_centre_id", "1"))
        .and(query_param("specialty_id", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/me/appointment-availabilities"))
        .and(query_param("health_centre_id", "2"))
        .and(query_param("specialty_id", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(slot_json("Doe, Jane")))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = Arc::new(RecordingNotifier::new());
    let orchestrator = Orchestrator::new(
        test_config(&server.uri(), vec![1, 2], vec![10]),
        notifier.clone(),
    )
    .expect("orchestrator construction should not fail");

    let (_cancel_tx, cancel_rx) = watch::channel(false);
    orchestrator
        .run(cancel_rx)
        .await
        .expect("sweep should succeed");

    let messages = notifier.messages();
    assert_eq!(messages.len(), 2, "one notification per job: {messages:?}");

    let empty = messages
        .iter()
        .find(|m| m.contains("No appointment available"))
        .expect("one job had no slots");
    assert!(empty.contains("specialty ID: 10"));

    let found = messages
        .iter()
        .find(|m| m.contains("Appointment available"))
        .expect("one job had a slot");
    assert!(found.contains("specialty ID: 10"));
    assert!(
        found.contains(">> 2026/08/07 09:00 Presencial Doe, Jane Centro Norte Consulta 3"),
        "slot line missing: {found}"
    );
}

#[tokio::test]
async fn login_failure_schedules_zero_jobs() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/me/appointment-availabilities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let notifier = Arc::new(RecordingNotifier::new());
    let orchestrator = Orchestrator::new(
        test_config(&server.uri(), vec![1, 2], vec![10, 20]),
        notifier.clone(),
    )
    .expect("orchestrator construction should not fail");

    let (_cancel_tx, cancel_rx) = watch::channel(false);
    let err = orchestrator
        .run(cancel_rx)
        .await
        .expect_err("sweep should report the login failure");

    assert!(
        matches!(err, ApiError::Auth { status: 401, .. }),
        "expected Auth error, got: {err:?}"
    );
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn one_failing_job_does_not_stop_its_siblings() {
    let server = MockServer::start().await;
    mount_login_ok(&server).await;

    Mock::given(method("GET"))
        .and(path("/me/appointment-availabilities"))
        .and(query_param("health_centre_id", "1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/me/appointment-availabilities"))
        .and(query_param("health_centre_id", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(slot_json("Doe, Jane")))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = Arc::new(RecordingNotifier::new());
    let orchestrator = Orchestrator::new(
        test_config(&server.uri(), vec![1, 2], vec![10]),
        notifier.clone(),
    )
    .expect("orchestrator construction should not fail");

    let (_cancel_tx, cancel_rx) = watch::channel(false);
    let err = orchestrator
        .run(cancel_rx)
        .await
        .expect_err("the failed job surfaces for visibility");
    assert!(
        matches!(err, ApiError::UpstreamStatus { status: 500 }),
        "expected UpstreamStatus(500), got: {err:?}"
    );

    // The sibling job still completed and notified.
    let messages = notifier.messages();
    assert_eq!(messages.len(), 1, "only the surviving job notifies: {messages:?}");
    assert!(messages[0].contains("Appointment available"));
}

#[tokio::test]
async fn cancelled_run_issues_no_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "tok-123",
            "customer_id": "c-9",
        })))
        .expect(0)
        .mount(&server)
        .await;

    let notifier = Arc::new(RecordingNotifier::new());
    let orchestrator = Orchestrator::new(
        test_config(&server.uri(), vec![1], vec![10]),
        notifier.clone(),
    )
    .expect("orchestrator construction should not fail");

    let (cancel_tx, cancel_rx) = watch::channel(false);
    cancel_tx.send(true).expect("receiver is alive");

    orchestrator
        .run(cancel_rx)
        .await
        .expect("a cancelled run is not an error");
    assert!(notifier.messages().is_empty());
}
