//! Integration tests for `AvailabilityClient` using wiremock HTTP mocks.

use citawatch_api::{ApiError, AvailabilityClient, JobKey};
use citawatch_core::ApiConfig;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        username: "user".to_string(),
        password: "secret".to_string(),
        health_centre_ids: vec![15],
        specialty_ids: vec![10],
        agreement_id: 90_002,
        format_id: 1,
        max_concurrent_jobs: 5,
        job_timeout_secs: 300,
        request_timeout_secs: 30,
    }
}

fn test_client(base_url: &str) -> AvailabilityClient {
    AvailabilityClient::new(&test_config(base_url)).expect("client construction should not fail")
}

fn slot_json(date_time: &str, doctor: &str) -> serde_json::Value {
    serde_json::json!({
        "availability_id": "a-1",
        "date_time": date_time,
        "format_name": "Presencial",
        "doctor_full_name": doctor,
        "location_name": "Centro Norte",
        "consultation_name": "Consulta 3",
    })
}

#[tokio::test]
async fn login_posts_credentials_and_returns_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({
            "username": "user",
            "password": "secret",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "tok-123",
            "customer_id": "c-9",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let token = client.login().await.expect("login should succeed");
    assert_eq!(token, "tok-123");
}

#[tokio::test]
async fn login_rejection_carries_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.login().await.expect_err("login should fail");
    match err {
        ApiError::Auth { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "bad credentials");
        }
        other => panic!("expected Auth error, got: {other:?}"),
    }
}

#[tokio::test]
async fn login_malformed_body_is_a_protocol_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.login().await.expect_err("login should fail");
    assert!(
        matches!(err, ApiError::Deserialize { .. }),
        "expected Deserialize error, got: {err:?}"
    );
}

#[tokio::test]
async fn availability_sends_bearer_and_locale_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me/appointment-availabilities"))
        .and(header("authorization", "Bearer tok-123"))
        .and(header("language", "es"))
        .and(query_param("format_ids", "1"))
        .and(query_param("specialty_id", "10"))
        .and(query_param("initial_date", "2026/08/06"))
        .and(query_param("initial_time", "07:00"))
        .and(query_param("end_time", "21:00"))
        .and(query_param("agreement_id", "90002"))
        .and(query_param("health_centre_id", "15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let job = JobKey {
        health_centre_id: 15,
        specialty_id: 10,
    };
    let slots = client
        .availability("tok-123", job, "2026/08/06")
        .await
        .expect("query should succeed");
    assert!(slots.is_empty());
}

#[tokio::test]
async fn availability_preserves_server_slot_order() {
    let server = MockServer::start().await;

    let body = serde_json::json!([
        slot_json("2026/08/07 10:30", "Smith, John"),
        slot_json("2026/08/07 09:00", "Doe, Jane"),
    ]);

    Mock::given(method("GET"))
        .and(path("/me/appointment-availabilities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let job = JobKey {
        health_centre_id: 15,
        specialty_id: 10,
    };
    let slots = client
        .availability("tok-123", job, "2026/08/06")
        .await
        .expect("query should succeed");

    // The server's order is meaningful; the client must not re-sort.
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].doctor_name, "Smith, John");
    assert_eq!(slots[1].doctor_name, "Doe, Jane");
}

#[tokio::test]
async fn availability_non_200_is_an_upstream_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me/appointment-availabilities"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let job = JobKey {
        health_centre_id: 15,
        specialty_id: 10,
    };
    let err = client
        .availability("tok-123", job, "2026/08/06")
        .await
        .expect_err("query should fail");
    assert!(
        matches!(err, ApiError::UpstreamStatus { status: 503 }),
        "expected UpstreamStatus(503), got: {err:?}"
    );
}

#[tokio::test]
async fn availability_malformed_body_is_a_protocol_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me/appointment-availabilities"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"not\": \"an array\"}"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let job = JobKey {
        health_centre_id: 15,
        specialty_id: 10,
    };
    let err = client
        .availability("tok-123", job, "2026/08/06")
        .await
        .expect_err("query should fail");
    assert!(
        matches!(err, ApiError::Deserialize { .. }),
        "expected Deserialize error, got: {err:?}"
    );
}
