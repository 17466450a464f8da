// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for bearer authentication and the one-shot token refresh.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use vetdesk_client::services::{appointments, health};
use vetdesk_client::{ApiClient, MemoryTokenStore};
use vetdesk_core::{
    AppointmentId, AppointmentStatus, Navigator, TokenStore, VetdeskError, ACCESS_TOKEN_KEY,
    REFRESH_TOKEN_KEY,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct RecordingNavigator {
    redirects: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    fn count(&self) -> usize {
        self.redirects.lock().unwrap().len()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect_to_login(&self, reason: &str) {
        self.redirects.lock().unwrap().push(reason.to_string());
    }
}

struct Fixture {
    client: ApiClient,
    tokens: Arc<MemoryTokenStore>,
    navigator: Arc<RecordingNavigator>,
}

fn fixture(server: &MockServer, access: Option<&str>, refresh: Option<&str>) -> Fixture {
    let tokens = Arc::new(match access {
        Some(access) => MemoryTokenStore::with_tokens(access, refresh),
        None => MemoryTokenStore::new(),
    });
    let navigator = Arc::new(RecordingNavigator::default());
    let client = ApiClient::new(
        server.uri(),
        Duration::from_secs(5),
        tokens.clone(),
        navigator.clone(),
    )
    .unwrap();
    Fixture {
        client,
        tokens,
        navigator,
    }
}

fn pet_json() -> serde_json::Value {
    json!({"id": 7, "name": "Biscuit", "species": "dog"})
}

#[tokio::test]
async fn attaches_stored_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pet/7"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pet_json()))
        .expect(1)
        .mount(&server)
        .await;

    let fx = fixture(&server, Some("access-1"), Some("refresh-1"));
    let pet = vetdesk_client::services::patients::get(&fx.client, 7)
        .await
        .unwrap();
    assert_eq!(pet.name, "Biscuit");
}

#[tokio::test]
async fn missing_token_fails_before_any_request() {
    let server = MockServer::start().await;
    let fx = fixture(&server, None, None);

    let err = vetdesk_client::services::patients::get(&fx.client, 7)
        .await
        .unwrap_err();
    assert!(matches!(err, VetdeskError::MissingCredential(_)), "got: {err:?}");

    let received = server.received_requests().await.unwrap();
    assert!(received.is_empty(), "no request may be sent without a token");
}

#[tokio::test]
async fn unauthorized_triggers_one_refresh_and_one_replay() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pet/7"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "jwt expired"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({"refreshToken": "refresh-1"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"accessToken": "fresh", "refreshToken": "refresh-2"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pet/7"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pet_json()))
        .expect(1)
        .mount(&server)
        .await;

    let fx = fixture(&server, Some("stale"), Some("refresh-1"));
    let pet = vetdesk_client::services::patients::get(&fx.client, 7)
        .await
        .unwrap();

    assert_eq!(pet.id, 7);
    assert_eq!(fx.tokens.get(ACCESS_TOKEN_KEY).as_deref(), Some("fresh"));
    assert_eq!(fx.tokens.get(REFRESH_TOKEN_KEY).as_deref(), Some("refresh-2"));
    assert_eq!(fx.navigator.count(), 0);
}

#[tokio::test]
async fn concurrent_unauthorized_requests_share_one_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pet/7"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"accessToken": "fresh"}))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pet/7"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pet_json()))
        .expect(2)
        .mount(&server)
        .await;

    let fx = fixture(&server, Some("stale"), Some("refresh-1"));
    let (a, b) = tokio::join!(
        vetdesk_client::services::patients::get(&fx.client, 7),
        vetdesk_client::services::patients::get(&fx.client, 7),
    );

    assert_eq!(a.unwrap().id, 7);
    assert_eq!(b.unwrap().id, 7);
    assert_eq!(fx.tokens.get(REFRESH_TOKEN_KEY).as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn second_unauthorized_after_refresh_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pet/7"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "revoked"})))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "fresh"})))
        .expect(1)
        .mount(&server)
        .await;

    let fx = fixture(&server, Some("stale"), Some("refresh-1"));
    let err = vetdesk_client::services::patients::get(&fx.client, 7)
        .await
        .unwrap_err();

    assert!(matches!(err, VetdeskError::Unauthorized(ref m) if m == "revoked"), "got: {err:?}");
    // The refresh itself succeeded, so the session is kept.
    assert_eq!(fx.tokens.get(ACCESS_TOKEN_KEY).as_deref(), Some("fresh"));
    assert_eq!(fx.tokens.get(REFRESH_TOKEN_KEY).as_deref(), Some("refresh-1"));
    assert_eq!(fx.navigator.count(), 0);
}

#[tokio::test]
async fn failed_refresh_clears_credentials_and_redirects() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pets"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "refresh token revoked"})))
        .expect(1)
        .mount(&server)
        .await;

    let fx = fixture(&server, Some("stale"), Some("refresh-1"));
    let err = vetdesk_client::services::patients::list(&fx.client)
        .await
        .unwrap_err();

    assert!(matches!(err, VetdeskError::SessionExpired(_)), "got: {err:?}");
    assert!(fx.tokens.get(ACCESS_TOKEN_KEY).is_none());
    assert!(fx.tokens.get(REFRESH_TOKEN_KEY).is_none());
    assert_eq!(fx.navigator.count(), 1);
}

#[tokio::test]
async fn missing_refresh_token_forces_logout_without_refresh_call() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pets"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "x"})))
        .expect(0)
        .mount(&server)
        .await;

    let fx = fixture(&server, Some("stale"), None);
    let err = vetdesk_client::services::patients::list(&fx.client)
        .await
        .unwrap_err();

    assert!(matches!(err, VetdeskError::SessionExpired(_)));
    assert_eq!(fx.navigator.count(), 1);
}

#[tokio::test]
async fn server_error_details_are_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/appointment/42"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "Invalid transition",
            "details": "appointment 42 is already completed"
        })))
        .mount(&server)
        .await;

    let fx = fixture(&server, Some("access-1"), None);
    let err = appointments::update_status(&fx.client, AppointmentId(42), AppointmentStatus::CheckedIn)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(409));
    assert_eq!(
        err.user_message(),
        "Invalid transition: appointment 42 is already completed"
    );
}

#[tokio::test]
async fn update_status_sends_patch_with_display_status() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/appointment/42"))
        .and(body_json(json!({"status": "Checked In"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42, "status": "Checked In"})))
        .expect(1)
        .mount(&server)
        .await;

    let fx = fixture(&server, Some("access-1"), None);
    appointments::update_status(&fx.client, AppointmentId(42), AppointmentStatus::CheckedIn)
        .await
        .unwrap();
}

#[tokio::test]
async fn login_stores_both_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/doctor/login"))
        .and(body_json(json!({"email": "vet@clinic.test", "password": "hunter2"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"accessToken": "a1", "refreshToken": "r1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fx = fixture(&server, None, None);
    assert!(!fx.client.is_authenticated());
    fx.client.login("vet@clinic.test", "hunter2").await.unwrap();

    assert!(fx.client.is_authenticated());
    assert_eq!(fx.tokens.get(REFRESH_TOKEN_KEY).as_deref(), Some("r1"));

    fx.client.logout().unwrap();
    assert!(!fx.client.is_authenticated());
}

#[tokio::test]
async fn health_check_is_public() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let fx = fixture(&server, None, None);
    let report = health::check(&fx.client).await.unwrap();
    assert_eq!(report.status, "ok");

    let received = server.received_requests().await.unwrap();
    assert!(received[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn list_by_date_sends_query_parameter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(wiremock::matchers::query_param("date", "2026-10-16"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let fx = fixture(&server, Some("access-1"), None);
    let date = chrono::NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
    let list = appointments::list(&fx.client, Some(date)).await.unwrap();
    assert!(list.is_empty());
}
