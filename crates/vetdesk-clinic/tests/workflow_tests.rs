// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Status workflow and query bindings against a mock clinic backend.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use vetdesk_client::{ApiClient, LoginRedirect, MemoryTokenStore};
use vetdesk_clinic::{column_for, Board, ClinicQueries, ColumnKey, QuickAction, StatusWorkflow};
use vetdesk_core::{Appointment, AppointmentId, AppointmentStatus};
use vetdesk_query::{keys, QueryClient, QueryOptions};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api(server: &MockServer) -> ApiClient {
    ApiClient::new(
        server.uri(),
        Duration::from_secs(5),
        Arc::new(MemoryTokenStore::with_tokens("access-1", None)),
        Arc::new(LoginRedirect::default()),
    )
    .unwrap()
}

fn appointment_json(id: i64, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "petId": 7,
        "doctorId": 3,
        "scheduledAt": "2026-10-16T09:00:00Z",
        "status": status,
        "type": "Check-up",
        "petName": "Biscuit"
    })
}

fn appointment(id: i64, status: &str) -> Appointment {
    serde_json::from_value(appointment_json(id, status)).unwrap()
}

#[tokio::test]
async fn check_in_moves_appointment_between_columns() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/appointment/42"))
        .and(body_json(json!({"status": "Checked In"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(appointment_json(42, "Checked In")))
        .expect(1)
        .mount(&server)
        .await;

    let cache = QueryClient::default();
    let workflow = StatusWorkflow::new(api(&server), cache.clone());
    let mut record = appointment(42, "Scheduled");

    let before = Board::build(vec![record.clone()]);
    assert_eq!(before.locate(AppointmentId(42)), Some(ColumnKey::Scheduled));

    workflow.apply(&mut record, QuickAction::CheckIn).await.unwrap();

    assert_eq!(record.id, AppointmentId(42));
    assert_eq!(record.status, AppointmentStatus::CheckedIn);
    assert_eq!(column_for(record.status), ColumnKey::CheckedIn);
    let after = Board::build(vec![record]);
    assert_eq!(after.locate(AppointmentId(42)), Some(ColumnKey::CheckedIn));
    assert!(after.column(ColumnKey::Scheduled).is_empty());
}

#[tokio::test]
async fn success_keeps_optimistic_cache_and_invalidates_lists() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/appointment/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let cache = QueryClient::default();
    let today = keys::appointments_on(None);
    cache.set_query_data(today.clone(), vec![appointment(41, "Waiting"), appointment(42, "Scheduled")]);

    let workflow = StatusWorkflow::new(api(&server), cache.clone());
    let mut record = appointment(42, "Scheduled");
    workflow.transition(&mut record, AppointmentStatus::Confirmed).await.unwrap();

    let cached = cache.get_query_data::<Vec<Appointment>>(&today).unwrap();
    assert_eq!(cached[1].status, AppointmentStatus::Confirmed);
    assert_eq!(cached[0].status, AppointmentStatus::Waiting);
    assert!(!cache.is_fresh(&today, &QueryOptions::default()));
}

#[tokio::test]
async fn failure_restores_record_and_cached_lists() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/appointment/42"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "Invalid transition",
            "details": "appointment 42 is already completed"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cache = QueryClient::default();
    let today = keys::appointments_on(None);
    cache.set_query_data(today.clone(), vec![appointment(42, "Scheduled")]);
    cache.set_query_data(keys::appointment(42), appointment(42, "Scheduled"));

    let workflow = StatusWorkflow::new(api(&server), cache.clone());
    let mut record = appointment(42, "Scheduled");
    let err = workflow
        .apply(&mut record, QuickAction::CheckIn)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(409));
    assert_eq!(record, appointment(42, "Scheduled"));
    assert!(record.waiting_since.is_none());

    let cached = cache.get_query_data::<Vec<Appointment>>(&today).unwrap();
    assert_eq!(cached[0].status, AppointmentStatus::Scheduled);
    assert!(cached[0].waiting_since.is_none());
    let detail = cache.get_query_data::<Appointment>(&keys::appointment(42)).unwrap();
    assert_eq!(detail.status, AppointmentStatus::Scheduled);
    assert!(cache.is_fresh(&today, &QueryOptions::default()), "failed mutations invalidate nothing");
}

#[tokio::test]
async fn concurrent_board_reads_issue_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/appointments"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": [appointment_json(1, "Waiting")]}))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let queries = ClinicQueries::new(api(&server), QueryClient::default());
    let mut board_view = queries.appointments(None);
    let mut sidebar_view = queries.appointments(None);

    let (a, b) = tokio::join!(board_view.load(), sidebar_view.load());
    assert_eq!(a.unwrap().len(), 1);
    assert_eq!(b.unwrap().len(), 1);

    // Inside the 30 s window the cached list is served.
    assert_eq!(board_view.load().await.unwrap()[0].id, AppointmentId(1));
}

#[tokio::test]
async fn queue_is_refetched_on_every_read() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/appointments/queue"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([appointment_json(1, "Waiting")])))
        .expect(2)
        .mount(&server)
        .await;

    let queries = ClinicQueries::new(api(&server), QueryClient::default());
    let mut queue = queries.queue();
    queue.load().await.unwrap();
    queue.load().await.unwrap();
}

#[tokio::test]
async fn walk_in_registration_invalidates_queue() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/appointment/walk-in"))
        .respond_with(ResponseTemplate::new(201).set_body_json(appointment_json(50, "Checked In")))
        .expect(1)
        .mount(&server)
        .await;

    let cache = QueryClient::default();
    cache.set_query_data(keys::queue(), Vec::<Appointment>::new());
    let queries = ClinicQueries::new(api(&server), cache.clone());

    let registration = serde_json::from_value(json!({"petId": 7, "priority": "high"})).unwrap();
    let created = queries.register_walk_in(&registration).await.unwrap();

    assert_eq!(created.status, AppointmentStatus::CheckedIn);
    assert!(!cache.is_fresh(&keys::queue(), &QueryOptions::default()));
}
