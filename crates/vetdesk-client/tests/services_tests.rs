// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request shapes for the per-resource service functions: method, path,
//! JSON body, and decoding of the backend's replies.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::json;
use vetdesk_client::services::{
    billing, chat, inventory, lab_tests, notifications, reports, shifts, soap, vaccines,
};
use vetdesk_client::{ApiClient, LoginRedirect, MemoryTokenStore};
use vetdesk_core::types::{
    NewVaccination, QuickLinkRequest, ShiftInput, ShiftStatus, SoapNote,
};
use vetdesk_core::{AppointmentId, EntityId};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(
        server.uri(),
        Duration::from_secs(5),
        Arc::new(MemoryTokenStore::with_tokens("access-1", Some("refresh-1"))),
        Arc::new(LoginRedirect::default()),
    )
    .unwrap()
}

fn shift_json(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "doctorId": 3,
        "startTime": "2026-10-16T08:00:00Z",
        "endTime": "2026-10-16T16:00:00Z",
        "status": "scheduled"
    })
}

fn shift_input() -> ShiftInput {
    ShiftInput {
        doctor_id: 3,
        start_time: Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap(),
        end_time: Utc.with_ymd_and_hms(2026, 10, 16, 16, 0, 0).unwrap(),
        status: None,
    }
}

#[tokio::test]
async fn shifts_cover_list_create_update_delete() {
    let server = MockServer::start().await;
    let expected_body = json!({
        "doctorId": 3,
        "startTime": "2026-10-16T08:00:00Z",
        "endTime": "2026-10-16T16:00:00Z"
    });
    Mock::given(method("GET"))
        .and(path("/doctor/shifts"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([shift_json(1)])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/doctor/shifts"))
        .and(body_json(&expected_body))
        .respond_with(ResponseTemplate::new(201).set_body_json(shift_json(2)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/doctor/shifts/2"))
        .and(body_json(&expected_body))
        .respond_with(ResponseTemplate::new(200).set_body_json(shift_json(2)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/doctor/shifts/2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let listed = shifts::list(&client).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, ShiftStatus::Scheduled);

    let created = shifts::create(&client, &shift_input()).await.unwrap();
    assert_eq!(created.id, 2);
    let updated = shifts::update(&client, 2, &shift_input()).await.unwrap();
    assert_eq!(updated.doctor_id, 3);
    shifts::delete(&client, 2).await.unwrap();
}

#[tokio::test]
async fn soap_note_is_read_created_and_updated_under_the_appointment() {
    let server = MockServer::start().await;
    let note = SoapNote {
        subjective: "Limping on left foreleg".into(),
        objective: "Mild swelling".into(),
        assessment: "Sprain".into(),
        plan: "Rest, recheck in 7 days".into(),
    };
    let note_json = serde_json::to_value(&note).unwrap();
    Mock::given(method("GET"))
        .and(path("/appointment/42/soap"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"subjective": "Limping on left foreleg"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/appointment/42/soap"))
        .and(body_json(&note_json))
        .respond_with(ResponseTemplate::new(201).set_body_json(&note_json))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/appointment/42/soap"))
        .and(body_json(&note_json))
        .respond_with(ResponseTemplate::new(200).set_body_json(&note_json))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let fetched = soap::get(&client, AppointmentId(42)).await.unwrap();
    assert_eq!(fetched.subjective, "Limping on left foreleg");
    assert!(fetched.plan.is_empty());

    assert_eq!(soap::create(&client, AppointmentId(42), &note).await.unwrap(), note);
    assert_eq!(soap::update(&client, AppointmentId(42), &note).await.unwrap(), note);
}

#[tokio::test]
async fn vaccination_is_posted_to_create_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/vaccination/create"))
        .and(body_json(json!({
            "petId": 7,
            "vaccineName": "Rabies",
            "administeredAt": "2026-10-16T09:00:00Z",
            "nextDue": "2027-10-16"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 31,
            "petId": 7,
            "vaccineName": "Rabies",
            "administeredAt": "2026-10-16T09:00:00Z",
            "nextDue": "2027-10-16"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = NewVaccination {
        pet_id: 7,
        vaccine_name: "Rabies".into(),
        administered_at: Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap(),
        next_due: NaiveDate::from_ymd_opt(2027, 10, 16),
    };
    let created = vaccines::create(&client(&server), &request).await.unwrap();
    assert_eq!(created.id, 31);
    assert_eq!(created.next_due, NaiveDate::from_ymd_opt(2027, 10, 16));
}

#[tokio::test]
async fn billing_quick_link_and_weekly_revenue() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payment/quick-link"))
        .and(body_json(json!({"amount": 85.5, "description": "Consultation", "appointmentId": 42})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"url": "https://pay.example/abc"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/payment/revenue/last-seven-days"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"date": "2026-10-15", "total": 1200.0},
            {"date": "2026-10-16", "total": 640.25}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let link = billing::quick_link(
        &client,
        &QuickLinkRequest {
            amount: 85.5,
            description: "Consultation".into(),
            appointment_id: Some(AppointmentId(42)),
        },
    )
    .await
    .unwrap();
    assert_eq!(link.url, "https://pay.example/abc");
    assert!(link.expires_at.is_none());

    let revenue = billing::revenue_last_seven_days(&client).await.unwrap();
    assert_eq!(revenue.len(), 2);
    assert_eq!(revenue[1].date, NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
}

#[tokio::test]
async fn reports_are_fetched_as_raw_json() {
    let server = MockServer::start().await;
    for (report, body) in [
        ("financial", json!({"revenue": 10400})),
        ("medical", json!({"visits": 212})),
        ("doctors", json!([{"doctorId": 3, "appointments": 48}])),
    ] {
        Mock::given(method("GET"))
            .and(path(format!("/reports/{report}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = client(&server);
    assert_eq!(reports::financial(&client).await.unwrap()["revenue"], 10400);
    assert_eq!(reports::medical(&client).await.unwrap()["visits"], 212);
    assert_eq!(reports::doctors(&client).await.unwrap()[0]["appointments"], 48);
}

#[tokio::test]
async fn medicine_alerts_split_low_stock_and_expiring() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/medicine/alerts/lowstock"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"medicineId": 4, "name": "Amoxicillin", "quantity": 3}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/medicine/alerts/expiring"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"medicineId": 9, "name": "Meloxicam", "expiryDate": "2026-11-01"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let low = inventory::low_stock(&client).await.unwrap();
    assert_eq!(low[0].quantity, Some(3));
    let expiring = inventory::expiring(&client).await.unwrap();
    assert_eq!(expiring[0].expiry_date, NaiveDate::from_ymd_opt(2026, 11, 1));
}

#[tokio::test]
async fn notifications_list_mark_read_and_dismiss() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 12, "title": "Lab", "message": "Results ready", "createdAt": "2026-10-16T09:30:00Z"}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/notification/12/read"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/notifications/read-all"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/notification/12"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let listed = notifications::list(&client).await.unwrap();
    assert_eq!(listed[0].id, "12");
    notifications::mark_read(&client, &listed[0].id).await.unwrap();
    notifications::mark_all_read(&client).await.unwrap();
    notifications::dismiss(&client, &listed[0].id).await.unwrap();
}

#[tokio::test]
async fn string_ids_are_escaped_as_single_path_segments() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/notification/a%2Fb%3Fc"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/chat/front%20desk%231/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/test/lab%2F7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "lab/7", "petId": 7, "testType": "CBC", "status": "completed"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    notifications::dismiss(&client, "a/b?c").await.unwrap();
    assert!(chat::history(&client, "front desk#1").await.unwrap().is_empty());
    let test = lab_tests::get(&client, &EntityId::Text("lab/7".into()))
        .await
        .unwrap();
    assert_eq!(test.test_type, "CBC");
}
