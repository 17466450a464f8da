// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Appointment booking, walk-ins, status transitions, and the waiting queue.

use chrono::NaiveDate;
use serde::Serialize;
use vetdesk_core::types::{NewAppointment, WalkInRegistration};
use vetdesk_core::{Appointment, AppointmentId, AppointmentStatus, VetdeskError};

use crate::ApiClient;

/// Body of a status transition request.
#[derive(Debug, Serialize)]
struct StatusUpdate {
    status: AppointmentStatus,
}

/// Lists appointments, optionally restricted to one day.
pub async fn list(
    client: &ApiClient,
    date: Option<NaiveDate>,
) -> Result<Vec<Appointment>, VetdeskError> {
    match date {
        Some(date) => {
            client
                .get_with_query("appointments", &[("date", date.to_string())])
                .await
        }
        None => client.get("appointments").await,
    }
}

pub async fn get(client: &ApiClient, id: AppointmentId) -> Result<Appointment, VetdeskError> {
    client.get(&format!("appointment/{id}")).await
}

pub async fn create(
    client: &ApiClient,
    appointment: &NewAppointment,
) -> Result<Appointment, VetdeskError> {
    client.post("appointment", appointment).await
}

/// Registers a walk-in patient. The backend creates the appointment already checked in.
pub async fn register_walk_in(
    client: &ApiClient,
    registration: &WalkInRegistration,
) -> Result<Appointment, VetdeskError> {
    client.post("appointment/walk-in", registration).await
}

/// Requests a status transition: `PATCH appointment/{id} {"status": "<target>"}`.
///
/// Legality is decided by the backend; no check happens here.
pub async fn update_status(
    client: &ApiClient,
    id: AppointmentId,
    status: AppointmentStatus,
) -> Result<serde_json::Value, VetdeskError> {
    client
        .patch(&format!("appointment/{id}"), &StatusUpdate { status })
        .await
}

/// Today's waiting-room queue as the backend sees it.
pub async fn queue(client: &ApiClient) -> Result<Vec<Appointment>, VetdeskError> {
    client.get("appointments/queue").await
}
