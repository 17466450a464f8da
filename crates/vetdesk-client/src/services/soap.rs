// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SOAP notes attached to an appointment.

use vetdesk_core::types::SoapNote;
use vetdesk_core::{AppointmentId, VetdeskError};

use crate::ApiClient;

pub async fn get(client: &ApiClient, appointment: AppointmentId) -> Result<SoapNote, VetdeskError> {
    client.get(&format!("appointment/{appointment}/soap")).await
}

pub async fn create(
    client: &ApiClient,
    appointment: AppointmentId,
    note: &SoapNote,
) -> Result<SoapNote, VetdeskError> {
    client
        .post(&format!("appointment/{appointment}/soap"), note)
        .await
}

pub async fn update(
    client: &ApiClient,
    appointment: AppointmentId,
    note: &SoapNote,
) -> Result<SoapNote, VetdeskError> {
    client
        .put(&format!("appointment/{appointment}/soap"), note)
        .await
}
