// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Doctor shift scheduling. Overlap checks are left to the backend.

use vetdesk_core::types::ShiftInput;
use vetdesk_core::{Shift, VetdeskError};

use crate::ApiClient;

pub async fn list(client: &ApiClient) -> Result<Vec<Shift>, VetdeskError> {
    client.get("doctor/shifts").await
}

pub async fn create(client: &ApiClient, shift: &ShiftInput) -> Result<Shift, VetdeskError> {
    client.post("doctor/shifts", shift).await
}

pub async fn update(
    client: &ApiClient,
    shift_id: i64,
    shift: &ShiftInput,
) -> Result<Shift, VetdeskError> {
    client.put(&format!("doctor/shifts/{shift_id}"), shift).await
}

pub async fn delete(client: &ApiClient, shift_id: i64) -> Result<(), VetdeskError> {
    client.delete(&format!("doctor/shifts/{shift_id}")).await
}
