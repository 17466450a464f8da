// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Medicine stock alerts.

use vetdesk_core::types::MedicineAlert;
use vetdesk_core::VetdeskError;

use crate::ApiClient;

pub async fn low_stock(client: &ApiClient) -> Result<Vec<MedicineAlert>, VetdeskError> {
    client.get("medicine/alerts/lowstock").await
}

pub async fn expiring(client: &ApiClient) -> Result<Vec<MedicineAlert>, VetdeskError> {
    client.get("medicine/alerts/expiring").await
}
