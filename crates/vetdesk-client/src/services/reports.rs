// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Management reports. Payloads are passed through as JSON for the view to chart.

use serde_json::Value;
use vetdesk_core::VetdeskError;

use crate::ApiClient;

pub async fn financial(client: &ApiClient) -> Result<Value, VetdeskError> {
    client.get("reports/financial").await
}

pub async fn medical(client: &ApiClient) -> Result<Value, VetdeskError> {
    client.get("reports/medical").await
}

pub async fn doctors(client: &ApiClient) -> Result<Value, VetdeskError> {
    client.get("reports/doctors").await
}
