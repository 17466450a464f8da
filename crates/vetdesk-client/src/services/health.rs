// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend health probe. Unauthenticated.

use vetdesk_core::types::HealthReport;
use vetdesk_core::VetdeskError;

use crate::ApiClient;

pub async fn check(client: &ApiClient) -> Result<HealthReport, VetdeskError> {
    client.get_public("health").await
}
