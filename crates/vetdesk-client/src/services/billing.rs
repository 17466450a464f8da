// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Invoices, payment links, and revenue.

use vetdesk_core::types::{DailyRevenue, Invoice, QuickLinkRequest, QuickPaymentLink};
use vetdesk_core::VetdeskError;

use crate::ApiClient;

pub async fn invoices(client: &ApiClient) -> Result<Vec<Invoice>, VetdeskError> {
    client.get("invoices").await
}

pub async fn quick_link(
    client: &ApiClient,
    request: &QuickLinkRequest,
) -> Result<QuickPaymentLink, VetdeskError> {
    client.post("payment/quick-link", request).await
}

pub async fn revenue_last_seven_days(
    client: &ApiClient,
) -> Result<Vec<DailyRevenue>, VetdeskError> {
    client.get("payment/revenue/last-seven-days").await
}
