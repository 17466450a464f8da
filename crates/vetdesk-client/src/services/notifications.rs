// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stored notifications and their read flags.

use serde_json::Value;
use vetdesk_core::{Notification, VetdeskError};

use crate::http::segment;
use crate::ApiClient;

pub async fn list(client: &ApiClient) -> Result<Vec<Notification>, VetdeskError> {
    client.get("notifications").await
}

pub async fn mark_read(client: &ApiClient, notification_id: &str) -> Result<(), VetdeskError> {
    let _: Value = client
        .patch(
            &format!("notification/{}/read", segment(notification_id)),
            &serde_json::json!({}),
        )
        .await?;
    Ok(())
}

pub async fn mark_all_read(client: &ApiClient) -> Result<(), VetdeskError> {
    let _: Value = client
        .patch("notifications/read-all", &serde_json::json!({}))
        .await?;
    Ok(())
}

pub async fn dismiss(client: &ApiClient, notification_id: &str) -> Result<(), VetdeskError> {
    client
        .delete(&format!("notification/{}", segment(notification_id)))
        .await
}
