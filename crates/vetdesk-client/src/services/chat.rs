// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat messages.

use vetdesk_core::types::NewChatMessage;
use vetdesk_core::{ChatMessage, VetdeskError};

use crate::http::segment;
use crate::ApiClient;

pub async fn send(client: &ApiClient, message: &NewChatMessage) -> Result<ChatMessage, VetdeskError> {
    client.post("chat", message).await
}

pub async fn history(
    client: &ApiClient,
    conversation_id: &str,
) -> Result<Vec<ChatMessage>, VetdeskError> {
    client
        .get(&format!("chat/{}/messages", segment(conversation_id)))
        .await
}
