// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vetdesk notifications` and `vetdesk chat` command implementations.
//!
//! With `--follow`, notifications are first synced from the REST list and
//! then kept current from the real-time socket until Ctrl+C.

use std::collections::HashSet;
use std::sync::Arc;

use colored::Colorize;
use tracing::info;
use vetdesk_bus::EventBus;
use vetdesk_clinic::ErrorBoundary;
use vetdesk_core::types::NewChatMessage;
use vetdesk_core::{ChatMessage, Notification, VetdeskError};
use vetdesk_realtime::{ChatLog, EventHandler, NotificationCenter, NotificationDispatcher, SocketClient};

use crate::error::CliError;
use crate::session::{load_view, Session};
use crate::shutdown;

/// Run the `vetdesk notifications` command.
pub async fn run_notifications(session: &Session, follow: bool, use_color: bool) -> Result<(), CliError> {
    let center = NotificationCenter::from_config(&session.config.notifications);
    let boundary = ErrorBoundary::new("notifications");
    let fetched = load_view(&boundary, &mut session.queries.notifications()).await?;
    center.sync(fetched);

    let listed = center.list();
    if listed.is_empty() {
        println!("No notifications.");
    }
    for notification in listed.iter().rev() {
        println!("{}", notification_line(notification, use_color));
    }
    println!("{} unread", center.unread_count());

    if !follow {
        return Ok(());
    }
    let realtime = &session.config.realtime;
    if !realtime.enabled {
        return Err(CliError::Usage(
            "real-time updates are disabled ([realtime] enabled = false)".to_string(),
        ));
    }

    let bus = Arc::new(EventBus::new());
    let handler = EventHandler::new(center.clone(), ChatLog::new(), session.queries.cache().clone());
    let _dispatcher = NotificationDispatcher::attach(&bus, handler)?;

    let cancel = shutdown::install_signal_handler();
    let mut socket = SocketClient::from_config(realtime, session.client.tokens().clone(), bus.clone())
        .spawn(cancel.clone());
    info!(url = %realtime.url, "following notifications");

    let mut shown: HashSet<String> = listed.into_iter().map(|n| n.id).collect();
    let mut changes = center.subscribe_changes();

    let joined = loop {
        tokio::select! {
            joined = &mut socket => break joined,
            changed = changes.changed() => {
                if changed.is_err() {
                    cancel.cancel();
                    continue;
                }
                for notification in unseen(&center, &mut shown) {
                    println!("{}", notification_line(&notification, use_color));
                }
                println!("{} unread", center.unread_count());
            }
        }
    };

    bus.shutdown();
    joined.map_err(|e| VetdeskError::Internal(format!("socket task failed: {e}")))??;
    Ok(())
}

/// Held notifications not yet in `shown`, oldest first. Marks them shown.
fn unseen(center: &NotificationCenter, shown: &mut HashSet<String>) -> Vec<Notification> {
    center
        .list()
        .into_iter()
        .rev()
        .filter(|n| shown.insert(n.id.clone()))
        .collect()
}

fn notification_line(notification: &Notification, use_color: bool) -> String {
    let stamp = notification.created_at.format("%Y-%m-%d %H:%M");
    let body = format!("{}: {}", notification.title, notification.message);
    match (notification.read, use_color) {
        (false, true) => format!("{} {stamp}  {}", "●".cyan(), body.bold()),
        (false, false) => format!("* {stamp}  {body}"),
        (true, _) => format!("  {stamp}  {body}"),
    }
}

/// Run the `vetdesk chat` command.
pub async fn run_chat(session: &Session, conversation: &str, content: &str) -> Result<(), CliError> {
    let message = NewChatMessage {
        conversation_id: conversation.to_string(),
        content: content.to_string(),
        message_type: "text".to_string(),
    };
    session.queries.send_chat(&message).await?;

    let boundary = ErrorBoundary::new("chat");
    let history = load_view(&boundary, &mut session.queries.chat_history(conversation)).await?;
    let log = ChatLog::new();
    log.extend(history);

    for message in log.messages(conversation) {
        println!("{}", chat_line(&message));
    }
    Ok(())
}

fn chat_line(message: &ChatMessage) -> String {
    format!(
        "[{}] {}: {}",
        message.timestamp.format("%H:%M"),
        message.sender,
        message.content
    )
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn notification(read: bool) -> Notification {
        Notification {
            id: "n-1".to_string(),
            title: "Lab result".to_string(),
            message: "Bloodwork results are ready (test #15)".to_string(),
            read,
            appointment_id: None,
            entity_id: None,
            kind: "test_result".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn full_center_still_surfaces_new_arrivals() {
        let center = NotificationCenter::new(1);
        center.push(notification(false));
        let mut shown: HashSet<String> = center.list().into_iter().map(|n| n.id).collect();
        let mut changes = center.subscribe_changes();

        let mut arrival = notification(false);
        arrival.id = "n-2".to_string();
        center.push(arrival);

        changes.changed().await.unwrap();
        let fresh: Vec<_> = unseen(&center, &mut shown).into_iter().map(|n| n.id).collect();
        assert_eq!(fresh, ["n-2"]);
        assert!(unseen(&center, &mut shown).is_empty());
        assert_eq!(center.unread_count(), 1);
    }

    #[test]
    fn unread_notifications_are_marked_in_plain_output() {
        assert_eq!(
            notification_line(&notification(false), false),
            "* 2026-10-16 09:30  Lab result: Bloodwork results are ready (test #15)"
        );
        assert!(notification_line(&notification(true), false).starts_with("  2026-10-16"));
    }
}
