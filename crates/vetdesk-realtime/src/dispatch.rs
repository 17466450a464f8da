// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns socket events into notifications, chat entries and cache invalidations.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};
use vetdesk_bus::{BusError, EventBus, GenericNotice, RealtimeEvent, Subscription, TestResultReady, KNOWN_EVENTS};
use vetdesk_core::Notification;
use vetdesk_query::{keys, QueryClient};

use crate::center::NotificationCenter;
use crate::chat::ChatLog;

/// Kind recorded on notifications about finished lab tests.
pub const TEST_RESULT_KIND: &str = "test_result";

/// State a socket event may touch.
#[derive(Clone)]
pub struct EventHandler {
    center: NotificationCenter,
    chat: ChatLog,
    cache: QueryClient,
}

impl EventHandler {
    pub fn new(center: NotificationCenter, chat: ChatLog, cache: QueryClient) -> Self {
        Self { center, chat, cache }
    }

    /// Normalizes and applies one raw event. Unrecognized or malformed
    /// payloads are logged and dropped; the normalized event is returned
    /// otherwise.
    pub fn handle(&self, event: &str, payload: &Value) -> Option<RealtimeEvent> {
        let normalized = match RealtimeEvent::normalize(event, payload) {
            Ok(normalized) => normalized,
            Err(e) => {
                warn!(event, error = %e, "dropping real-time payload");
                return None;
            }
        };
        debug!(event, kind = normalized.kind(), "handling real-time event");
        self.apply(&normalized);
        Some(normalized)
    }

    fn apply(&self, event: &RealtimeEvent) {
        match event {
            RealtimeEvent::TestResultReady(ready) => {
                self.center.push(test_result_notification(ready));
                self.cache.invalidate(&keys::test(&ready.test_id));
                if let Some(pet_id) = &ready.pet_id {
                    self.cache.invalidate(&keys::tests_for_pet(pet_id));
                }
                self.cache.invalidate(&keys::notifications());
            }
            RealtimeEvent::Notification(notice) => {
                self.center.push(generic_notification(notice));
                self.cache.invalidate(&keys::notifications());
                if let Some(appointment_id) = notice.appointment_id {
                    self.cache.invalidate(&keys::appointment(appointment_id));
                }
            }
            RealtimeEvent::ChatMessage(message) => {
                let conversation = message.conversation_id.clone();
                if self.chat.append(message.clone()).is_some() {
                    self.cache.invalidate(&keys::chat(&conversation));
                }
            }
            RealtimeEvent::AppointmentUpdated(update) => {
                info!(id = %update.id, status = ?update.status, "appointment changed on server");
                self.cache.invalidate(&keys::appointments());
                self.cache.invalidate(&keys::appointment(update.id));
                self.cache.invalidate(&keys::queue());
            }
        }
    }

    pub fn center(&self) -> &NotificationCenter {
        &self.center
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }
}

fn test_result_notification(ready: &TestResultReady) -> Notification {
    let message = match (&ready.message, &ready.title) {
        (Some(message), _) => format!("{message} (test #{})", ready.test_id),
        (None, Some(title)) => format!("{title} results are ready (test #{})", ready.test_id),
        (None, None) => format!("Results for test #{} are ready", ready.test_id),
    };
    Notification {
        id: ready
            .notification_id
            .clone()
            .unwrap_or_else(|| format!("test-{}-{}", ready.test_id, uuid::Uuid::new_v4())),
        title: "Test result ready".to_string(),
        message,
        read: false,
        appointment_id: None,
        entity_id: Some(ready.test_id.clone()),
        kind: TEST_RESULT_KIND.to_string(),
        created_at: Utc::now(),
    }
}

fn generic_notification(notice: &GenericNotice) -> Notification {
    Notification {
        id: notice
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        title: notice.title.clone(),
        message: notice.message.clone(),
        read: false,
        appointment_id: notice.appointment_id,
        entity_id: notice.entity_id.clone(),
        kind: notice.kind.clone(),
        created_at: Utc::now(),
    }
}

/// Keeps an [`EventHandler`] registered on the bus for every known event.
///
/// Dropping the dispatcher deregisters it.
pub struct NotificationDispatcher {
    handler: EventHandler,
    _subscriptions: Vec<Subscription>,
}

impl NotificationDispatcher {
    pub fn attach(bus: &Arc<EventBus>, handler: EventHandler) -> Result<Self, BusError> {
        let subscriptions = KNOWN_EVENTS
            .iter()
            .map(|event| {
                let handler = handler.clone();
                let name = *event;
                bus.subscribe(event, move |payload| {
                    handler.handle(name, payload);
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(events = subscriptions.len(), "notification dispatcher attached");
        Ok(Self {
            handler,
            _subscriptions: subscriptions,
        })
    }

    pub fn handler(&self) -> &EventHandler {
        &self.handler
    }
}
