// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical real-time events.
//!
//! The backend names the same field several ways depending on which service
//! emitted the event (`entityId`, `testId` or `id`; `patientId` or `petId`;
//! numbers or strings). [`RealtimeEvent::normalize`] resolves all of that
//! once, at the boundary, so handlers only ever see one shape.

use serde_json::{Map, Value};
use vetdesk_core::{AppointmentId, AppointmentStatus, ChatMessage, EntityId};

pub const TEST_RESULT_READY: &str = "testResultReady";
pub const TEST_RESULT: &str = "test_result";
pub const TEST_RESULT_CAMEL: &str = "testResult";
pub const NOTIFICATION: &str = "notification";
pub const CHAT_MESSAGE: &str = "chatMessage";
pub const APPOINTMENT_UPDATED: &str = "appointmentUpdated";

/// Every socket event name the runtime listens for.
pub const KNOWN_EVENTS: &[&str] = &[
    TEST_RESULT_READY,
    TEST_RESULT,
    TEST_RESULT_CAMEL,
    NOTIFICATION,
    CHAT_MESSAGE,
    APPOINTMENT_UPDATED,
];

/// Why a payload could not be normalized. Such payloads are logged and dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("unrecognized event `{0}`")]
    UnknownEvent(String),

    #[error("`{event}` payload is not a JSON object")]
    NotAnObject { event: String },

    #[error("`{event}` payload has no `{field}`")]
    MissingField { event: String, field: &'static str },

    #[error("malformed `{event}` payload: {detail}")]
    Malformed { event: String, detail: String },
}

/// A lab test result became available.
#[derive(Debug, Clone, PartialEq)]
pub struct TestResultReady {
    pub test_id: EntityId,
    pub pet_id: Option<EntityId>,
    /// Test name or notification title, e.g. "Blood panel".
    pub title: Option<String>,
    pub message: Option<String>,
    /// Server id of the notification that carried the event, if any.
    pub notification_id: Option<String>,
}

/// A notification that is not about a specific known entity kind.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericNotice {
    pub id: Option<String>,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub entity_id: Option<EntityId>,
    pub appointment_id: Option<AppointmentId>,
}

/// An appointment changed on the server.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentUpdated {
    pub id: AppointmentId,
    pub status: Option<AppointmentStatus>,
}

/// A normalized socket event.
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeEvent {
    TestResultReady(TestResultReady),
    Notification(GenericNotice),
    ChatMessage(ChatMessage),
    AppointmentUpdated(AppointmentUpdated),
}

impl RealtimeEvent {
    /// Maps a raw `(event, payload)` pair onto its canonical form.
    pub fn normalize(event: &str, payload: &Value) -> Result<Self, NormalizeError> {
        match event {
            TEST_RESULT_READY | TEST_RESULT | TEST_RESULT_CAMEL => {
                test_result(event, object(event, payload)?).map(RealtimeEvent::TestResultReady)
            }
            NOTIFICATION => {
                let fields = object(event, payload)?;
                match text(fields, &["type", "kind"]).as_deref() {
                    Some(TEST_RESULT | TEST_RESULT_CAMEL) => {
                        test_result(event, fields).map(RealtimeEvent::TestResultReady)
                    }
                    kind => generic_notice(event, fields, kind).map(RealtimeEvent::Notification),
                }
            }
            CHAT_MESSAGE => serde_json::from_value::<ChatMessage>(payload.clone())
                .map(RealtimeEvent::ChatMessage)
                .map_err(|e| NormalizeError::Malformed {
                    event: event.to_string(),
                    detail: e.to_string(),
                }),
            APPOINTMENT_UPDATED => {
                appointment_updated(event, object(event, payload)?).map(RealtimeEvent::AppointmentUpdated)
            }
            other => Err(NormalizeError::UnknownEvent(other.to_string())),
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RealtimeEvent::TestResultReady(_) => "test_result",
            RealtimeEvent::Notification(_) => "notification",
            RealtimeEvent::ChatMessage(_) => "chat_message",
            RealtimeEvent::AppointmentUpdated(_) => "appointment_updated",
        }
    }
}

fn object<'a>(event: &str, payload: &'a Value) -> Result<&'a Map<String, Value>, NormalizeError> {
    payload.as_object().ok_or_else(|| NormalizeError::NotAnObject {
        event: event.to_string(),
    })
}

/// First of `names` holding a usable identifier.
fn id(fields: &Map<String, Value>, names: &[&str]) -> Option<EntityId> {
    names
        .iter()
        .filter_map(|name| fields.get(*name))
        .find_map(EntityId::from_value)
}

/// First of `names` holding a non-empty string. Numbers are accepted and stringified.
fn text(fields: &Map<String, Value>, names: &[&str]) -> Option<String> {
    names.iter().filter_map(|name| fields.get(*name)).find_map(|value| match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn test_result(event: &str, fields: &Map<String, Value>) -> Result<TestResultReady, NormalizeError> {
    let test_id = id(fields, &["entityId", "testId", "id"]).ok_or_else(|| NormalizeError::MissingField {
        event: event.to_string(),
        field: "entityId",
    })?;

    // When the event arrives wrapped in a notification, `id` is the
    // notification's own id unless it is the only id present.
    let notification_id = if event == NOTIFICATION
        && (fields.contains_key("entityId") || fields.contains_key("testId"))
    {
        text(fields, &["id"])
    } else {
        None
    };

    Ok(TestResultReady {
        test_id,
        pet_id: id(fields, &["patientId", "petId"]),
        title: text(fields, &["title", "testType"]),
        message: text(fields, &["message", "body"]),
        notification_id,
    })
}

fn generic_notice(
    event: &str,
    fields: &Map<String, Value>,
    kind: Option<&str>,
) -> Result<GenericNotice, NormalizeError> {
    let title = text(fields, &["title"]);
    let message = text(fields, &["message", "body"]);
    if title.is_none() && message.is_none() {
        return Err(NormalizeError::MissingField {
            event: event.to_string(),
            field: "message",
        });
    }

    Ok(GenericNotice {
        id: text(fields, &["id"]),
        kind: kind.unwrap_or("general").to_string(),
        title: title.unwrap_or_else(|| "Notification".to_string()),
        message: message.unwrap_or_default(),
        entity_id: id(fields, &["entityId"]),
        appointment_id: id(fields, &["appointmentId"])
            .and_then(|id| id.as_i64())
            .map(AppointmentId),
    })
}

fn appointment_updated(
    event: &str,
    fields: &Map<String, Value>,
) -> Result<AppointmentUpdated, NormalizeError> {
    let id = id(fields, &["appointmentId", "id"]).ok_or_else(|| NormalizeError::MissingField {
        event: event.to_string(),
        field: "id",
    })?;
    let id = id.as_i64().ok_or_else(|| NormalizeError::Malformed {
        event: event.to_string(),
        detail: format!("appointment id `{id}` is not numeric"),
    })?;

    let status = match fields.get("status") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(AppointmentStatus::parse_loose(s).ok_or_else(|| {
            NormalizeError::Malformed {
                event: event.to_string(),
                detail: format!("unknown status `{s}`"),
            }
        })?),
        Some(other) => {
            return Err(NormalizeError::Malformed {
                event: event.to_string(),
                detail: format!("status must be a string, got {other}"),
            });
        }
    };

    Ok(AppointmentUpdated {
        id: AppointmentId(id),
        status,
    })
}
