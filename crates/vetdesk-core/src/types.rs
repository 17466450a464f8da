// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain records exchanged with the clinic backend.
//!
//! Wire names follow the backend's camelCase JSON. Enum variants carry the
//! exact display strings the backend uses (`"Checked In"`, `"No Show"`).

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Backend identifier of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(pub i64);

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An identifier that arrives either as a JSON number or as a string.
///
/// Real-time payloads are loose about this; REST payloads mostly send numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum EntityId {
    Numeric(i64),
    Text(String),
}

impl EntityId {
    /// Reads an id out of a JSON value. Numeric strings become [`EntityId::Numeric`].
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_i64().map(EntityId::Numeric),
            serde_json::Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else if let Ok(n) = trimmed.parse::<i64>() {
                    Some(EntityId::Numeric(n))
                } else {
                    Some(EntityId::Text(trimmed.to_string()))
                }
            }
            _ => None,
        }
    }

    /// Returns the numeric form, if there is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            EntityId::Numeric(n) => Some(*n),
            EntityId::Text(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        EntityId::from_value(&value)
            .ok_or_else(|| serde::de::Error::custom("expected a numeric or string identifier"))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Numeric(n) => write!(f, "{n}"),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

/// Appointment lifecycle status.
///
/// Scheduled -> Confirmed -> Checked In -> Waiting -> In Progress -> Completed,
/// with Cancelled and No Show reachable from any non-terminal state.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
)]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    #[strum(serialize = "Checked In")]
    #[serde(rename = "Checked In")]
    CheckedIn,
    Waiting,
    #[strum(serialize = "In Progress")]
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Cancelled,
    #[strum(serialize = "No Show")]
    #[serde(rename = "No Show")]
    NoShow,
}

impl AppointmentStatus {
    /// Terminal statuses are archived and read-only.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled | AppointmentStatus::NoShow
        )
    }

    /// Parses backend and user spellings alike: `"Checked In"`, `"checked_in"`,
    /// `"checked-in"`, `"CHECKEDIN"`.
    pub fn parse_loose(input: &str) -> Option<Self> {
        let folded: String = input
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let status = match folded.as_str() {
            "scheduled" | "booked" => AppointmentStatus::Scheduled,
            "confirmed" => AppointmentStatus::Confirmed,
            "checkedin" | "checkin" => AppointmentStatus::CheckedIn,
            "waiting" => AppointmentStatus::Waiting,
            "inprogress" => AppointmentStatus::InProgress,
            "completed" | "done" => AppointmentStatus::Completed,
            "cancelled" | "canceled" => AppointmentStatus::Cancelled,
            "noshow" => AppointmentStatus::NoShow,
            _ => return None,
        };
        Some(status)
    }
}

impl<'de> Deserialize<'de> for AppointmentStatus {
    /// Accepts the display strings and the spellings [`parse_loose`](Self::parse_loose) knows.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        AppointmentStatus::parse_loose(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown appointment status `{raw}`")))
    }
}

/// Kind of visit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentType {
    #[serde(rename = "Check-up", alias = "Checkup")]
    CheckUp,
    Surgery,
    Vaccination,
    Emergency,
    #[serde(rename = "Follow-up", alias = "Followup")]
    FollowUp,
    Grooming,
    Consultation,
    #[serde(other)]
    Other,
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AppointmentType::CheckUp => "Check-up",
            AppointmentType::Surgery => "Surgery",
            AppointmentType::Vaccination => "Vaccination",
            AppointmentType::Emergency => "Emergency",
            AppointmentType::FollowUp => "Follow-up",
            AppointmentType::Grooming => "Grooming",
            AppointmentType::Consultation => "Consultation",
            AppointmentType::Other => "Other",
        };
        f.write_str(label)
    }
}

/// Priority flag on an appointment. Cosmetic: it marks, it does not reorder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

/// A booked or walk-in appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: AppointmentId,
    pub pet_id: i64,
    pub doctor_id: i64,
    pub scheduled_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    #[serde(rename = "type")]
    pub appointment_type: AppointmentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiting_since: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
}

/// Payload for booking a new appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub pet_id: i64,
    pub doctor_id: i64,
    pub scheduled_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub appointment_type: AppointmentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Payload for registering a walk-in patient straight into the queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkInRegistration {
    pub pet_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub priority: Priority,
}

/// A notification shown behind the bell/badge indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(default, alias = "isRead")]
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<AppointmentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<EntityId>,
    #[serde(default = "default_notification_kind")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

/// Server ids sent as a JSON number or string, kept as text.
fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    optional_id_string(deserializer)?
        .ok_or_else(|| serde::de::Error::custom("expected a numeric or string identifier"))
}

fn optional_id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        serde_json::Value::String(s) if !s.trim().is_empty() => Ok(Some(s)),
        other => Err(serde::de::Error::custom(format!(
            "expected a numeric or string identifier, got {other}"
        ))),
    }
}

fn default_notification_kind() -> String {
    "general".to_string()
}

/// One chat message. Chat logs are append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(
        default,
        deserialize_with = "optional_id_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    pub conversation_id: String,
    pub content: String,
    #[serde(rename = "type", default = "default_chat_type")]
    pub message_type: String,
    pub sender: String,
    pub timestamp: DateTime<Utc>,
    /// Position in local arrival order; assigned on receipt, never sent.
    #[serde(skip)]
    pub arrival_seq: u64,
}

fn default_chat_type() -> String {
    "text".to_string()
}

/// Outbound chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChatMessage {
    pub conversation_id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub message_type: String,
}

/// Status of a doctor's shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ShiftStatus {
    Scheduled,
    Completed,
    Cancelled,
}

/// A doctor's working shift. Overlaps are the backend's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: i64,
    pub doctor_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ShiftStatus,
}

/// Payload for creating or updating a shift.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftInput {
    pub doctor_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ShiftStatus>,
}

/// A patient record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: i64,
    pub name: String,
    pub species: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_phone: Option<String>,
}

/// Payload for registering a new patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPet {
    pub name: String,
    pub species: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
}

/// A vaccination given or scheduled for a pet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vaccination {
    pub id: i64,
    pub pet_id: i64,
    pub vaccine_name: String,
    pub administered_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_due: Option<NaiveDate>,
}

/// Payload for recording a vaccination.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVaccination {
    pub pet_id: i64,
    pub vaccine_name: String,
    pub administered_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_due: Option<NaiveDate>,
}

/// A lab test and, once ready, its result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabTest {
    pub id: EntityId,
    pub pet_id: i64,
    pub test_type: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// SOAP clinical note attached to an appointment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoapNote {
    #[serde(default)]
    pub subjective: String,
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub assessment: String,
    #[serde(default)]
    pub plan: String,
}

/// An invoice issued to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<AppointmentId>,
    pub amount: f64,
    pub status: String,
    pub issued_at: DateTime<Utc>,
}

/// Request for a one-off payment link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickLinkRequest {
    pub amount: f64,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<AppointmentId>,
}

/// A generated payment link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickPaymentLink {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Revenue total for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub total: f64,
}

/// Low-stock or expiring medicine alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineAlert {
    pub medicine_id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
}

/// Access/refresh token pair returned by login and refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Backend health as reported by `GET health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}
