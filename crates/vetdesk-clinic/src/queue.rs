// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Waiting-room queue.
//!
//! Queue items are derived from appointments on every render and never
//! stored. Wait time is computed against the caller's clock, so the same
//! item shows a longer wait on the next render.

use chrono::{DateTime, TimeDelta, Utc};
use vetdesk_core::{Appointment, AppointmentId, AppointmentStatus, Priority};

/// True for statuses that put an appointment in the waiting room.
pub fn is_queued(status: AppointmentStatus) -> bool {
    matches!(
        status,
        AppointmentStatus::CheckedIn | AppointmentStatus::Waiting | AppointmentStatus::InProgress
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueueItem {
    pub appointment_id: AppointmentId,
    pub pet_name: String,
    pub doctor_name: Option<String>,
    pub status: AppointmentStatus,
    pub priority: Priority,
    pub scheduled_at: DateTime<Utc>,
    /// Arrival in the waiting room; the scheduled time when the backend sent none.
    pub waiting_since: DateTime<Utc>,
}

impl QueueItem {
    /// `None` unless the appointment is checked in, waiting, or in progress.
    pub fn from_appointment(appointment: &Appointment) -> Option<Self> {
        if !is_queued(appointment.status) {
            return None;
        }
        Some(Self {
            appointment_id: appointment.id,
            pet_name: appointment
                .pet_name
                .clone()
                .unwrap_or_else(|| format!("Pet #{}", appointment.pet_id)),
            doctor_name: appointment.doctor_name.clone(),
            status: appointment.status,
            priority: appointment.priority,
            scheduled_at: appointment.scheduled_at,
            waiting_since: appointment.waiting_since.unwrap_or(appointment.scheduled_at),
        })
    }

    /// Time spent waiting as of `now`. Never negative.
    pub fn wait_time(&self, now: DateTime<Utc>) -> TimeDelta {
        (now - self.waiting_since).max(TimeDelta::zero())
    }

    pub fn is_priority(&self) -> bool {
        self.priority == Priority::High
    }
}

/// Queue items for `appointments`, longest-waiting first. Priority does not reorder.
pub fn build_queue<'a>(appointments: impl IntoIterator<Item = &'a Appointment>) -> Vec<QueueItem> {
    let mut items: Vec<QueueItem> = appointments
        .into_iter()
        .filter_map(QueueItem::from_appointment)
        .collect();
    items.sort_by_key(|item| (item.waiting_since, item.appointment_id));
    items
}

/// Formats a wait as `"1h 5m"` or `"12m"`.
pub fn format_wait(wait: TimeDelta) -> String {
    let minutes = wait.num_minutes().max(0);
    let hours = minutes / 60;
    let minutes = minutes % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}
