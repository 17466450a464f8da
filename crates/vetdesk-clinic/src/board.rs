// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Appointment board: one column per status bucket.

use strum::{Display, EnumIter, IntoEnumIterator};
use vetdesk_core::{Appointment, AppointmentId, AppointmentStatus, Priority};

/// Board columns, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
pub enum ColumnKey {
    Scheduled,
    #[strum(serialize = "Checked In")]
    CheckedIn,
    Waiting,
    #[strum(serialize = "In Progress")]
    InProgress,
    Completed,
    Closed,
}

/// The column an appointment in `status` belongs to.
pub fn column_for(status: AppointmentStatus) -> ColumnKey {
    match status {
        AppointmentStatus::Scheduled | AppointmentStatus::Confirmed => ColumnKey::Scheduled,
        AppointmentStatus::CheckedIn => ColumnKey::CheckedIn,
        AppointmentStatus::Waiting => ColumnKey::Waiting,
        AppointmentStatus::InProgress => ColumnKey::InProgress,
        AppointmentStatus::Completed => ColumnKey::Completed,
        AppointmentStatus::Cancelled | AppointmentStatus::NoShow => ColumnKey::Closed,
    }
}

#[derive(Debug, Clone)]
pub struct Column {
    pub key: ColumnKey,
    /// Ascending by scheduled time.
    pub cards: Vec<Appointment>,
}

impl Column {
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// High-priority cards are flagged on the board but keep their place.
pub fn is_flagged(appointment: &Appointment) -> bool {
    appointment.priority == Priority::High
}

#[derive(Debug, Clone)]
pub struct Board {
    columns: Vec<Column>,
}

impl Board {
    /// Buckets `appointments` into every column, each sorted by scheduled time.
    pub fn build(appointments: impl IntoIterator<Item = Appointment>) -> Self {
        let mut columns: Vec<Column> = ColumnKey::iter()
            .map(|key| Column {
                key,
                cards: Vec::new(),
            })
            .collect();

        for appointment in appointments {
            let key = column_for(appointment.status);
            if let Some(column) = columns.iter_mut().find(|c| c.key == key) {
                column.cards.push(appointment);
            }
        }
        for column in &mut columns {
            column.cards.sort_by_key(|a| (a.scheduled_at, a.id));
        }
        Self { columns }
    }

    /// All columns, including empty ones, in display order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, key: ColumnKey) -> &[Appointment] {
        self.columns
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.cards.as_slice())
            .unwrap_or_default()
    }

    /// The column currently holding appointment `id`.
    pub fn locate(&self, id: AppointmentId) -> Option<ColumnKey> {
        self.columns
            .iter()
            .find(|c| c.cards.iter().any(|a| a.id == id))
            .map(|c| c.key)
    }

    pub fn total(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }
}
