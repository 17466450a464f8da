// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Appointment status transitions.
//!
//! Lifecycle: Scheduled -> Confirmed -> Checked In -> Waiting -> In Progress
//! -> Completed. Cancelled and No Show are reachable from every non-terminal
//! status. The backend decides which transitions are legal; the client only
//! suggests actions and applies the requested change optimistically.

use std::fmt;

use chrono::Utc;
use strum::{EnumIter, IntoEnumIterator};
use tracing::{debug, info, warn};
use vetdesk_client::services::appointments;
use vetdesk_client::ApiClient;
use vetdesk_core::{Appointment, AppointmentStatus, VetdeskError};
use vetdesk_query::{keys, QueryClient};

/// A button a view offers for moving an appointment along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum QuickAction {
    Confirm,
    CheckIn,
    SendToWaiting,
    Start,
    Complete,
    Cancel,
    NoShow,
}

impl QuickAction {
    /// Status the action requests.
    pub fn target(self) -> AppointmentStatus {
        match self {
            QuickAction::Confirm => AppointmentStatus::Confirmed,
            QuickAction::CheckIn => AppointmentStatus::CheckedIn,
            QuickAction::SendToWaiting => AppointmentStatus::Waiting,
            QuickAction::Start => AppointmentStatus::InProgress,
            QuickAction::Complete => AppointmentStatus::Completed,
            QuickAction::Cancel => AppointmentStatus::Cancelled,
            QuickAction::NoShow => AppointmentStatus::NoShow,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QuickAction::Confirm => "Confirm",
            QuickAction::CheckIn => "Check-in",
            QuickAction::SendToWaiting => "Send to waiting room",
            QuickAction::Start => "Start visit",
            QuickAction::Complete => "Complete",
            QuickAction::Cancel => "Cancel",
            QuickAction::NoShow => "Mark no-show",
        }
    }

    /// Actions a view shows for an appointment in `status`. Advisory only:
    /// nothing stops a caller from requesting any other transition.
    pub fn suggested_for(status: AppointmentStatus) -> Vec<QuickAction> {
        let forward: &[QuickAction] = match status {
            AppointmentStatus::Scheduled => &[QuickAction::Confirm, QuickAction::CheckIn],
            AppointmentStatus::Confirmed => &[QuickAction::CheckIn],
            AppointmentStatus::CheckedIn => &[QuickAction::SendToWaiting, QuickAction::Start],
            AppointmentStatus::Waiting => &[QuickAction::Start],
            AppointmentStatus::InProgress => &[QuickAction::Complete],
            AppointmentStatus::Completed | AppointmentStatus::Cancelled | AppointmentStatus::NoShow => {
                return Vec::new();
            }
        };

        let mut actions = forward.to_vec();
        actions.push(QuickAction::Cancel);
        if matches!(status, AppointmentStatus::Scheduled | AppointmentStatus::Confirmed) {
            actions.push(QuickAction::NoShow);
        }
        actions
    }

    /// Parses an action by label or name: `"check-in"`, `"CheckIn"`, `"start"`.
    pub fn parse(input: &str) -> Option<Self> {
        let folded = fold(input);
        let named = QuickAction::iter()
            .find(|action| fold(action.label()) == folded || fold(&format!("{action:?}")) == folded);
        if named.is_some() {
            return named;
        }
        match folded.as_str() {
            "wait" | "waiting" => Some(QuickAction::SendToWaiting),
            "begin" => Some(QuickAction::Start),
            _ => None,
        }
    }
}

impl fmt::Display for QuickAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn fold(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Resolves user input that names either a quick action or a status.
pub fn parse_target(input: &str) -> Option<AppointmentStatus> {
    QuickAction::parse(input)
        .map(QuickAction::target)
        .or_else(|| AppointmentStatus::parse_loose(input))
}

/// Issues status transitions and keeps the cache consistent with them.
#[derive(Clone)]
pub struct StatusWorkflow {
    client: ApiClient,
    cache: QueryClient,
}

impl StatusWorkflow {
    pub fn new(client: ApiClient, cache: QueryClient) -> Self {
        Self { client, cache }
    }

    /// Applies a quick action. See [`transition`](Self::transition).
    pub async fn apply(&self, appointment: &mut Appointment, action: QuickAction) -> Result<(), VetdeskError> {
        self.transition(appointment, action.target()).await
    }

    /// Moves `appointment` to `target`.
    ///
    /// The local record and every cached copy are updated before the request
    /// is sent. On success the record keeps `target` and appointment and
    /// queue queries are invalidated. On failure the record and the cached
    /// copies go back to the prior status and the error is returned.
    pub async fn transition(
        &self,
        appointment: &mut Appointment,
        target: AppointmentStatus,
    ) -> Result<(), VetdeskError> {
        let id = appointment.id;
        let previous = appointment.clone();
        if previous.status == target {
            debug!(%id, status = %target, "appointment already in requested status");
        }

        set_status(appointment, target);
        self.patch_cached(appointment);
        info!(%id, from = %previous.status, to = %target, "requesting status change");

        let result = self
            .cache
            .mutate(
                appointments::update_status(&self.client, id, target),
                &[keys::appointments(), keys::appointment(id), keys::queue()],
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(%id, error = %e, "status change rejected, reverting");
                *appointment = previous;
                self.patch_cached(appointment);
                Err(e)
            }
        }
    }

    /// Copies the status of `current` onto every cached copy of it.
    fn patch_cached(&self, current: &Appointment) {
        let (id, status, waiting_since) = (current.id, current.status, current.waiting_since);
        let patch = |a: &mut Appointment| {
            a.status = status;
            a.waiting_since = waiting_since;
        };
        let patch_list = |list: &Vec<Appointment>| {
            list.iter()
                .cloned()
                .map(|mut a| {
                    if a.id == id {
                        patch(&mut a);
                    }
                    a
                })
                .collect::<Vec<_>>()
        };
        let lists = self
            .cache
            .update_query_data::<Vec<Appointment>, _>(&keys::appointments(), patch_list)
            + self
                .cache
                .update_query_data::<Vec<Appointment>, _>(&keys::queue(), patch_list);
        let detail = self
            .cache
            .update_query_data::<Appointment, _>(&keys::appointment(id), |a| {
                let mut a = a.clone();
                patch(&mut a);
                a
            });
        debug!(%id, %status, lists, detail, "patched cached appointments");
    }
}

/// Sets `status`, stamping the waiting-room arrival the first time the
/// appointment enters the queue.
fn set_status(appointment: &mut Appointment, status: AppointmentStatus) {
    appointment.status = status;
    let queued = matches!(
        status,
        AppointmentStatus::CheckedIn | AppointmentStatus::Waiting | AppointmentStatus::InProgress
    );
    if queued && appointment.waiting_since.is_none() {
        appointment.waiting_since = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_non_terminal_status_offers_cancel() {
        for status in AppointmentStatus::iter() {
            let actions = QuickAction::suggested_for(status);
            if status.is_terminal() {
                assert!(actions.is_empty(), "{status} is terminal");
            } else {
                assert!(actions.contains(&QuickAction::Cancel), "{status} lacks cancel");
            }
        }
    }

    #[test]
    fn suggested_forward_actions_follow_the_lifecycle() {
        assert_eq!(
            QuickAction::suggested_for(AppointmentStatus::Scheduled),
            [QuickAction::Confirm, QuickAction::CheckIn, QuickAction::Cancel, QuickAction::NoShow]
        );
        assert_eq!(
            QuickAction::suggested_for(AppointmentStatus::InProgress),
            [QuickAction::Complete, QuickAction::Cancel]
        );
    }

    #[test]
    fn parses_actions_and_statuses() {
        assert_eq!(QuickAction::parse("Check-in"), Some(QuickAction::CheckIn));
        assert_eq!(QuickAction::parse("checkin"), Some(QuickAction::CheckIn));
        assert_eq!(QuickAction::parse("no-show"), Some(QuickAction::NoShow));
        assert_eq!(QuickAction::parse("start"), Some(QuickAction::Start));
        assert_eq!(QuickAction::parse("teleport"), None);

        assert_eq!(parse_target("check-in"), Some(AppointmentStatus::CheckedIn));
        assert_eq!(parse_target("In Progress"), Some(AppointmentStatus::InProgress));
        assert_eq!(parse_target("confirmed"), Some(AppointmentStatus::Confirmed));
    }

    #[test]
    fn entering_the_queue_stamps_waiting_since_once() {
        let mut appointment: Appointment = serde_json::from_value(serde_json::json!({
            "id": 1, "petId": 2, "doctorId": 3,
            "scheduledAt": "2026-10-16T09:00:00Z",
            "status": "Scheduled", "type": "Surgery"
        }))
        .unwrap();

        set_status(&mut appointment, AppointmentStatus::CheckedIn);
        let stamped = appointment.waiting_since;
        assert!(stamped.is_some());

        set_status(&mut appointment, AppointmentStatus::Waiting);
        assert_eq!(appointment.waiting_since, stamped);
    }
}
