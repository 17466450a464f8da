// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;
use vetdesk_bus::BusError;
use vetdesk_clinic::CapturedFailure;
use vetdesk_core::VetdeskError;

/// Why a subcommand stopped.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Client(#[from] VetdeskError),

    /// A view load failed and its boundary captured the failure.
    #[error("{0}")]
    View(CapturedFailure),

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error("input error: {0}")]
    Input(#[from] std::io::Error),

    #[error("{0}")]
    Usage(String),
}

impl CliError {
    /// Text for the terminal; backend errors include their `details`.
    pub fn message(&self) -> String {
        match self {
            CliError::Client(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
