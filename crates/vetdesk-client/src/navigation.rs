// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`Navigator`] for hosts without a view router.

use std::sync::Mutex;

use tracing::warn;
use vetdesk_core::Navigator;

/// Records login redirects so a terminal host can tell the user to log in again.
#[derive(Debug, Default)]
pub struct LoginRedirect {
    last_reason: Mutex<Option<String>>,
}

impl LoginRedirect {
    pub fn new() -> Self {
        Self::default()
    }

    /// The reason given by the most recent redirect, if one happened.
    pub fn take_redirect(&self) -> Option<String> {
        self.last_reason.lock().ok()?.take()
    }
}

impl Navigator for LoginRedirect {
    fn redirect_to_login(&self, reason: &str) {
        warn!(reason, "redirecting to login");
        if let Ok(mut last) = self.last_reason.lock() {
            *last = Some(reason.to_string());
        }
    }
}
