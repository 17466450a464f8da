// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-visible navigation triggered by the runtime.

/// Moves the user to another view.
///
/// The HTTP client calls [`redirect_to_login`](Navigator::redirect_to_login)
/// after a failed token refresh. This is a navigation, not an error: the
/// failing call still returns its own error to the caller.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self, reason: &str);
}
