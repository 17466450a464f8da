// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the VetDesk clinic client.
//!
//! This crate provides the error taxonomy, the domain records exchanged with
//! the clinic backend, and the seam traits ([`TokenStore`], [`Navigator`])
//! the runtime uses to reach its host environment.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::VetdeskError;
pub use traits::{Navigator, TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
pub use types::{
    Appointment, AppointmentId, AppointmentStatus, AppointmentType, ChatMessage, EntityId,
    Notification, Priority, Shift, ShiftStatus,
};
