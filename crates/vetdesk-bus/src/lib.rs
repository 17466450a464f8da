// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Socket event plumbing for the VetDesk clinic client.
//!
//! [`EventBus`] is the listener registry the socket client emits into;
//! [`RealtimeEvent`] is the canonical form every raw payload is normalized
//! into before a handler looks at it.

pub mod bus;
pub mod event;

pub use bus::{BusError, EventBus, Listener, ListenerId, Subscription};
pub use event::{
    AppointmentUpdated, GenericNotice, NormalizeError, RealtimeEvent, TestResultReady, KNOWN_EVENTS,
};
