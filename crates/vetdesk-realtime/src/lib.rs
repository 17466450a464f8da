// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Real-time side of the VetDesk clinic client.
//!
//! [`SocketClient`] feeds raw socket frames into the event bus;
//! [`NotificationDispatcher`] normalizes them and updates the
//! [`NotificationCenter`], the [`ChatLog`] and the query cache.

pub mod center;
pub mod chat;
pub mod dispatch;
pub mod socket;

pub use center::NotificationCenter;
pub use chat::ChatLog;
pub use dispatch::{EventHandler, NotificationDispatcher, TEST_RESULT_KIND};
pub use socket::{parse_frame, SocketClient};
