// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Clinic-facing logic of the VetDesk client.
//!
//! - [`workflow`]: optimistic appointment status transitions
//! - [`board`] and [`queue`]: pure views over appointment lists
//! - [`queries`]: clinic resources bound to cache keys
//! - [`boundary`]: failure capture for views

pub mod board;
pub mod boundary;
pub mod queries;
pub mod queue;
pub mod workflow;

pub use board::{column_for, is_flagged, Board, Column, ColumnKey};
pub use boundary::{CapturedFailure, ErrorBoundary, FailureKind};
pub use queries::ClinicQueries;
pub use queue::{build_queue, format_wait, QueueItem};
pub use workflow::{parse_target, QuickAction, StatusWorkflow};
