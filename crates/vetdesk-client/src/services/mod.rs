// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain service functions, one module per backend resource.
//!
//! Every function is a thin wrapper over an [`ApiClient`](crate::ApiClient)
//! call. Errors are returned unchanged for the query layer to surface.

pub mod appointments;
pub mod billing;
pub mod chat;
pub mod health;
pub mod inventory;
pub mod lab_tests;
pub mod notifications;
pub mod patients;
pub mod reports;
pub mod shifts;
pub mod soap;
pub mod vaccines;
