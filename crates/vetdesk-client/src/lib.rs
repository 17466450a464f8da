// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! REST client for the VetDesk clinic backend.
//!
//! [`ApiClient`] owns authentication: it attaches the stored bearer token,
//! refreshes it once on 401, and forces a logout when refresh fails. The
//! [`services`] modules wrap individual endpoints on top of it.

pub mod credentials;
pub mod http;
pub mod navigation;
pub mod services;

pub use credentials::{FileTokenStore, MemoryTokenStore};
pub use http::ApiClient;
pub use navigation::LoginRedirect;
