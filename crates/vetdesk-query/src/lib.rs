// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query cache for the VetDesk clinic client.
//!
//! Views read server data through a shared [`QueryClient`], which
//! de-duplicates concurrent requests per [`QueryKey`], serves results inside
//! their staleness window, and refetches once a mutation invalidates them.

pub mod client;
pub mod hook;
pub mod key;
pub mod keys;
pub mod options;

pub use client::QueryClient;
pub use hook::{Fetcher, QueryHandle, QueryStatus};
pub use key::QueryKey;
pub use options::{QueryOptions, RetryPolicy, MAX_RETRIES, MAX_STALE_TIME};
