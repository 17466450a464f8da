// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seam traits between the client runtime and its host environment.

pub mod navigator;
pub mod token_store;

pub use navigator::Navigator;
pub use token_store::{TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
