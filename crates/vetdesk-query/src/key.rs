// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache keys: a resource name followed by identifying parameters.

use std::fmt;

/// Identifies one cached query, e.g. `["appointments", "2026-10-16"]`.
///
/// Keys form a hierarchy by prefix: invalidating `["appointments"]` covers
/// every key that starts with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    /// A key naming only a resource.
    pub fn new(resource: impl Into<String>) -> Self {
        Self(vec![resource.into()])
    }

    /// Appends an identifying parameter.
    pub fn with(mut self, part: impl ToString) -> Self {
        self.0.push(part.to_string());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn resource(&self) -> &str {
        &self.0[0]
    }

    /// True if `prefix` names this key or one of its ancestors.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// Builds a [`QueryKey`]: `query_key!("tests", test_id)`.
#[macro_export]
macro_rules! query_key {
    ($resource:expr $(, $part:expr)* $(,)?) => {
        $crate::QueryKey::new($resource)$(.with($part))*
    };
}
