// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the VetDesk clinic client.

use std::sync::Arc;

use thiserror::Error;

/// The primary error type used across service calls, the query cache, and the
/// clinic workflow.
#[derive(Debug, Error)]
pub enum VetdeskError {
    /// Configuration errors (invalid URL, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// An authenticated call was attempted without a stored credential.
    #[error("missing credential: {0}")]
    MissingCredential(String),

    /// The backend rejected the request with 401 after the one allowed refresh.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Token refresh failed; stored credentials were cleared and the user
    /// was sent to the login view.
    #[error("session expired: {0}")]
    SessionExpired(String),

    /// Transport-level failure (DNS, connection reset, TLS).
    #[error("network error: {message}")]
    Network {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Non-success HTTP response from the backend.
    #[error("{}", format_api_error(*status, message, details.as_deref()))]
    Api {
        status: u16,
        message: String,
        details: Option<String>,
    },

    /// Response body could not be decoded into the expected shape.
    #[error("decode error: {message}")]
    Decode {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Credential storage errors (file I/O, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// An error produced once and handed to every caller that joined the same
    /// in-flight query.
    #[error(transparent)]
    Shared(Arc<VetdeskError>),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

fn format_api_error(status: u16, message: &str, details: Option<&str>) -> String {
    match details {
        Some(d) if !d.is_empty() => format!("API error ({status}): {message} ({d})"),
        _ => format!("API error ({status}): {message}"),
    }
}

impl VetdeskError {
    /// Unwraps any [`Shared`](VetdeskError::Shared) layers.
    pub fn root(&self) -> &VetdeskError {
        match self {
            VetdeskError::Shared(inner) => inner.root(),
            other => other,
        }
    }

    /// HTTP status carried by the error, if it came from a backend response.
    pub fn status(&self) -> Option<u16> {
        match self.root() {
            VetdeskError::Api { status, .. } => Some(*status),
            VetdeskError::Unauthorized(_) => Some(401),
            _ => None,
        }
    }

    /// True for failures worth retrying: network trouble, timeouts, and 5xx.
    pub fn is_transient(&self) -> bool {
        match self.root() {
            VetdeskError::Network { .. } | VetdeskError::Timeout { .. } => true,
            VetdeskError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// The message a view shows the user, including server `details` when present.
    pub fn user_message(&self) -> String {
        match self.root() {
            VetdeskError::Api {
                message, details, ..
            } => match details {
                Some(d) if !d.is_empty() => format!("{message}: {d}"),
                _ => message.clone(),
            },
            other => other.to_string(),
        }
    }
}
