// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Failure capture for a guarded view.
//!
//! An [`ErrorBoundary`] runs a view's work, and if that work fails or panics
//! it records the failure instead of letting it escape. The view renders a
//! fallback from [`ErrorBoundary::failure`] until [`ErrorBoundary::reset`]
//! clears it.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use futures::FutureExt;
use tracing::{error, info};
use vetdesk_core::VetdeskError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Error,
    Panic,
}

/// What went wrong inside a boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedFailure {
    pub kind: FailureKind,
    /// Message fit for the fallback view.
    pub message: String,
    /// HTTP status of the underlying error, when there was one.
    pub status: Option<u16>,
    pub captured_at: DateTime<Utc>,
}

impl fmt::Display for CapturedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FailureKind::Error => write!(f, "{}", self.message),
            FailureKind::Panic => write!(f, "unexpected failure: {}", self.message),
        }
    }
}

type ResetHook = Box<dyn Fn() + Send + Sync>;

pub struct ErrorBoundary {
    name: String,
    failure: Mutex<Option<CapturedFailure>>,
    on_reset: Option<ResetHook>,
}

impl fmt::Debug for ErrorBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorBoundary")
            .field("name", &self.name)
            .field("failure", &*self.lock())
            .finish_non_exhaustive()
    }
}

impl ErrorBoundary {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failure: Mutex::new(None),
            on_reset: None,
        }
    }

    /// Runs `recover` on every [`reset`](Self::reset), e.g. to refetch the view's data.
    pub fn with_reset<F>(mut self, recover: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_reset = Some(Box::new(recover));
        self
    }

    fn lock(&self) -> MutexGuard<'_, Option<CapturedFailure>> {
        self.failure.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `work` unless a failure is already captured.
    ///
    /// Returns the value on success. An error or panic is captured and
    /// `None` returned; later calls return `None` without running until the
    /// boundary is reset.
    pub async fn guard<T, Fut>(&self, work: Fut) -> Option<T>
    where
        Fut: Future<Output = Result<T, VetdeskError>>,
    {
        if self.lock().is_some() {
            return None;
        }

        let failure = match AssertUnwindSafe(work).catch_unwind().await {
            Ok(Ok(value)) => return Some(value),
            Ok(Err(e)) => {
                error!(boundary = %self.name, error = %e, "view failed");
                CapturedFailure {
                    kind: FailureKind::Error,
                    message: e.user_message(),
                    status: e.status(),
                    captured_at: Utc::now(),
                }
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(boundary = %self.name, panic = %message, "view panicked");
                CapturedFailure {
                    kind: FailureKind::Panic,
                    message,
                    status: None,
                    captured_at: Utc::now(),
                }
            }
        };

        *self.lock() = Some(failure);
        None
    }

    /// Captures `error` directly, for failures raised outside [`guard`](Self::guard).
    pub fn capture(&self, error: &VetdeskError) {
        error!(boundary = %self.name, error = %error, "view failed");
        *self.lock() = Some(CapturedFailure {
            kind: FailureKind::Error,
            message: error.user_message(),
            status: error.status(),
            captured_at: Utc::now(),
        });
    }

    pub fn failure(&self) -> Option<CapturedFailure> {
        self.lock().clone()
    }

    pub fn has_failed(&self) -> bool {
        self.lock().is_some()
    }

    /// Clears the captured failure and runs the recovery hook.
    pub fn reset(&self) {
        let cleared = self.lock().take();
        if let Some(failure) = cleared {
            info!(boundary = %self.name, %failure, "boundary reset");
        }
        if let Some(recover) = &self.on_reset {
            recover();
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}
