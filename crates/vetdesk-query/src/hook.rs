// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-view query bindings.
//!
//! A [`QueryHandle`] ties one cache key, its options and its fetcher
//! together, and remembers the last data and error the view rendered.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use vetdesk_core::VetdeskError;

use crate::client::QueryClient;
use crate::key::QueryKey;
use crate::options::QueryOptions;

/// A type-erased request for one resource.
pub type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, VetdeskError>> + Send + Sync>;

/// Where a handle is in its load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Success,
    Error,
}

pub struct QueryHandle<T> {
    client: QueryClient,
    key: QueryKey,
    options: QueryOptions,
    fetcher: Fetcher<T>,
    data: Option<T>,
    error: Option<VetdeskError>,
    status: QueryStatus,
}

impl<T> fmt::Debug for QueryHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryHandle")
            .field("key", &self.key)
            .field("options", &self.options)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl<T> QueryHandle<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(client: QueryClient, key: QueryKey, options: QueryOptions, fetcher: Fetcher<T>) -> Self {
        Self {
            client,
            key,
            options,
            fetcher,
            data: None,
            error: None,
            status: QueryStatus::Idle,
        }
    }

    /// Reads through the cache and records the outcome.
    ///
    /// On error the previously loaded data is kept next to the error so a
    /// view can keep rendering it.
    pub async fn load(&mut self) -> Result<&T, &VetdeskError> {
        let fetcher = self.fetcher.clone();
        let result = self
            .client
            .fetch(self.key.clone(), self.options, move || fetcher())
            .await;

        match result {
            Ok(value) => {
                self.error = None;
                self.status = QueryStatus::Success;
                Ok(self.data.insert(value))
            }
            Err(e) => {
                self.status = QueryStatus::Error;
                Err(self.error.insert(e))
            }
        }
    }

    /// Marks the key stale and loads again.
    pub async fn refetch(&mut self) -> Result<&T, &VetdeskError> {
        self.client.invalidate(&self.key);
        self.load().await
    }

    /// Whatever the cache holds for this key right now, without a request.
    pub fn peek(&self) -> Option<T> {
        self.client.get_query_data(&self.key)
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&VetdeskError> {
        self.error.as_ref()
    }

    pub fn status(&self) -> QueryStatus {
        self.status
    }

    pub fn is_fetching(&self) -> bool {
        self.client.is_fetching(&self.key)
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn options(&self) -> QueryOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use futures::FutureExt;

    use super::*;
    use crate::query_key;

    fn flaky(fail: Arc<AtomicBool>) -> Fetcher<String> {
        Arc::new(move || {
            let fail = fail.clone();
            async move {
                if fail.load(Ordering::SeqCst) {
                    Err(VetdeskError::Api {
                        status: 500,
                        message: "down".into(),
                        details: None,
                    })
                } else {
                    Ok("queue".to_string())
                }
            }
            .boxed()
        })
    }

    #[tokio::test]
    async fn error_keeps_previous_data() {
        let client = QueryClient::default();
        let fail = Arc::new(AtomicBool::new(false));
        let mut handle = QueryHandle::new(
            client,
            query_key!("queue"),
            QueryOptions::always_stale(),
            flaky(fail.clone()),
        );
        assert_eq!(handle.status(), QueryStatus::Idle);

        assert_eq!(handle.load().await.unwrap(), "queue");
        assert_eq!(handle.status(), QueryStatus::Success);

        fail.store(true, Ordering::SeqCst);
        let err = handle.load().await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(handle.status(), QueryStatus::Error);
        assert_eq!(handle.data().map(String::as_str), Some("queue"));

        fail.store(false, Ordering::SeqCst);
        handle.refetch().await.unwrap();
        assert!(handle.error().is_none());
    }

    #[tokio::test]
    async fn handles_on_one_key_share_the_cache() {
        let client = QueryClient::default();
        let fail = Arc::new(AtomicBool::new(false));
        let options = QueryOptions::default();
        let mut first = QueryHandle::new(client.clone(), query_key!("pets"), options, flaky(fail.clone()));
        let second = QueryHandle::new(client.clone(), query_key!("pets"), options, flaky(fail));

        assert!(second.peek().is_none());
        first.load().await.unwrap();
        assert_eq!(second.peek().as_deref(), Some("queue"));
        assert_eq!(client.requests_started(), 1);
    }
}
