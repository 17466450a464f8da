// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The shared query cache.
//!
//! [`QueryClient`] maps [`QueryKey`]s to cached results and in-flight
//! requests. A read returns a fresh cached value, joins the request already
//! running for the key, or starts exactly one new request. The running
//! request writes its own result back, so a caller that stops waiting does
//! not strand the key.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::time::Instant;
use tracing::{debug, trace, warn};
use vetdesk_core::VetdeskError;

use crate::key::QueryKey;
use crate::options::{QueryOptions, RetryPolicy};

type AnyValue = Arc<dyn Any + Send + Sync>;
type SharedResult = Result<AnyValue, Arc<VetdeskError>>;
type InFlight = Shared<BoxFuture<'static, SharedResult>>;

#[derive(Clone)]
struct Entry {
    value: AnyValue,
    updated_at: Instant,
    invalidated: bool,
}

impl Entry {
    fn is_fresh(&self, now: Instant, options: &QueryOptions) -> bool {
        !self.invalidated && now.duration_since(self.updated_at) < options.stale_time()
    }
}

#[derive(Default)]
struct State {
    entries: HashMap<QueryKey, Entry>,
    in_flight: HashMap<QueryKey, (u64, InFlight)>,
    /// In-flight keys invalidated after their request started.
    invalidated_in_flight: HashSet<QueryKey>,
    next_request_id: u64,
    requests_started: u64,
}

struct Inner {
    state: Mutex<State>,
    defaults: QueryOptions,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records the outcome of request `request_id` if it still owns `key`.
    fn complete(&self, key: &QueryKey, request_id: u64, result: &SharedResult) {
        let mut state = self.lock();
        match state.in_flight.get(key) {
            Some((id, _)) if *id == request_id => {}
            _ => {
                trace!(%key, request_id, "discarding result of superseded request");
                return;
            }
        }
        state.in_flight.remove(key);
        let invalidated = state.invalidated_in_flight.remove(key);

        match result {
            Ok(value) => {
                state.entries.insert(
                    key.clone(),
                    Entry {
                        value: value.clone(),
                        updated_at: Instant::now(),
                        invalidated,
                    },
                );
                debug!(%key, invalidated, "query result cached");
            }
            Err(e) => {
                // Previously cached data is kept; the caller sees the error.
                debug!(%key, error = %e, "query failed");
            }
        }
    }
}

/// Process-wide query cache. Clones share state.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<Inner>,
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new(QueryOptions::default())
    }
}

impl QueryClient {
    /// Creates an empty cache whose [`fetch_default`](Self::fetch_default)
    /// reads use `defaults`.
    pub fn new(defaults: QueryOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                defaults,
            }),
        }
    }

    pub fn defaults(&self) -> QueryOptions {
        self.inner.defaults
    }

    /// Reads `key`, fetching with `fetcher` when there is no fresh value.
    ///
    /// At most one request per key is in flight: concurrent callers share it
    /// and all receive its result or its error.
    pub async fn fetch<T, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> Result<T, VetdeskError>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, VetdeskError>> + Send + 'static,
    {
        let request = {
            let mut state = self.inner.lock();

            if let Some(entry) = state.entries.get(&key) {
                if entry.is_fresh(Instant::now(), &options) {
                    if let Some(value) = (*entry.value).downcast_ref::<T>() {
                        trace!(%key, "cache hit");
                        return Ok(value.clone());
                    }
                    warn!(%key, "cached value has a different type, refetching");
                }
            }

            match state.in_flight.get(&key) {
                Some((_, running)) => {
                    debug!(%key, "joining in-flight request");
                    running.clone()
                }
                None => self.start_request(&mut state, key.clone(), options.retry(), fetcher),
            }
        };

        match request.await {
            Ok(value) => value.downcast::<T>().map(|v| (*v).clone()).map_err(|_| {
                VetdeskError::Internal(format!("query `{key}` resolved to a different type"))
            }),
            Err(e) => Err(VetdeskError::Shared(e)),
        }
    }

    /// [`fetch`](Self::fetch) with this client's default options.
    pub async fn fetch_default<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<T, VetdeskError>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, VetdeskError>> + Send + 'static,
    {
        self.fetch(key, self.inner.defaults, fetcher).await
    }

    fn start_request<T, F, Fut>(
        &self,
        state: &mut State,
        key: QueryKey,
        retry: RetryPolicy,
        fetcher: F,
    ) -> InFlight
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, VetdeskError>> + Send + 'static,
    {
        let request_id = state.next_request_id;
        state.next_request_id += 1;
        state.requests_started += 1;
        debug!(%key, request_id, "starting request");

        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        let task_key = key.clone();
        let request = async move {
            let result: SharedResult = match run_with_retry(&fetcher, retry, &task_key).await {
                Ok(value) => Ok(Arc::new(value) as AnyValue),
                Err(e) => Err(Arc::new(e)),
            };
            if let Some(inner) = inner.upgrade() {
                inner.complete(&task_key, request_id, &result);
            }
            result
        }
        .boxed()
        .shared();

        state.in_flight.insert(key, (request_id, request.clone()));
        // Driven by its own task so it completes even if every caller gives up.
        tokio::spawn(request.clone());
        request
    }

    /// Runs a mutation and, on success only, invalidates every key under `invalidates`.
    pub async fn mutate<T, Fut>(&self, mutation: Fut, invalidates: &[QueryKey]) -> Result<T, VetdeskError>
    where
        Fut: Future<Output = Result<T, VetdeskError>>,
    {
        let value = mutation.await?;
        for prefix in invalidates {
            self.invalidate(prefix);
        }
        Ok(value)
    }

    /// Marks every key under `prefix` stale so the next read refetches.
    ///
    /// Requests already running for those keys still complete, but their
    /// results are stored as stale. Returns the number of keys affected.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut state = self.inner.lock();
        let mut affected = 0;
        for (key, entry) in state.entries.iter_mut() {
            if key.starts_with(prefix) {
                entry.invalidated = true;
                affected += 1;
            }
        }
        let running: Vec<QueryKey> = state
            .in_flight
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        for key in running {
            if state.invalidated_in_flight.insert(key) {
                affected += 1;
            }
        }
        debug!(%prefix, affected, "invalidated queries");
        affected
    }

    /// Returns the cached value for `key`, fresh or stale.
    pub fn get_query_data<T: Clone + 'static>(&self, key: &QueryKey) -> Option<T> {
        let state = self.inner.lock();
        state
            .entries
            .get(key)
            .and_then(|entry| (*entry.value).downcast_ref::<T>().cloned())
    }

    /// Stores `value` under `key` as a fresh result.
    pub fn set_query_data<T: Send + Sync + 'static>(&self, key: QueryKey, value: T) {
        let mut state = self.inner.lock();
        state.entries.insert(
            key,
            Entry {
                value: Arc::new(value),
                updated_at: Instant::now(),
                invalidated: false,
            },
        );
    }

    /// Replaces the cached `T` under every key starting with `prefix` with
    /// `update(&old)`, keeping each entry's age. Entries of other types are
    /// left alone. Returns the number of entries changed.
    pub fn update_query_data<T, F>(&self, prefix: &QueryKey, mut update: F) -> usize
    where
        T: Send + Sync + 'static,
        F: FnMut(&T) -> T,
    {
        let mut state = self.inner.lock();
        let mut changed = 0;
        for (key, entry) in state.entries.iter_mut() {
            if !key.starts_with(prefix) {
                continue;
            }
            if let Some(old) = (*entry.value).downcast_ref::<T>() {
                entry.value = Arc::new(update(old));
                changed += 1;
            }
        }
        changed
    }

    /// Forgets `key`. A request running for it finishes without writing back.
    pub fn remove(&self, key: &QueryKey) {
        let mut state = self.inner.lock();
        state.entries.remove(key);
        state.in_flight.remove(key);
        state.invalidated_in_flight.remove(key);
    }

    /// Forgets everything, e.g. on logout.
    pub fn clear(&self) {
        let mut state = self.inner.lock();
        state.entries.clear();
        state.in_flight.clear();
        state.invalidated_in_flight.clear();
    }

    /// True while a request for `key` is running.
    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.inner.lock().in_flight.contains_key(key)
    }

    /// True if `key` has a cached value that is not stale under `options`.
    pub fn is_fresh(&self, key: &QueryKey, options: &QueryOptions) -> bool {
        let state = self.inner.lock();
        state
            .entries
            .get(key)
            .is_some_and(|e| e.is_fresh(Instant::now(), options))
    }

    /// Number of network requests started since creation (retries not counted).
    pub fn requests_started(&self) -> u64 {
        self.inner.lock().requests_started
    }
}

async fn run_with_retry<T, F, Fut>(
    fetcher: &F,
    policy: RetryPolicy,
    key: &QueryKey,
) -> Result<T, VetdeskError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, VetdeskError>>,
{
    let mut attempt = 0;
    loop {
        match fetcher().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.retries() && e.is_transient() => {
                attempt += 1;
                warn!(%key, attempt, error = %e, "transient query failure, will retry");
                tokio::time::sleep(policy.delay()).await;
            }
            Err(e) => return Err(e),
        }
    }
}
