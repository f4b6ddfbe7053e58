//! # Consistency Cache
//!
//! Wraps the full registry key fetch with its freshness token.
//!
//! The caller first takes a cheap status read and passes its token as the
//! expected token. The cached list is reused only if it was fetched under
//! that same token. Otherwise the cache is dropped, the list is refetched,
//! and the token embedded in the fetched list must equal the expected one;
//! a mismatch means the registry moved between the two reads and the
//! result is rejected rather than mixed.

use crate::error::{SnapshotError, SnapshotResult};
use shared_types::FreshnessToken;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

struct CachedRead<T> {
    token: FreshnessToken,
    value: Arc<T>,
}

/// Last consistent read and the token it was taken under.
pub struct ConsistencyCache<T> {
    entry: Option<CachedRead<T>>,
}

impl<T> Default for ConsistencyCache<T> {
    fn default() -> Self {
        Self { entry: None }
    }
}

impl<T> ConsistencyCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token of the cached read, if any.
    pub fn token(&self) -> Option<FreshnessToken> {
        self.entry.as_ref().map(|entry| entry.token)
    }

    /// Return the cached value for `expected`, or fetch a fresh one.
    ///
    /// `fetch` yields the value and the token embedded in its response.
    ///
    /// # Errors
    /// * `InconsistentState` if the fetched token differs from `expected`
    /// * any error returned by `fetch`; the cache is left empty
    pub async fn get_or_fetch<F, Fut>(
        &mut self,
        expected: FreshnessToken,
        fetch: F,
    ) -> SnapshotResult<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SnapshotResult<(T, FreshnessToken)>>,
    {
        if let Some(entry) = &self.entry {
            if entry.token == expected {
                debug!(token = %expected, "Registry cache hit");
                return Ok(Arc::clone(&entry.value));
            }
        }

        self.entry = None;

        let (value, actual) = fetch().await?;
        if actual != expected {
            return Err(SnapshotError::InconsistentState { expected, actual });
        }

        let value = Arc::new(value);
        self.entry = Some(CachedRead {
            token: actual,
            value: Arc::clone(&value),
        });
        debug!(token = %actual, "Registry cache refreshed");

        Ok(value)
    }
}
