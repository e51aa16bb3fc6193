//! Batch fetch coordination.
//!
//! The coordinator checks every request of a batch against the cache before
//! any query is polled, fires all missing queries together, waits for all of
//! them, and commits the results only if every one succeeded.

use std::collections::HashSet;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, instrument, trace, warn};

use sitecache_shared::Result;

use crate::key::CacheKey;
use crate::request::ContentBatch;
use crate::store::ContentCache;

// ---------------------------------------------------------------------------
// BatchReport
// ---------------------------------------------------------------------------

/// Diagnostics for one [`BatchFetchCoordinator::cache_content`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// Entries newly written by this batch.
    pub items_cached: usize,
    /// Cache size after the batch.
    pub total_cache_size: usize,
    /// Wall-clock time for the whole batch.
    pub milliseconds_to_complete: u64,
    /// True when no fetch was needed at all.
    pub previously_cached: bool,
}

// ---------------------------------------------------------------------------
// BatchFetchCoordinator
// ---------------------------------------------------------------------------

/// Fetches the uncached members of a [`ContentBatch`] into a [`ContentCache`].
#[derive(Debug, Clone)]
pub struct BatchFetchCoordinator {
    cache: ContentCache,
    /// Log reports at info instead of debug.
    verbose: bool,
}

impl BatchFetchCoordinator {
    pub fn new(cache: ContentCache) -> Self {
        Self {
            cache,
            verbose: false,
        }
    }

    /// Log every batch report at info level.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    /// Fetch whatever part of `batch` is not cached yet and commit it.
    ///
    /// 1. Validate every request; a malformed one fails the batch before
    ///    any query is invoked.
    /// 2. Split requests into cache hits and fetches. A hash repeated
    ///    within the batch is fetched once.
    /// 3. Run all fetches concurrently and wait for every one to finish.
    /// 4. On success, commit results under their request's hash in
    ///    submission order. On any failure, commit nothing and return the
    ///    first error in submission order.
    #[instrument(skip_all, fields(requests = batch.len()))]
    pub async fn cache_content(&self, batch: &ContentBatch) -> Result<BatchReport> {
        let start = Instant::now();

        for request in batch.iter() {
            request.validate()?;
        }

        let mut names: Vec<&str> = Vec::new();
        let mut hashes: Vec<CacheKey> = Vec::new();
        let mut pending = Vec::new();
        let mut planned: HashSet<&CacheKey> = HashSet::new();

        for request in batch.iter() {
            if self.cache.has(request.hash()).await {
                trace!(name = request.name(), hash = %request.hash(), "cache hit");
                continue;
            }
            if !planned.insert(request.hash()) {
                trace!(name = request.name(), hash = %request.hash(), "already scheduled in batch");
                continue;
            }
            names.push(request.name());
            hashes.push(request.hash().clone());
            pending.push(request.invoke());
        }

        if pending.is_empty() {
            let report = BatchReport {
                items_cached: 0,
                total_cache_size: self.cache.len().await,
                milliseconds_to_complete: elapsed_ms(start),
                previously_cached: true,
            };
            self.log_report(&report);
            return Ok(report);
        }

        debug!(fetches = pending.len(), "fetching uncached content");
        let results = futures::future::join_all(pending).await;

        let mut fetched = Vec::with_capacity(results.len());
        for ((name, hash), result) in names.iter().zip(hashes).zip(results) {
            match result {
                Ok(payload) => fetched.push((hash, payload)),
                Err(e) => {
                    warn!(name, %hash, error = %e, "content fetch failed, batch not committed");
                    return Err(e);
                }
            }
        }

        let items_cached = fetched.len();
        let total_cache_size = self.cache.set_many(fetched).await;

        let report = BatchReport {
            items_cached,
            total_cache_size,
            milliseconds_to_complete: elapsed_ms(start),
            previously_cached: false,
        };
        self.log_report(&report);
        Ok(report)
    }

    fn log_report(&self, report: &BatchReport) {
        if self.verbose {
            info!(
                items_cached = report.items_cached,
                total_cache_size = report.total_cache_size,
                ms = report.milliseconds_to_complete,
                previously_cached = report.previously_cached,
                "batch complete"
            );
        } else {
            debug!(
                items_cached = report.items_cached,
                total_cache_size = report.total_cache_size,
                ms = report.milliseconds_to_complete,
                previously_cached = report.previously_cached,
                "batch complete"
            );
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
