//! Build workflows: fetch through the cache, then derive artifacts.
//!
//! Every fetch goes through a [`BatchFetchCoordinator`] on the state's
//! cache, so repeating a build within one process costs no API calls.
//!
//! [`BatchFetchCoordinator`]: sitecache_cache::BatchFetchCoordinator

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use sitecache_cache::{BatchReport, ContentBatch};
use sitecache_content::{ContentService, Query, queries};
use sitecache_shared::{ContentExport, ContentType, Result, SiteError};

use crate::routes::build_routes;
use crate::search_index::SearchIndexItem;
use crate::state::SiteState;

/// Output of a build plus how the cache served it.
#[derive(Debug)]
pub struct BuildResult<T> {
    pub output: T,
    pub report: BatchReport,
    pub elapsed: Duration,
}

/// Progress callback for reporting build status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each batch has been committed to the cache.
    fn batch_done(&self, report: &BatchReport);
    /// Called when the build completes with `items` artifacts.
    fn done(&self, items: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn batch_done(&self, _report: &BatchReport) {}
    fn done(&self, _items: usize) {}
}

/// The list query backing `fetch` for a content type, if it has one.
///
/// Pages and tags are only ever fetched by slug.
pub fn list_query(content_type: ContentType) -> Option<&'static Query> {
    match content_type {
        ContentType::News => Some(&queries::ALL_NEWS),
        ContentType::Section => Some(&queries::ALL_SECTIONS),
        ContentType::Meeting => Some(&queries::ALL_MEETINGS),
        ContentType::Biography => Some(&queries::ALL_BIOGRAPHIES),
        ContentType::Publication => Some(&queries::ALL_PUBLICATIONS),
        ContentType::Page | ContentType::Tag => None,
    }
}

/// Fetch the list collections for `kinds` as one batch.
#[instrument(skip_all, fields(kinds = kinds.len()))]
pub async fn prefetch(
    state: &SiteState,
    service: &ContentService,
    kinds: &[ContentType],
    progress: &dyn ProgressReporter,
) -> Result<BatchReport> {
    let mut batch = ContentBatch::new();
    for &kind in kinds {
        let query = list_query(kind).ok_or_else(|| {
            SiteError::validation(format!("'{kind}' has no list query; fetch it by slug"))
        })?;
        batch.insert(service.request(kind.collection(), query, json!({})));
    }

    progress.phase("Fetching collections");
    let report = state.coordinator().cache_content(&batch).await?;
    progress.batch_done(&report);
    progress.done(batch.len());
    Ok(report)
}

/// Fetch the search export and assemble the search index.
///
/// The assembled index is also loaded into `state`.
#[instrument(skip_all)]
pub async fn build_search_index(
    state: &SiteState,
    service: &ContentService,
    progress: &dyn ProgressReporter,
) -> Result<BuildResult<Arc<Vec<SearchIndexItem>>>> {
    let start = Instant::now();

    progress.phase("Fetching search export");
    let (export, report) = cached_export(state, service, &queries::SEARCH_EXPORT).await?;
    progress.batch_done(&report);

    progress.phase("Assembling search index");
    let items = state.assembler().assemble(export)?;
    let items = state.load_search_index(items).await;

    let elapsed = start.elapsed();
    info!(items = items.len(), elapsed_ms = elapsed.as_millis() as u64, "search index built");
    progress.done(items.len());

    Ok(BuildResult {
        output: items,
        report,
        elapsed,
    })
}

/// Fetch the route export and enumerate the site's routes.
#[instrument(skip_all)]
pub async fn build_route_list(
    state: &SiteState,
    service: &ContentService,
    progress: &dyn ProgressReporter,
) -> Result<BuildResult<Vec<String>>> {
    let start = Instant::now();

    progress.phase("Fetching route export");
    let (export, report) = cached_export(state, service, &queries::ROUTE_EXPORT).await?;
    progress.batch_done(&report);

    progress.phase("Building routes");
    let routes = build_routes(&export, state.resolver(), &state.config().api.public_path)?;

    let elapsed = start.elapsed();
    info!(routes = routes.len(), elapsed_ms = elapsed.as_millis() as u64, "routes built");
    progress.done(routes.len());

    Ok(BuildResult {
        output: routes,
        report,
        elapsed,
    })
}

async fn cached_export(
    state: &SiteState,
    service: &ContentService,
    query: &'static Query,
) -> Result<(ContentExport, BatchReport)> {
    let batch = ContentBatch::new().with(service.request(query.name, query, json!({})));
    let report = state.coordinator().cache_content(&batch).await?;

    let payload = batch
        .cached(state.cache(), query.name)
        .await
        .ok_or_else(|| SiteError::validation(format!("{}: not in cache after fetch", query.name)))?;
    let export = ContentExport::deserialize(&*payload)
        .map_err(|e| SiteError::parse(format!("{}: unexpected export shape: {e}", query.name)))?;

    Ok((export, report))
}
