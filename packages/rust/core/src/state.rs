//! Application-scoped state shared by every build step.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;
use tracing::{info, instrument};

use sitecache_cache::{BatchFetchCoordinator, ContentCache};
use sitecache_shared::AppConfig;

use crate::category::CategoryResolver;
use crate::search_index::{SearchIndexAssembler, SearchIndexItem};

/// Owns the configuration, the content cache and the category resolver.
///
/// The cache is handed out as a cloned handle, so coordinators built from
/// one `SiteState` all write to the same store.
#[derive(Debug)]
pub struct SiteState {
    config: AppConfig,
    cache: ContentCache,
    resolver: CategoryResolver,
    ready: AtomicBool,
    search_index: RwLock<Option<Arc<Vec<SearchIndexItem>>>>,
}

impl SiteState {
    pub fn new(config: AppConfig) -> Self {
        let resolver = CategoryResolver::from_config(&config);
        Self {
            config,
            cache: ContentCache::new(),
            resolver,
            ready: AtomicBool::new(false),
            search_index: RwLock::new(None),
        }
    }

    /// Start from an empty cache and mark the state ready.
    ///
    /// Safe to call again; each call drops everything cached so far,
    /// including a loaded search index.
    #[instrument(skip_all)]
    pub async fn init(&self) {
        self.cache.clear().await;
        *self.search_index.write().await = None;
        self.ready.store(true, Ordering::Release);
        info!(debug = self.config.debug, "site state ready");
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    pub fn resolver(&self) -> &CategoryResolver {
        &self.resolver
    }

    /// A coordinator over the shared cache; verbose when `debug` is set.
    pub fn coordinator(&self) -> BatchFetchCoordinator {
        BatchFetchCoordinator::new(self.cache.clone()).verbose(self.config.debug)
    }

    pub fn assembler(&self) -> SearchIndexAssembler<'_> {
        SearchIndexAssembler::new(&self.resolver).home_slug(self.config.home_slug.clone())
    }

    /// Keep `items` as the current search index.
    pub async fn load_search_index(&self, items: Vec<SearchIndexItem>) -> Arc<Vec<SearchIndexItem>> {
        let items = Arc::new(items);
        *self.search_index.write().await = Some(Arc::clone(&items));
        items
    }

    /// The loaded search index, if any.
    pub async fn search_index(&self) -> Option<Arc<Vec<SearchIndexItem>>> {
        self.search_index.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sitecache_cache::CacheKey;
    use sitecache_shared::{ContentRecord, ContentType};

    #[tokio::test]
    async fn init_clears_cache_and_marks_ready() {
        let state = SiteState::new(AppConfig::default());
        assert!(!state.is_ready());

        state.cache().set(CacheKey::from("stale"), json!([1])).await;
        state
            .load_search_index(vec![SearchIndexItem {
                content_type: ContentType::News,
                parent_path: "/news".into(),
                record: ContentRecord::with_slug("old"),
            }])
            .await;

        state.init().await;
        assert!(state.is_ready());
        assert!(state.cache().is_empty().await);
        assert!(state.search_index().await.is_none());
    }

    #[tokio::test]
    async fn coordinators_share_the_cache() {
        let state = SiteState::new(AppConfig::default());
        state.init().await;

        state
            .coordinator()
            .cache()
            .set(CacheKey::from("k"), json!({ "v": 1 }))
            .await;
        assert!(state.cache().has(&CacheKey::from("k")).await);
        assert!(state.coordinator().cache().has(&CacheKey::from("k")).await);
    }

    #[test]
    fn assembler_uses_configured_home_slug() {
        let config = AppConfig {
            home_slug: "welcome".into(),
            ..AppConfig::default()
        };
        let state = SiteState::new(config);
        let path = state
            .assembler()
            .parent_path(ContentType::Page, &ContentRecord::with_slug("welcome"))
            .unwrap();
        assert_eq!(path, "/");
    }
}
