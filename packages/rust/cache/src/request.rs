//! Typed content requests and named batches.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use sitecache_shared::{Result, SiteError};

use crate::key::CacheKey;
use crate::store::ContentCache;

/// Pending result of a content query.
pub type QueryFuture = BoxFuture<'static, Result<Value>>;

/// A content query: takes the request's params, yields the payload.
pub type QueryFn = Arc<dyn Fn(Value) -> QueryFuture + Send + Sync>;

// ---------------------------------------------------------------------------
// ContentRequest
// ---------------------------------------------------------------------------

/// A named unit of fetch work submitted to a
/// [`BatchFetchCoordinator`](crate::BatchFetchCoordinator).
///
/// The query function is a required constructor argument. The hash is
/// checked by [`ContentRequest::validate`], which the coordinator runs over
/// the whole batch before any query is invoked.
#[derive(Clone)]
pub struct ContentRequest {
    name: String,
    hash: CacheKey,
    query: QueryFn,
    params: Value,
}

impl ContentRequest {
    pub fn new<F, Fut>(name: impl Into<String>, hash: impl Into<CacheKey>, query: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        let query: QueryFn = Arc::new(move |params| -> QueryFuture { Box::pin(query(params)) });
        Self {
            name: name.into(),
            hash: hash.into(),
            query,
            params: Value::Object(serde_json::Map::new()),
        }
    }

    /// Arguments passed to the query function. Defaults to `{}`.
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hash(&self) -> &CacheKey {
        &self.hash
    }

    pub fn params(&self) -> &Value {
        &self.params
    }

    /// Reject requests that cannot be fetched or cached.
    pub fn validate(&self) -> Result<()> {
        if self.hash.is_empty() {
            return Err(SiteError::malformed(&self.name, "hash must be specified"));
        }
        if !self.params.is_object() {
            return Err(SiteError::malformed(&self.name, "params must be an object"));
        }
        Ok(())
    }

    /// Start the query. The returned future does nothing until polled.
    pub(crate) fn invoke(&self) -> QueryFuture {
        (self.query)(self.params.clone())
    }
}

impl std::fmt::Debug for ContentRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentRequest")
            .field("name", &self.name)
            .field("hash", &self.hash)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// ContentBatch
// ---------------------------------------------------------------------------

/// Requests keyed by name, in submission order.
///
/// Inserting a request under an existing name replaces it in place.
#[derive(Debug, Clone, Default)]
pub struct ContentBatch {
    requests: Vec<ContentRequest>,
}

impl ContentBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, request: ContentRequest) -> &mut Self {
        match self.requests.iter_mut().find(|r| r.name == request.name) {
            Some(existing) => *existing = request,
            None => self.requests.push(request),
        }
        self
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, request: ContentRequest) -> Self {
        self.insert(request);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ContentRequest> {
        self.requests.iter().find(|r| r.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContentRequest> {
        self.requests.iter()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Read the cached payload for the request registered as `name`.
    ///
    /// `None` when no such request exists or it has not been cached yet.
    pub async fn cached(&self, cache: &ContentCache, name: &str) -> Option<Arc<Value>> {
        let request = self.get(name)?;
        cache.get(request.hash()).await
    }
}

impl FromIterator<ContentRequest> for ContentBatch {
    fn from_iter<I: IntoIterator<Item = ContentRequest>>(iter: I) -> Self {
        let mut batch = Self::new();
        for request in iter {
            batch.insert(request);
        }
        batch
    }
}
