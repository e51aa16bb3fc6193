//! Typed content fetches on top of [`ContentClient`].
//!
//! Errors are never swallowed into empty lists: a failed fetch is an error,
//! and only a successful response with no matching records is empty.

use serde_json::{Value, json};
use tracing::{debug, instrument};

use sitecache_cache::{CacheKey, ContentRequest};
use sitecache_shared::{ContentExport, ContentRecord, Result, SiteError};

use crate::client::ContentClient;
use crate::queries::{self, Query};

/// Site-level access to the content API.
#[derive(Debug, Clone)]
pub struct ContentService {
    client: ContentClient,
}

impl ContentService {
    pub fn new(client: ContentClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ContentClient {
        &self.client
    }

    /// Render and run `query`, returning its collection.
    pub async fn fetch(&self, query: &Query, params: &Value) -> Result<Value> {
        run(&self.client, query, params).await
    }

    /// Build a cacheable request for `query`.
    ///
    /// The cache key hashes the query template together with `params`, so
    /// two requests for the same logical content share one cache entry
    /// whatever their names.
    pub fn request(
        &self,
        name: impl Into<String>,
        query: &'static Query,
        params: Value,
    ) -> ContentRequest {
        let hash = CacheKey::for_query(query.template, &params);
        let client = self.client.clone();
        ContentRequest::new(name, hash, move |params| {
            let client = client.clone();
            async move { run(&client, query, &params).await }
        })
        .with_params(params)
    }

    // ------------------------------------------------------------------
    // Typed shortcuts
    // ------------------------------------------------------------------

    /// Pages with `slug`; usually zero or one.
    pub async fn page(&self, slug: &str) -> Result<Vec<ContentRecord>> {
        self.records(&queries::PAGE, json!({ "slug": slug })).await
    }

    /// The `limit` most recent news posts.
    pub async fn front_page_news(&self, limit: u32) -> Result<Vec<ContentRecord>> {
        self.records(&queries::FRONT_PAGE_NEWS, json!({ "limit": limit })).await
    }

    pub async fn all_news(&self) -> Result<Vec<ContentRecord>> {
        self.records(&queries::ALL_NEWS, json!({})).await
    }

    pub async fn all_sections(&self) -> Result<Vec<ContentRecord>> {
        self.records(&queries::ALL_SECTIONS, json!({})).await
    }

    pub async fn all_biographies(&self) -> Result<Vec<ContentRecord>> {
        self.records(&queries::ALL_BIOGRAPHIES, json!({})).await
    }

    pub async fn all_meetings(&self) -> Result<Vec<ContentRecord>> {
        self.records(&queries::ALL_MEETINGS, json!({})).await
    }

    /// Meetings whose raw category code is `category`.
    pub async fn meetings_by_category(&self, category: &str) -> Result<Vec<ContentRecord>> {
        self.records(&queries::MEETINGS_BY_CATEGORY, json!({ "category": category }))
            .await
    }

    pub async fn all_publications(&self) -> Result<Vec<ContentRecord>> {
        self.records(&queries::ALL_PUBLICATIONS, json!({})).await
    }

    /// Publications whose raw category code is `category`.
    pub async fn publications_by_category(&self, category: &str) -> Result<Vec<ContentRecord>> {
        self.records(&queries::PUBLICATIONS_BY_CATEGORY, json!({ "category": category }))
            .await
    }

    async fn records(&self, query: &Query, params: Value) -> Result<Vec<ContentRecord>> {
        let data = self.fetch(query, &params).await?;
        serde_json::from_value(data)
            .map_err(|e| SiteError::parse(format!("{}: unexpected record shape: {e}", query.name)))
    }

    // ------------------------------------------------------------------
    // Exports
    // ------------------------------------------------------------------

    /// Fetch the multi-type export the search index is built from.
    #[instrument(skip_all)]
    pub async fn search_export(&self) -> Result<ContentExport> {
        self.export(&queries::SEARCH_EXPORT).await
    }

    /// Fetch the slugs and categories the route list is built from.
    #[instrument(skip_all)]
    pub async fn route_export(&self) -> Result<ContentExport> {
        self.export(&queries::ROUTE_EXPORT).await
    }

    async fn export(&self, query: &Query) -> Result<ContentExport> {
        let data = self.fetch(query, &Value::Object(Default::default())).await?;
        let export: ContentExport = serde_json::from_value(data)
            .map_err(|e| SiteError::parse(format!("{}: unexpected export shape: {e}", query.name)))?;
        debug!(query = query.name, records = export.len(), "export fetched");
        Ok(export)
    }
}

async fn run(client: &ContentClient, query: &Query, params: &Value) -> Result<Value> {
    let text = query.render(params)?;
    let mut data = client.query(&text).await?;

    let Some(collection) = query.collection else {
        return Ok(data);
    };

    match data.get_mut(collection).map(Value::take) {
        Some(Value::Null) | None => Err(SiteError::parse(format!(
            "{}: response has no '{collection}' field",
            query.name
        ))),
        Some(value) => Ok(value),
    }
}
