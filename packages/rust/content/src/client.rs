//! GraphQL-over-HTTP client for the content API.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use sitecache_shared::{ApiConfig, Result, SiteError};

/// User-Agent string for content API requests.
const USER_AGENT: &str = concat!("sitecache/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

/// Thin client posting GraphQL queries to `{base_url}/graphql`.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ContentClient {
    client: Client,
    endpoint: Url,
}

impl ContentClient {
    /// Create a client from the `[api]` configuration.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SiteError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: graphql_endpoint(&config.base_url)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Run `query` and return the response's `data` object.
    ///
    /// Transport failures and non-2xx statuses are [`SiteError::Network`];
    /// a GraphQL `errors` array is [`SiteError::Api`].
    #[instrument(skip_all, fields(endpoint = %self.endpoint))]
    pub async fn query(&self, query: &str) -> Result<Value> {
        debug!(bytes = query.len(), "posting query");

        let response = self
            .client
            .post(self.endpoint.as_str())
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await
            .map_err(|e| SiteError::Network(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SiteError::Network(format!(
                "{}: HTTP {status}",
                self.endpoint
            )));
        }

        let body: GraphQlResponse = response
            .json()
            .await
            .map_err(|e| SiteError::parse(format!("{}: invalid response body: {e}", self.endpoint)))?;

        if !body.errors.is_empty() {
            let messages: Vec<String> = body.errors.into_iter().map(|e| e.message).collect();
            return Err(SiteError::Api(messages.join("; ")));
        }

        body.data
            .ok_or_else(|| SiteError::parse(format!("{}: response has no data", self.endpoint)))
    }
}

/// `{base_url}/graphql`, keeping any path prefix on the base URL.
fn graphql_endpoint(base_url: &Url) -> Result<Url> {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("graphql")
        .map_err(|e| SiteError::config(format!("invalid api.base_url '{base_url}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> ApiConfig {
        ApiConfig {
            base_url: Url::parse(&server.uri()).unwrap(),
            ..ApiConfig::default()
        }
    }

    #[test]
    fn endpoint_appends_graphql() {
        let url = Url::parse("https://content.example.org").unwrap();
        assert_eq!(
            graphql_endpoint(&url).unwrap().as_str(),
            "https://content.example.org/graphql"
        );

        let prefixed = Url::parse("https://example.org/cms").unwrap();
        assert_eq!(
            graphql_endpoint(&prefixed).unwrap().as_str(),
            "https://example.org/cms/graphql"
        );
    }

    #[tokio::test]
    async fn query_returns_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(serde_json::json!({ "query": "{ tags { slug } }" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "tags": [{ "slug": "people" }] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ContentClient::new(&config_for(&server)).unwrap();
        let data = client.query("{ tags { slug } }").await.unwrap();
        assert_eq!(data["tags"][0]["slug"], "people");
    }

    #[tokio::test]
    async fn graphql_errors_are_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": null,
                "errors": [{ "message": "Cannot query field \"bogus\"" }]
            })))
            .mount(&server)
            .await;

        let client = ContentClient::new(&config_for(&server)).unwrap();
        let err = client.query("{ bogus }").await.unwrap_err();
        assert!(matches!(err, SiteError::Api(ref msg) if msg.contains("bogus")));
    }

    #[tokio::test]
    async fn http_failure_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = ContentClient::new(&config_for(&server)).unwrap();
        let err = client.query("{ tags { slug } }").await.unwrap_err();
        assert!(matches!(err, SiteError::Network(ref msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn missing_data_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = ContentClient::new(&config_for(&server)).unwrap();
        let err = client.query("{ tags { slug } }").await.unwrap_err();
        assert!(matches!(err, SiteError::Parse { .. }));
    }
}
