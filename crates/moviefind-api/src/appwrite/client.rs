//! `AppwriteClient` - Appwrite Databases REST client.

use anyhow::{Context, Result, bail};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::instrument;
use url::Url;

use super::api::MetricsApi;
use super::types::{
    AppwriteErrorResponse, COUNT_ATTR, DocumentList, NewSearchMetric, Query, SEARCH_TERM_ATTR,
    TrendingMovie,
};
use crate::tmdb::TmdbMovie;

/// Default Appwrite Cloud endpoint.
const DEFAULT_ENDPOINT: &str = "https://cloud.appwrite.io/v1/";

/// Document ID placeholder that asks the server to generate one.
const UNIQUE_ID: &str = "unique()";

/// Appwrite document store client bound to one collection.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct AppwriteClient {
    /// HTTP client.
    http_client: Client,
    /// API endpoint (ends with `/v1/`).
    endpoint: Url,
    /// Project ID sent as `X-Appwrite-Project`.
    project_id: String,
    /// Optional server API key sent as `X-Appwrite-Key`.
    api_key: Option<String>,
    /// Database ID.
    database_id: String,
    /// Collection ID holding the search metrics.
    collection_id: String,
}

/// Builder for `AppwriteClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct AppwriteClientBuilder {
    endpoint: Option<Url>,
    project_id: Option<String>,
    api_key: Option<String>,
    database_id: Option<String>,
    collection_id: Option<String>,
    user_agent: Option<String>,
}

/// Returns `Some(value)` only for non-blank strings.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl AppwriteClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            endpoint: None,
            project_id: None,
            api_key: None,
            database_id: None,
            collection_id: None,
            user_agent: None,
        }
    }

    /// Overrides the endpoint (self-hosted servers, wiremock in tests).
    #[must_use]
    pub fn endpoint(mut self, url: Url) -> Self {
        self.endpoint = Some(url);
        self
    }

    /// Sets the project ID (required).
    #[must_use]
    pub fn project_id(mut self, id: impl Into<String>) -> Self {
        self.project_id = Some(id.into());
        self
    }

    /// Sets the server API key (optional; public collections work without it).
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the database ID (required).
    #[must_use]
    pub fn database_id(mut self, id: impl Into<String>) -> Self {
        self.database_id = Some(id.into());
        self
    }

    /// Sets the collection ID (required).
    #[must_use]
    pub fn collection_id(mut self, id: impl Into<String>) -> Self {
        self.collection_id = Some(id.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `project_id`, `database_id`, `collection_id` or `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<AppwriteClient> {
        let project_id = non_blank(self.project_id).context("project_id is required")?;
        let database_id = non_blank(self.database_id).context("database_id is required")?;
        let collection_id = non_blank(self.collection_id).context("collection_id is required")?;
        let user_agent = self.user_agent.context("user_agent is required")?;

        let endpoint = match self.endpoint {
            Some(url) => with_trailing_slash(url),
            None => Url::parse(DEFAULT_ENDPOINT).context("invalid default endpoint")?,
        };

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(AppwriteClient {
            http_client,
            endpoint,
            project_id,
            api_key: non_blank(self.api_key),
            database_id,
            collection_id,
        })
    }
}

/// Appends `/` to the endpoint path so `Url::join` keeps its last segment
/// (`https://host/v1` would otherwise join to `https://host/databases/...`).
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

impl AppwriteClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> AppwriteClientBuilder {
        AppwriteClientBuilder::new()
    }

    /// Returns the documents URL of the configured collection.
    fn documents_url(&self, document_id: Option<&str>) -> Result<Url> {
        let mut path = format!(
            "databases/{}/collections/{}/documents",
            self.database_id, self.collection_id
        );
        if let Some(id) = document_id {
            path.push('/');
            path.push_str(id);
        }
        self.endpoint
            .join(&path)
            .with_context(|| format!("failed to join URL path: {path}"))
    }

    /// Adds project/key headers, sends the request and decodes the JSON body.
    #[instrument(skip_all, fields(op = op))]
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, op: &str) -> Result<T> {
        let mut request = request.header("X-Appwrite-Project", &self.project_id);
        if let Some(ref key) = self.api_key {
            request = request.header("X-Appwrite-Key", key);
        }
        let request = request
            .build()
            .with_context(|| format!("failed to build request: {op}"))?;

        tracing::debug!(method = %request.method(), url = %request.url(), "Appwrite API request");

        let response = self
            .http_client
            .execute(request)
            .await
            .with_context(|| format!("request failed: {op}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read response body: {op}"))?;

        if !status.is_success() {
            if let Ok(error_response) = serde_json::from_str::<AppwriteErrorResponse>(&body) {
                bail!(
                    "Appwrite API error (HTTP {}): type={}, message={}",
                    status,
                    error_response.kind,
                    error_response.message,
                );
            }
            bail!("Appwrite API error (HTTP {status}): {body}");
        }

        serde_json::from_str(&body).with_context(|| format!("failed to decode JSON response: {op}"))
    }

    /// Lists documents matching `queries`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    pub async fn list_documents(&self, queries: &[Query]) -> Result<DocumentList<TrendingMovie>> {
        let url = self.documents_url(None)?;
        let params: Vec<(&str, String)> = queries
            .iter()
            .map(|q| ("queries[]", q.to_param()))
            .collect();
        let request = self.http_client.get(url).query(&params);
        self.send(request, "list documents").await
    }

    /// Creates a new metrics document with a server-generated ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    pub async fn create_document(&self, data: &NewSearchMetric) -> Result<TrendingMovie> {
        let url = self.documents_url(None)?;
        let body = json!({ "documentId": UNIQUE_ID, "data": data });
        let request = self.http_client.post(url).json(&body);
        self.send(request, "create document").await
    }

    /// Overwrites the counter of an existing document.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    pub async fn update_count(&self, document_id: &str, count: u64) -> Result<TrendingMovie> {
        let url = self.documents_url(Some(document_id))?;
        let body = json!({ "data": { COUNT_ATTR: count } });
        let request = self.http_client.patch(url).json(&body);
        self.send(request, "update document").await
    }
}

impl MetricsApi for AppwriteClient {
    #[instrument(skip_all, fields(limit = limit))]
    async fn trending_movies(&self, limit: u32) -> Result<Vec<TrendingMovie>> {
        let list = self
            .list_documents(&[Query::Limit(limit), Query::OrderDesc(COUNT_ATTR)])
            .await
            .context("failed to list trending documents")?;
        Ok(list.documents)
    }

    #[instrument(skip_all, fields(search_term = search_term))]
    async fn update_search_count(&self, search_term: &str, top_result: &TmdbMovie) -> Result<()> {
        let existing = self
            .list_documents(&[
                Query::Equal(SEARCH_TERM_ATTR, String::from(search_term)),
                Query::Limit(1),
            ])
            .await
            .context("failed to look up search term")?;

        if let Some(doc) = existing.documents.into_iter().next() {
            let count = doc.count.saturating_add(1);
            self.update_count(&doc.id, count)
                .await
                .with_context(|| format!("failed to increment count of {}", doc.id))?;
            tracing::debug!(document_id = %doc.id, count, "search count incremented");
        } else {
            let data = NewSearchMetric::from_top_result(search_term, top_result);
            let created = self
                .create_document(&data)
                .await
                .context("failed to create search metric")?;
            tracing::debug!(document_id = %created.id, "search metric created");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const DOCUMENTS_PATH: &str = "/v1/databases/moviefind/collections/metrics/documents";

    fn client_for(mock_server: &MockServer) -> AppwriteClient {
        let endpoint = format!("{}/v1/", mock_server.uri());
        AppwriteClient::builder()
            .endpoint(endpoint.parse().unwrap())
            .project_id("project-1")
            .database_id("moviefind")
            .collection_id("metrics")
            .user_agent("test/0.0.0")
            .build()
            .unwrap()
    }

    fn dune() -> TmdbMovie {
        TmdbMovie {
            id: 438_631,
            title: String::from("Dune"),
            poster_path: Some(String::from("/d5NXSklXo0qyIYkgV94XAgMIckC.jpg")),
            vote_average: 7.8,
            original_language: String::from("en"),
            release_date: Some(String::from("2021-09-15")),
            overview: None,
        }
    }

    fn document(id: &str, term: &str, count: u64) -> serde_json::Value {
        json!({
            "$id": id,
            "searchTerm": term,
            "count": count,
            "movie_id": 438_631,
            "poster_url": "https://image.tmdb.org/t/p/w500/d5NXSklXo0qyIYkgV94XAgMIckC.jpg",
            "title": "Dune"
        })
    }

    #[test]
    fn test_builder_requires_project_id() {
        // Arrange & Act
        let result = AppwriteClient::builder()
            .database_id("db")
            .collection_id("coll")
            .user_agent("test/0.0.0")
            .build();

        // Assert
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("project_id is required")
        );
    }

    #[test]
    fn test_builder_requires_collection_id() {
        // Arrange & Act
        let result = AppwriteClient::builder()
            .project_id("p")
            .database_id("db")
            .collection_id("")
            .user_agent("test/0.0.0")
            .build();

        // Assert
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("collection_id is required")
        );
    }

    #[test]
    fn test_documents_url() {
        // Arrange
        let client = AppwriteClient::builder()
            .project_id("p")
            .database_id("db")
            .collection_id("coll")
            .user_agent("test/0.0.0")
            .build()
            .unwrap();

        // Act
        let list_url = client.documents_url(None).unwrap();
        let doc_url = client.documents_url(Some("abc")).unwrap();

        // Assert
        assert_eq!(
            list_url.as_str(),
            "https://cloud.appwrite.io/v1/databases/db/collections/coll/documents"
        );
        assert_eq!(
            doc_url.as_str(),
            "https://cloud.appwrite.io/v1/databases/db/collections/coll/documents/abc"
        );
    }

    #[test]
    fn test_documents_url_endpoint_without_trailing_slash() {
        // Arrange
        let client = AppwriteClient::builder()
            .endpoint(Url::parse("https://cloud.appwrite.io/v1").unwrap())
            .project_id("p")
            .database_id("db")
            .collection_id("coll")
            .user_agent("test/0.0.0")
            .build()
            .unwrap();

        // Act
        let list_url = client.documents_url(None).unwrap();

        // Assert
        assert_eq!(
            list_url.as_str(),
            "https://cloud.appwrite.io/v1/databases/db/collections/coll/documents"
        );
    }

    #[tokio::test]
    async fn test_trending_movies_orders_by_count() {
        // Arrange
        let mock_server = MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/appwrite/trending_documents.json");

        Mock::given(method("GET"))
            .and(path(DOCUMENTS_PATH))
            .and(header("X-Appwrite-Project", "project-1"))
            .and(query_param("queries[]", Query::OrderDesc(COUNT_ATTR).to_param()))
            .and(query_param("queries[]", Query::Limit(5).to_param()))
            .respond_with(ResponseTemplate::new(200).set_body_string(json_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let trending = client.trending_movies(5).await.unwrap();

        // Assert
        assert_eq!(trending.len(), 3);
        assert_eq!(trending[0].title, "Dune");
        assert_eq!(trending[2].title, "");
    }

    #[tokio::test]
    async fn test_api_key_header_is_sent_when_set() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(header("X-Appwrite-Key", "secret-key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "total": 0, "documents": [] })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let endpoint = format!("{}/v1/", mock_server.uri());
        let client = AppwriteClient::builder()
            .endpoint(endpoint.parse().unwrap())
            .project_id("project-1")
            .api_key("secret-key")
            .database_id("moviefind")
            .collection_id("metrics")
            .user_agent("test/0.0.0")
            .build()
            .unwrap();

        // Act
        let trending = client.trending_movies(5).await.unwrap();

        // Assert
        assert!(trending.is_empty());
    }

    #[tokio::test]
    async fn test_update_search_count_increments_existing() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(DOCUMENTS_PATH))
            .and(query_param(
                "queries[]",
                Query::Equal(SEARCH_TERM_ATTR, String::from("dune")).to_param(),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 1,
                "documents": [document("doc-1", "dune", 12)]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("PATCH"))
            .and(path(format!("{DOCUMENTS_PATH}/doc-1")))
            .and(body_json(json!({ "data": { "count": 13 } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(document("doc-1", "dune", 13)))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act & Assert (mock expectations verify PATCH-only write)
        client.update_search_count("dune", &dune()).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_search_count_creates_missing() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(DOCUMENTS_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "total": 0, "documents": [] })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path(DOCUMENTS_PATH))
            .and(body_json(json!({
                "documentId": "unique()",
                "data": {
                    "searchTerm": "dune",
                    "count": 1,
                    "movie_id": 438_631,
                    "poster_url": "https://image.tmdb.org/t/p/w500/d5NXSklXo0qyIYkgV94XAgMIckC.jpg",
                    "title": "Dune"
                }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(document("new-1", "dune", 1)))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act & Assert (mock expectations verify POST-only write)
        client.update_search_count("dune", &dune()).await.unwrap();
    }

    #[tokio::test]
    async fn test_http_error_returns_appwrite_error() {
        // Arrange
        let mock_server = MockServer::start().await;
        let error_body = r#"{"message":"The current user is not authorized to perform the requested action.","code":401,"type":"user_unauthorized","version":"1.6.0"}"#;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string(error_body))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let result = client.trending_movies(5).await;

        // Assert
        let err = format!("{:#}", result.unwrap_err());
        assert!(err.contains("Appwrite API error"));
        assert!(err.contains("user_unauthorized"));
    }
}
