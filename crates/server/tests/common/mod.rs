//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! with mock catalog and search engines injected, and SQLite stores in a
//! temporary directory.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use mediamatch_core::{
    blacklist::SqliteBlacklist,
    cache::SqliteResultCache,
    keyword::{KeywordConfig, KeywordInference},
    resolver::{MatchingConfig, Resolver},
    testing::{MockCatalog, MockSearchEngine},
    BlacklistStore, Config, ResultCache,
};

/// Re-export fixtures for test convenience
pub use mediamatch_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_resolve() {
///     let fixture = TestFixture::new().await;
///     fixture.catalog.add_entry(fixtures::movie(27205, "Inception", 2010)).await;
///
///     let response = fixture.post("/api/v1/resolve", json!({
///         "title": "Inception.2010.1080p.mkv"
///     })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock catalog - configure entries and failures
    pub catalog: Arc<MockCatalog>,
    /// Mock search engine behind keyword inference
    pub search_engine: Arc<MockSearchEngine>,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with a configured catalog.
    pub async fn new() -> Self {
        Self::build(true).await
    }

    /// Create a fixture whose catalog is not configured.
    pub async fn without_catalog() -> Self {
        Self::build(false).await
    }

    async fn build(with_catalog: bool) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let mut config = Config::default();
        config.database.path = db_path.clone();
        config.tmdb.api_key = "test-key".to_string();

        let cache: Arc<dyn ResultCache> = Arc::new(
            SqliteResultCache::new(&db_path).expect("Failed to create result cache"),
        );
        let blacklist: Arc<dyn BlacklistStore> =
            Arc::new(SqliteBlacklist::new(&db_path).expect("Failed to create blacklist"));

        let catalog = Arc::new(MockCatalog::new());
        let search_engine = Arc::new(MockSearchEngine::new("mock"));
        let keywords = Arc::new(
            KeywordInference::new(KeywordConfig::default())
                .with_engine(Arc::clone(&search_engine) as _),
        );

        let resolver = with_catalog.then(|| {
            Arc::new(Resolver::new(
                Arc::clone(&catalog) as _,
                cache,
                Arc::clone(&blacklist),
                MatchingConfig::default(),
            ))
        });

        let state = Arc::new(mediamatch_server::state::AppState::new(
            config, resolver, keywords, blacklist,
        ));
        let router = mediamatch_server::api::create_router(state);

        Self {
            router,
            catalog,
            search_engine,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
