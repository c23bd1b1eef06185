//! API tests against an in-process router with a mock catalog.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{fixtures, TestFixture};
use mediamatch_core::keyword::SearchPage;

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["resolver"], true);
}

#[tokio::test]
async fn test_config_is_sanitized() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/config").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["tmdb"]["api_key_configured"], true);
    assert!(response.body["tmdb"].get("api_key").is_none());
    assert_eq!(response.body["matching"]["mode"], "normal");
}

#[tokio::test]
async fn test_resolve_movie() {
    let fixture = TestFixture::new().await;
    fixture
        .catalog
        .add_entry(fixtures::movie(27205, "Inception", 2010))
        .await;

    let response = fixture
        .post(
            "/api/v1/resolve",
            json!({ "title": "Inception.2010.1080p.BluRay.x264.mkv" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["entry"]["id"], 27205);
    assert_eq!(response.body["media_type"], "movie");
    assert_eq!(response.body["source"], "direct");
    assert_eq!(response.body["from_cache"], false);
    assert_eq!(response.body["query"]["name"], "Inception");
    assert_eq!(response.body["query"]["year"], 2010);
}

#[tokio::test]
async fn test_resolve_with_hints() {
    let fixture = TestFixture::new().await;
    fixture
        .catalog
        .add_entry(fixtures::series(100088, "The Last of Us", 2023, &[(1, 2023)]))
        .await;

    let response = fixture
        .post(
            "/api/v1/resolve",
            json!({
                "title": "The Last of Us",
                "year": 2023,
                "season": 1,
                "episode": 2
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["entry"]["id"], 100088);
    assert_eq!(response.body["media_type"], "series");
    assert_eq!(response.body["season"], 1);
    assert_eq!(response.body["episode"], 2);
}

#[tokio::test]
async fn test_resolve_unknown_name() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post("/api/v1/resolve", json!({ "title": "Qwzxy.Plorf.1999" }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["entry"].is_null());
    assert_eq!(response.body["source"], "unresolved");
}

#[tokio::test]
async fn test_resolve_without_catalog_is_unavailable() {
    let fixture = TestFixture::without_catalog().await;

    let response = fixture
        .post("/api/v1/resolve", json!({ "title": "Inception" }))
        .await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["error"], "Catalog not configured");
}

#[tokio::test]
async fn test_resolve_rejected_key_is_unavailable() {
    let fixture = TestFixture::new().await;
    fixture
        .catalog
        .set_next_error(mediamatch_core::CatalogError::NotConfigured(
            "Invalid TMDB API key".to_string(),
        ))
        .await;

    let response = fixture
        .post("/api/v1/resolve", json!({ "title": "Inception" }))
        .await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_resolve_empty_title() {
    let fixture = TestFixture::new().await;

    let response = fixture.post("/api/v1/resolve", json!({ "title": "  " })).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_resolve_malformed_json() {
    let fixture = TestFixture::new().await;

    let response = fixture.post_raw("/api/v1/resolve", "{ not json").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_keyword_inference() {
    let fixture = TestFixture::new().await;
    fixture
        .search_engine
        .set_page(SearchPage {
            entity_title: Some("Inception".to_string()),
            is_movie_entity: true,
            fragments: vec![],
        })
        .await;

    let response = fixture
        .post("/api/v1/keyword", json!({ "phrase": "盗梦空间 国语中字" }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["keyword"], "inception");
    assert_eq!(response.body["is_movie"], true);
    assert_eq!(
        fixture.search_engine.recorded_queries().await,
        vec!["盗梦空间"]
    );
}

#[tokio::test]
async fn test_blacklist_lifecycle() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/blacklist",
            json!({ "catalog_id": 27205, "media_type": "movie", "note": "wrong match" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["catalog_id"], 27205);

    let response = fixture.get("/api/v1/blacklist").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total"], 1);
    assert_eq!(response.body["entries"][0]["note"], "wrong match");

    let response = fixture.delete("/api/v1/blacklist/27205").await;
    assert_eq!(response.status, StatusCode::OK);

    let response = fixture.delete("/api/v1/blacklist/27205").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blacklisted_entry_is_not_resolved() {
    let fixture = TestFixture::new().await;
    fixture
        .catalog
        .add_entry(fixtures::movie(27205, "Inception", 2010))
        .await;
    fixture
        .post("/api/v1/blacklist", json!({ "catalog_id": 27205 }))
        .await;

    let response = fixture
        .post(
            "/api/v1/resolve",
            json!({ "title": "Inception.2010.1080p.mkv", "use_cache": false }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["entry"].is_null());
}
