use mediamatch_core::catalog::MediaType;
use mediamatch_core::keyword::{BaiduEngine, BingEngine, SearchEngine, SearchEngineError};
use mediamatch_core::web_lookup::{TmdbWebLookup, WebHit, WebLookup, WebLookupError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_bing_engine_parses_results_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "盗梦空间"))
        .and(query_param("form", "QBRE"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
                 <h2><a><strong>盗梦空间</strong></a></h2>
                 <aside><h2 class="b_entityTitle">盗梦空间 (2010)</h2>
                 <div data-feedbk-ids="Movie"></div></aside>
               </body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let engine = BingEngine::new(format!("{}/search", server.uri()), 5).unwrap();
    let page = engine.search("盗梦空间").await.unwrap();

    assert_eq!(page.entity_title.as_deref(), Some("盗梦空间"));
    assert!(page.is_movie_entity);
    assert_eq!(page.fragments, vec!["盗梦空间"]);
}

#[tokio::test]
async fn test_baidu_engine_rejects_non_ok_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/s"))
        .and(query_param("wd", "三体"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let engine = BaiduEngine::new(format!("{}/s", server.uri()), 5).unwrap();
    let err = engine.search("三体").await.unwrap_err();

    assert!(matches!(err, SearchEngineError::Status(403)));
}

#[tokio::test]
async fn test_baidu_engine_collects_highlights() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/s"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><body><p><em>三体</em> 电视剧</p><p><em>三体</em>第一季</p></body></html>",
        ))
        .mount(&server)
        .await;

    let engine = BaiduEngine::new(format!("{}/s", server.uri()), 5).unwrap();
    let page = engine.search("三体").await.unwrap();

    assert_eq!(page.entity_title, None);
    assert_eq!(page.fragments, vec!["三体", "三体"]);
}

#[tokio::test]
async fn test_tmdb_web_lookup() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("query", "The Wandering Earth"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
                 <a data-id="535167" data-media-type="movie" href="/movie/535167-the-wandering-earth">The Wandering Earth</a>
                 <a data-id="535167" data-media-type="movie" href="/movie/535167-the-wandering-earth"><img/></a>
               </body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let lookup = TmdbWebLookup::new(server.uri(), 5).unwrap();
    let hits = lookup
        .lookup("The Wandering Earth", MediaType::Unknown)
        .await
        .unwrap();

    assert_eq!(
        hits,
        vec![WebHit {
            media_type: MediaType::Movie,
            id: 535167
        }]
    );
}

#[tokio::test]
async fn test_tmdb_web_lookup_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let lookup = TmdbWebLookup::new(server.uri(), 5).unwrap();
    let err = lookup.lookup("Anything", MediaType::Movie).await.unwrap_err();

    assert!(matches!(err, WebLookupError::Status(503)));
}
