//! End-to-end resolution scenarios.
//!
//! Raw release names go through the parser and the resolver, against a mock
//! catalog and real cache/blacklist stores:
//! - Movie and episode releases resolved directly
//! - Year-then-previous-year search order
//! - Blacklisted entries never returned
//! - Negative caching, on and off
//! - Keyword fallback

use std::sync::Arc;

use tempfile::TempDir;

use mediamatch_core::{
    blacklist::{BlacklistStore, MemoryBlacklist, NewBlacklistEntry, SqliteBlacklist},
    cache::{MemoryResultCache, ResultCache, SqliteResultCache},
    catalog::MediaType,
    keyword::{KeywordConfig, KeywordInference, SearchPage},
    parser::ReleaseNameParser,
    resolver::{MatchingConfig, MediaQuery, ResolutionSource, ResolveOptions, Resolver},
    testing::{fixtures, MockCatalog, MockSearchEngine, RecordedCatalogQuery},
};

/// Catalog with a few well-known entries.
async fn seeded_catalog() -> Arc<MockCatalog> {
    let catalog = Arc::new(MockCatalog::new());
    catalog
        .add_entry(fixtures::with_alternates(
            fixtures::movie(27205, "Inception", 2010),
            &["盗梦空间", "潜行凶间"],
        ))
        .await;
    catalog
        .add_entry(fixtures::with_alternates(
            fixtures::series(100088, "The Last of Us", 2023, &[(1, 2023), (2, 2025)]),
            &["The Last of Us", "最后生还者"],
        ))
        .await;
    catalog.add_entry(fixtures::movie(438631, "Dune", 2021)).await;
    catalog
}

struct TestHarness {
    catalog: Arc<MockCatalog>,
    resolver: Resolver,
}

impl TestHarness {
    async fn new() -> Self {
        Self::with(
            seeded_catalog().await,
            Arc::new(MemoryResultCache::default()),
            Arc::new(MemoryBlacklist::new()),
            MatchingConfig::default(),
        )
    }

    fn with(
        catalog: Arc<MockCatalog>,
        cache: Arc<dyn ResultCache>,
        blacklist: Arc<dyn BlacklistStore>,
        config: MatchingConfig,
    ) -> Self {
        let resolver = Resolver::new(catalog.clone(), cache, blacklist, config);
        Self { catalog, resolver }
    }

    fn query(raw: &str) -> MediaQuery {
        MediaQuery::parse(raw, &ReleaseNameParser::new())
    }
}

#[tokio::test]
async fn test_movie_release_resolves() {
    let harness = TestHarness::new().await;
    let mut query = TestHarness::query("Inception.2010.1080p.BluRay.x264.mkv");

    let resolution = harness
        .resolver
        .resolve(&mut query, ResolveOptions::default())
        .await
        .unwrap();

    assert_eq!(resolution.source, ResolutionSource::Direct);
    assert_eq!(resolution.media_type, MediaType::Movie);
    assert_eq!(query.media_type, MediaType::Movie);
    let entry = resolution.entry.unwrap();
    assert_eq!(entry.id, 27205);
    assert_eq!(entry.genres, vec!["Drama"]);
    assert!(entry.alternate_titles.contains(&"盗梦空间".to_string()));
}

#[tokio::test]
async fn test_second_resolution_is_served_from_cache() {
    let harness = TestHarness::new().await;

    let mut first = TestHarness::query("Inception.2010.1080p.BluRay.x264.mkv");
    harness
        .resolver
        .resolve(&mut first, ResolveOptions::default())
        .await
        .unwrap();
    let queries_after_first = harness.catalog.query_count().await;

    let mut second = TestHarness::query("Inception.2010.720p.WEB-DL.mkv");
    let resolution = harness
        .resolver
        .resolve(&mut second, ResolveOptions::default())
        .await
        .unwrap();

    assert!(resolution.from_cache);
    assert_eq!(resolution.entry.map(|e| e.id), Some(27205));
    assert_eq!(harness.catalog.query_count().await, queries_after_first);
}

#[tokio::test]
async fn test_episode_release_resolves_with_numbering() {
    let harness = TestHarness::new().await;
    let mut query = TestHarness::query("The.Last.of.Us.S01E03.2023.1080p.WEB-DL.mkv");

    let resolution = harness
        .resolver
        .resolve(&mut query, ResolveOptions::default())
        .await
        .unwrap();

    assert_eq!(resolution.entry.as_ref().map(|e| e.id), Some(100088));
    assert_eq!(resolution.media_type, MediaType::Series);
    assert_eq!(resolution.season, Some(1));
    assert_eq!(resolution.episode, Some(3));
}

#[tokio::test]
async fn test_later_season_matches_by_season_air_year() {
    let harness = TestHarness::new().await;
    let mut query = TestHarness::query("The Last of Us S02 2025 2160p");

    let resolution = harness
        .resolver
        .resolve(&mut query, ResolveOptions::default())
        .await
        .unwrap();

    assert_eq!(resolution.source, ResolutionSource::Direct);
    assert_eq!(resolution.entry.map(|e| e.id), Some(100088));
    assert_eq!(resolution.season, Some(2));
}

#[tokio::test]
async fn test_previous_year_is_tried_second() {
    let harness = TestHarness::new().await;
    let mut query = TestHarness::query("Dune.2022.2160p.mkv");

    let resolution = harness
        .resolver
        .resolve(&mut query, ResolveOptions::default())
        .await
        .unwrap();

    assert_eq!(resolution.source, ResolutionSource::Direct);
    assert_eq!(resolution.entry.map(|e| e.id), Some(438631));

    let years: Vec<Option<u32>> = harness
        .catalog
        .recorded_queries()
        .await
        .into_iter()
        .filter_map(|q| match q {
            RecordedCatalogQuery::SearchMovies { year, .. } => Some(year),
            _ => None,
        })
        .collect();
    assert_eq!(years, vec![Some(2022), Some(2021)]);
}

#[tokio::test]
async fn test_blacklisted_entry_is_never_resolved() {
    let blacklist = SqliteBlacklist::in_memory().unwrap();
    blacklist
        .add(NewBlacklistEntry {
            catalog_id: 27205,
            media_type: Some(MediaType::Movie),
            note: Some("wrong match".to_string()),
        })
        .unwrap();
    let harness = TestHarness::with(
        seeded_catalog().await,
        Arc::new(MemoryResultCache::default()),
        Arc::new(blacklist),
        MatchingConfig::default(),
    );
    let mut query = TestHarness::query("Inception.2010.1080p.BluRay.x264.mkv");

    let resolution = harness
        .resolver
        .resolve(&mut query, ResolveOptions::default())
        .await
        .unwrap();

    assert!(!resolution.is_resolved());
    assert_eq!(resolution.source, ResolutionSource::Unresolved);
}

#[tokio::test]
async fn test_unknown_name_is_cached_as_unresolved() {
    let harness = TestHarness::new().await;

    let mut query = TestHarness::query("Qwzxy.Plorf.1999.720p.mkv");
    let resolution = harness
        .resolver
        .resolve(&mut query, ResolveOptions::default())
        .await
        .unwrap();
    assert!(!resolution.is_resolved());
    assert!(!resolution.from_cache);
    let queries_after_first = harness.catalog.query_count().await;

    let mut again = TestHarness::query("Qwzxy.Plorf.1999.720p.mkv");
    let resolution = harness
        .resolver
        .resolve(&mut again, ResolveOptions::default())
        .await
        .unwrap();
    assert!(!resolution.is_resolved());
    assert!(resolution.from_cache);
    assert_eq!(harness.catalog.query_count().await, queries_after_first);
}

#[tokio::test]
async fn test_unresolved_not_cached_when_disabled() {
    let harness = TestHarness::with(
        seeded_catalog().await,
        Arc::new(MemoryResultCache::default()),
        Arc::new(MemoryBlacklist::new()),
        MatchingConfig {
            cache_unresolved: false,
            ..MatchingConfig::default()
        },
    );

    for _ in 0..2 {
        let mut query = TestHarness::query("Qwzxy.Plorf.1999.720p.mkv");
        let resolution = harness
            .resolver
            .resolve(&mut query, ResolveOptions::default())
            .await
            .unwrap();
        assert!(!resolution.from_cache);
    }

    let multi_searches = harness
        .catalog
        .recorded_queries()
        .await
        .into_iter()
        .filter(|q| matches!(q, RecordedCatalogQuery::SearchMulti { .. }))
        .count();
    assert_eq!(multi_searches, 2);
}

#[tokio::test]
async fn test_bypassing_cache_still_refreshes_it() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("cache.db");

    {
        let cache = Arc::new(SqliteResultCache::new(&db_path).unwrap());
        let harness = TestHarness::with(
            seeded_catalog().await,
            cache,
            Arc::new(MemoryBlacklist::new()),
            MatchingConfig::default(),
        );
        let mut query = TestHarness::query("Inception.2010.1080p.BluRay.x264.mkv");
        let options = ResolveOptions {
            strict: false,
            use_cache: false,
        };
        let resolution = harness.resolver.resolve(&mut query, options).await.unwrap();
        assert!(!resolution.from_cache);
    }

    // A new resolver over the same database sees the stored result.
    let harness = TestHarness::with(
        Arc::new(MockCatalog::new()),
        Arc::new(SqliteResultCache::new(&db_path).unwrap()),
        Arc::new(MemoryBlacklist::new()),
        MatchingConfig::default(),
    );
    let mut query = TestHarness::query("Inception.2010.1080p.BluRay.x264.mkv");
    let resolution = harness
        .resolver
        .resolve(&mut query, ResolveOptions::default())
        .await
        .unwrap();

    assert!(resolution.from_cache);
    assert_eq!(resolution.entry.map(|e| e.id), Some(27205));
    assert_eq!(harness.catalog.query_count().await, 0);
}

#[tokio::test]
async fn test_keyword_fallback_resolves_noisy_name() {
    let catalog = seeded_catalog().await;
    let bing = Arc::new(MockSearchEngine::new("bing"));
    bing.set_page(SearchPage {
        entity_title: Some("Inception".to_string()),
        is_movie_entity: true,
        fragments: vec!["Inception".to_string()],
    })
    .await;
    let keywords =
        Arc::new(KeywordInference::new(KeywordConfig::default()).with_engine(bing.clone()));
    let resolver = Resolver::new(
        catalog.clone(),
        Arc::new(MemoryResultCache::default()),
        Arc::new(MemoryBlacklist::new()),
        MatchingConfig::default(),
    )
    .with_keyword_inference(keywords);

    let mut query = TestHarness::query("人人影视字幕组.Inceptoin.国语中字.2010.1080p.mkv");
    assert_eq!(query.name, "人人影视字幕组 Inceptoin 国语中字");
    let resolution = resolver
        .resolve(&mut query, ResolveOptions::default())
        .await
        .unwrap();

    assert_eq!(resolution.source, ResolutionSource::Keyword);
    assert_eq!(resolution.entry.map(|e| e.id), Some(27205));
    // The engines see the cleaned title, never the file name.
    assert_eq!(bing.recorded_queries().await, vec!["Inceptoin"]);

    // Another release of the same title reuses the inferred keyword.
    let mut query = TestHarness::query("人人影视字幕组.Inceptoin.国语中字.2010.720p.mkv");
    let options = ResolveOptions {
        use_cache: false,
        ..ResolveOptions::default()
    };
    let resolution = resolver.resolve(&mut query, options).await.unwrap();

    assert_eq!(resolution.source, ResolutionSource::Keyword);
    assert_eq!(bing.recorded_queries().await.len(), 1);
}
