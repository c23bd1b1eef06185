//! Testing utilities and mock implementations.
//!
//! Mock implementations of every external service trait, so the resolver
//! can be exercised end to end without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use mediamatch_core::testing::{fixtures, MockCatalog, MockWebLookup};
//!
//! let catalog = MockCatalog::new();
//! catalog.add_entry(fixtures::movie(27205, "Inception", 2010)).await;
//!
//! let web = MockWebLookup::new();
//! web.set_hits("Inception", vec![fixtures::hit(MediaType::Movie, 27205)]).await;
//! ```

mod mock_assistant;
mod mock_catalog;
mod mock_search_engine;
mod mock_web_lookup;

pub use mock_assistant::MockAssistant;
pub use mock_catalog::{MockCatalog, RecordedCatalogQuery};
pub use mock_search_engine::MockSearchEngine;
pub use mock_web_lookup::MockWebLookup;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::NaiveDate;

    use crate::catalog::{CatalogEntry, MediaType, SeasonSummary};
    use crate::web_lookup::WebHit;

    /// A detailed movie entry released mid-`year`.
    pub fn movie(id: u32, title: &str, year: u32) -> CatalogEntry {
        CatalogEntry {
            id,
            media_type: MediaType::Movie,
            title: title.to_string(),
            original_title: Some(title.to_string()),
            alternate_titles: Vec::new(),
            date: NaiveDate::from_ymd_opt(year as i32, 7, 16),
            genre_ids: vec![18],
            genres: vec!["Drama".to_string()],
            seasons: Vec::new(),
            overview: Some(format!("A movie about {}.", title.to_lowercase())),
            poster_path: Some("/poster.jpg".to_string()),
            backdrop_path: None,
            vote_average: Some(7.5),
        }
    }

    /// A detailed series entry first aired in `year`, with `(season, year)` seasons.
    pub fn series(id: u32, title: &str, year: u32, seasons: &[(u32, u32)]) -> CatalogEntry {
        CatalogEntry {
            id,
            media_type: MediaType::Series,
            title: title.to_string(),
            original_title: Some(title.to_string()),
            alternate_titles: Vec::new(),
            date: NaiveDate::from_ymd_opt(year as i32, 1, 15),
            genre_ids: vec![18],
            genres: vec!["Drama".to_string()],
            seasons: seasons
                .iter()
                .map(|&(season_number, season_year)| SeasonSummary {
                    season_number,
                    name: Some(format!("Season {}", season_number)),
                    air_date: NaiveDate::from_ymd_opt(season_year as i32, 1, 15),
                    episode_count: 10,
                })
                .collect(),
            overview: Some(format!("A series about {}.", title.to_lowercase())),
            poster_path: Some("/poster.jpg".to_string()),
            backdrop_path: None,
            vote_average: Some(8.0),
        }
    }

    /// Add alternate titles to an entry.
    pub fn with_alternates(mut entry: CatalogEntry, titles: &[&str]) -> CatalogEntry {
        entry.alternate_titles = titles.iter().map(|t| t.to_string()).collect();
        entry
    }

    /// A website lookup hit.
    pub fn hit(media_type: MediaType, id: u32) -> WebHit {
        WebHit { media_type, id }
    }
}
