//! Types for catalog entries returned by the media metadata catalog.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Kind of media a catalog entry (or a query hint) refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    /// A feature film.
    Movie,
    /// A TV series (TMDB calls these "tv").
    Series,
    /// Nothing is known about the type yet.
    #[default]
    Unknown,
}

impl MediaType {
    /// Stable string tag, also used as a cache key component.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Series => "tv",
            MediaType::Unknown => "unknown",
        }
    }

    /// Parse the catalog's `media_type` tag. Anything other than a movie or
    /// a tv show (people, collections) yields `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "movie" => Some(MediaType::Movie),
            "tv" => Some(MediaType::Series),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A season of a series, as listed on the series detail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeasonSummary {
    /// Season number (0 for specials).
    pub season_number: u32,
    /// Season name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Air date of the first episode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_date: Option<NaiveDate>,
    /// Episode count.
    #[serde(default)]
    pub episode_count: u32,
}

impl SeasonSummary {
    /// Year the season started airing.
    pub fn year(&self) -> Option<u32> {
        self.air_date.map(|d| d.year() as u32)
    }
}

/// A movie or series from the catalog.
///
/// Search endpoints return "summary" entries: no genre names, no seasons and
/// no alternate titles. The detail endpoint fills those in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    /// Catalog ID (unique per media type).
    pub id: u32,
    /// Movie or Series.
    pub media_type: MediaType,
    /// Localized title (movie title or series name).
    pub title: String,
    /// Title in the original language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    /// Alternate titles and translations, in catalog order, deduplicated.
    #[serde(default)]
    pub alternate_titles: Vec<String>,
    /// Release date for movies, first air date for series.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Genre IDs.
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// Genre names. Only present on detailed entries.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Seasons, for series details.
    #[serde(default)]
    pub seasons: Vec<SeasonSummary>,
    /// Overview/synopsis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    /// Poster path (relative to the catalog image base URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    /// Backdrop path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_path: Option<String>,
    /// Average vote (0-10).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f32>,
}

impl CatalogEntry {
    /// Release (or first air) year.
    pub fn year(&self) -> Option<u32> {
        self.date.map(|d| d.year() as u32)
    }

    /// Whether this entry came from the detail endpoint.
    pub fn is_detailed(&self) -> bool {
        !self.genres.is_empty()
    }

    /// Find a season by number.
    pub fn season(&self, season_number: u32) -> Option<&SeasonSummary> {
        self.seasons
            .iter()
            .find(|s| s.season_number == season_number)
    }

    /// True if the season `season_number` started airing in `year`.
    pub fn has_season_in_year(&self, season_number: u32, year: u32) -> bool {
        self.season(season_number)
            .and_then(SeasonSummary::year)
            .is_some_and(|y| y == year)
    }
}

/// Parse a catalog date. The catalog sends empty strings for unknown dates.
pub fn parse_catalog_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}
