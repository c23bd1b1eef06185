//! TMDB (The Movie Database) API client.
//!
//! TMDB requires an API key for access.
//! Idempotent GETs are retried on transport failures, 429 and 5xx.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::types::{parse_catalog_date, CatalogEntry, MediaType, SeasonSummary};
use super::{CatalogError, MediaCatalog};
use crate::names::contains_cjk;

/// TMDB API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    /// TMDB API key. Resolution refuses to run without one.
    #[serde(default)]
    pub api_key: String,
    /// API base URL (default: https://api.themoviedb.org/3).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Website base URL, used by the web-search fallback.
    #[serde(default = "default_web_url")]
    pub web_url: String,
    /// Language for localized titles and details.
    #[serde(default = "default_language")]
    pub language: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra attempts for retryable failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            web_url: default_web_url(),
            language: default_language(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_web_url() -> String {
    "https://www.themoviedb.org".to_string()
}

fn default_language() -> String {
    "zh".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

/// TMDB API client.
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    language: String,
    max_retries: u32,
}

impl TmdbClient {
    /// Create a new TMDB client.
    pub fn new(config: TmdbConfig) -> Result<Self, CatalogError> {
        if config.api_key.is_empty() {
            return Err(CatalogError::NotConfigured(
                "TMDB API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            language: config.language,
            max_retries: config.max_retries,
        })
    }

    /// GET `path` and decode the JSON body, retrying retryable failures.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let mut attempt = 0;
        loop {
            match self.get_json_once(path, params).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        "TMDB request {} failed (attempt {}/{}): {}",
                        path,
                        attempt,
                        self.max_retries + 1,
                        e
                    );
                    tokio::time::sleep(Duration::from_millis(250 * u64::from(attempt))).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_json_once<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", &self.api_key)])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(CatalogError::NotConfigured(
                "Invalid TMDB API key".to_string(),
            ));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(path.to_string()));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CatalogError::RateLimitExceeded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        response.json().await.map_err(|e| {
            CatalogError::ParseError(format!("Failed to parse response for {}: {}", path, e))
        })
    }

    fn search_params(&self, query: &str) -> Vec<(&'static str, String)> {
        vec![
            ("query", query.to_string()),
            ("language", self.language.clone()),
        ]
    }
}

#[async_trait]
impl MediaCatalog for TmdbClient {
    async fn search_movies(
        &self,
        query: &str,
        year: Option<u32>,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        debug!("TMDB movie search: query='{}', year={:?}", query, year);

        let mut params = self.search_params(query);
        if let Some(y) = year {
            params.push(("year", y.to_string()));
        }

        let response: TmdbSearchResponse<TmdbMovieResult> =
            self.get_json("/search/movie", &params).await?;

        Ok(response.results.into_iter().map(Into::into).collect())
    }

    async fn search_series(
        &self,
        query: &str,
        year: Option<u32>,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        debug!("TMDB TV search: query='{}', year={:?}", query, year);

        let mut params = self.search_params(query);
        if let Some(y) = year {
            params.push(("first_air_date_year", y.to_string()));
        }

        let response: TmdbSearchResponse<TmdbTvResult> =
            self.get_json("/search/tv", &params).await?;

        Ok(response.results.into_iter().map(Into::into).collect())
    }

    async fn search_multi(&self, query: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
        debug!("TMDB multi search: query='{}'", query);

        let params = self.search_params(query);
        let response: TmdbSearchResponse<TmdbMultiResult> =
            self.get_json("/search/multi", &params).await?;

        Ok(response
            .results
            .into_iter()
            .filter_map(TmdbMultiResult::into_entry)
            .collect())
    }

    async fn get_details(
        &self,
        media_type: MediaType,
        id: u32,
        language: Option<&str>,
    ) -> Result<CatalogEntry, CatalogError> {
        debug!("TMDB get details: type={}, id={}", media_type, id);

        let params = vec![
            (
                "language",
                language.unwrap_or(self.language.as_str()).to_string(),
            ),
            (
                "append_to_response",
                "alternative_titles,translations".to_string(),
            ),
        ];

        let wants_chinese = params[0].1.starts_with("zh");

        let (mut entry, cn_title) = match media_type {
            MediaType::Movie => {
                let details: TmdbMovieDetails =
                    self.get_json(&format!("/movie/{}", id), &params).await?;
                let cn_title = details.alternative_titles.chinese_title();
                (CatalogEntry::from(details), cn_title)
            }
            MediaType::Series => {
                let details: TmdbTvDetails = self.get_json(&format!("/tv/{}", id), &params).await?;
                let cn_title = details.alternative_titles.chinese_title();
                (CatalogEntry::from(details), cn_title)
            }
            MediaType::Unknown => {
                return Err(CatalogError::NotFound(format!(
                    "entry {} has no media type",
                    id
                )))
            }
        };

        // Untranslated titles fall back to the mainland alternative title.
        if wants_chinese && !contains_cjk(&entry.title) {
            if let Some(title) = cn_title {
                debug!("Using Chinese title '{}' for {} {}", title, media_type, id);
                entry.title = title;
            }
        }

        Ok(entry)
    }
}

// ============================================================================
// TMDB API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieResult {
    id: u32,
    title: String,
    original_title: Option<String>,
    release_date: Option<String>,
    #[serde(default)]
    genre_ids: Vec<u32>,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    vote_average: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct TmdbTvResult {
    id: u32,
    name: String,
    original_name: Option<String>,
    first_air_date: Option<String>,
    #[serde(default)]
    genre_ids: Vec<u32>,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    vote_average: Option<f32>,
}

/// Multi-search rows mix movies, series and people.
#[derive(Debug, Deserialize)]
struct TmdbMultiResult {
    id: u32,
    media_type: String,
    title: Option<String>,
    original_title: Option<String>,
    release_date: Option<String>,
    name: Option<String>,
    original_name: Option<String>,
    first_air_date: Option<String>,
    #[serde(default)]
    genre_ids: Vec<u32>,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    vote_average: Option<f32>,
}

impl TmdbMultiResult {
    fn into_entry(self) -> Option<CatalogEntry> {
        let media_type = MediaType::from_tag(&self.media_type)?;
        let (title, original_title, date) = match media_type {
            MediaType::Movie => (self.title, self.original_title, self.release_date),
            _ => (self.name, self.original_name, self.first_air_date),
        };
        Some(CatalogEntry {
            id: self.id,
            media_type,
            title: title.unwrap_or_default(),
            original_title,
            alternate_titles: vec![],
            date: parse_catalog_date(date.as_deref()),
            genre_ids: self.genre_ids,
            genres: vec![],
            seasons: vec![],
            overview: self.overview,
            poster_path: self.poster_path,
            backdrop_path: self.backdrop_path,
            vote_average: self.vote_average,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TmdbGenre {
    id: u32,
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct TmdbAlternativeTitles {
    /// Movies list them under `titles`, series under `results`.
    #[serde(default, alias = "results")]
    titles: Vec<TmdbAlternativeTitle>,
}

#[derive(Debug, Deserialize)]
struct TmdbAlternativeTitle {
    iso_3166_1: Option<String>,
    title: String,
}

impl TmdbAlternativeTitles {
    /// First mainland-China alternative title written in Chinese.
    fn chinese_title(&self) -> Option<String> {
        self.titles
            .iter()
            .find(|t| t.iso_3166_1.as_deref() == Some("CN") && contains_cjk(&t.title))
            .map(|t| t.title.clone())
    }
}

#[derive(Debug, Default, Deserialize)]
struct TmdbTranslations {
    #[serde(default)]
    translations: Vec<TmdbTranslation>,
}

#[derive(Debug, Deserialize)]
struct TmdbTranslation {
    #[serde(default)]
    data: TmdbTranslationData,
}

#[derive(Debug, Default, Deserialize)]
struct TmdbTranslationData {
    title: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieDetails {
    id: u32,
    title: String,
    original_title: Option<String>,
    release_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    #[serde(default)]
    genres: Vec<TmdbGenre>,
    vote_average: Option<f32>,
    #[serde(default)]
    alternative_titles: TmdbAlternativeTitles,
    #[serde(default)]
    translations: TmdbTranslations,
}

#[derive(Debug, Deserialize)]
struct TmdbTvDetails {
    id: u32,
    name: String,
    original_name: Option<String>,
    first_air_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    #[serde(default)]
    seasons: Vec<TmdbSeasonResult>,
    #[serde(default)]
    genres: Vec<TmdbGenre>,
    vote_average: Option<f32>,
    #[serde(default)]
    alternative_titles: TmdbAlternativeTitles,
    #[serde(default)]
    translations: TmdbTranslations,
}

#[derive(Debug, Deserialize)]
struct TmdbSeasonResult {
    season_number: u32,
    name: Option<String>,
    episode_count: Option<u32>,
    air_date: Option<String>,
}

// ============================================================================
// Conversions
// ============================================================================

/// Alternative titles first, then translated titles; blanks and repeats dropped.
fn collect_alternate_titles(
    alternatives: TmdbAlternativeTitles,
    translations: TmdbTranslations,
) -> Vec<String> {
    let mut titles: Vec<String> = Vec::new();
    let candidates = alternatives
        .titles
        .into_iter()
        .map(|t| t.title)
        .chain(
            translations
                .translations
                .into_iter()
                .filter_map(|t| t.data.title.or(t.data.name)),
        );
    for title in candidates {
        let title = title.trim();
        if !title.is_empty() && !titles.iter().any(|t| t == title) {
            titles.push(title.to_string());
        }
    }
    titles
}

impl From<TmdbMovieResult> for CatalogEntry {
    fn from(r: TmdbMovieResult) -> Self {
        Self {
            id: r.id,
            media_type: MediaType::Movie,
            title: r.title,
            original_title: r.original_title,
            alternate_titles: vec![],
            date: parse_catalog_date(r.release_date.as_deref()),
            genre_ids: r.genre_ids,
            genres: vec![], // Not available in search results
            seasons: vec![],
            overview: r.overview,
            poster_path: r.poster_path,
            backdrop_path: r.backdrop_path,
            vote_average: r.vote_average,
        }
    }
}

impl From<TmdbTvResult> for CatalogEntry {
    fn from(r: TmdbTvResult) -> Self {
        Self {
            id: r.id,
            media_type: MediaType::Series,
            title: r.name,
            original_title: r.original_name,
            alternate_titles: vec![],
            date: parse_catalog_date(r.first_air_date.as_deref()),
            genre_ids: r.genre_ids,
            genres: vec![],
            seasons: vec![],
            overview: r.overview,
            poster_path: r.poster_path,
            backdrop_path: r.backdrop_path,
            vote_average: r.vote_average,
        }
    }
}

impl From<TmdbMovieDetails> for CatalogEntry {
    fn from(d: TmdbMovieDetails) -> Self {
        Self {
            id: d.id,
            media_type: MediaType::Movie,
            title: d.title,
            original_title: d.original_title,
            alternate_titles: collect_alternate_titles(d.alternative_titles, d.translations),
            date: parse_catalog_date(d.release_date.as_deref()),
            genre_ids: d.genres.iter().map(|g| g.id).collect(),
            genres: d.genres.into_iter().map(|g| g.name).collect(),
            seasons: vec![],
            overview: d.overview,
            poster_path: d.poster_path,
            backdrop_path: d.backdrop_path,
            vote_average: d.vote_average,
        }
    }
}

impl From<TmdbTvDetails> for CatalogEntry {
    fn from(d: TmdbTvDetails) -> Self {
        Self {
            id: d.id,
            media_type: MediaType::Series,
            title: d.name,
            original_title: d.original_name,
            alternate_titles: collect_alternate_titles(d.alternative_titles, d.translations),
            date: parse_catalog_date(d.first_air_date.as_deref()),
            genre_ids: d.genres.iter().map(|g| g.id).collect(),
            genres: d.genres.into_iter().map(|g| g.name).collect(),
            seasons: d.seasons.into_iter().map(Into::into).collect(),
            overview: d.overview,
            poster_path: d.poster_path,
            backdrop_path: d.backdrop_path,
            vote_average: d.vote_average,
        }
    }
}

impl From<TmdbSeasonResult> for SeasonSummary {
    fn from(s: TmdbSeasonResult) -> Self {
        Self {
            season_number: s.season_number,
            name: s.name,
            air_date: parse_catalog_date(s.air_date.as_deref()),
            episode_count: s.episode_count.unwrap_or(0),
        }
    }
}
