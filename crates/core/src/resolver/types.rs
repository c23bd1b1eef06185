//! Resolver request and result types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::ResolutionKey;
use crate::catalog::{CatalogEntry, MediaType};
use crate::parser::NameParser;

/// Errors that abort a resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The catalog cannot be used at all (missing or rejected API key).
    #[error("Catalog not configured: {0}")]
    Configuration(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

/// What is known about the media before resolution.
///
/// The resolver may correct the type and fill in season/episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaQuery {
    /// Raw name as received; handed to the assistant fallback.
    pub original: String,
    /// Title to search for.
    pub name: String,
    pub year: Option<u32>,
    pub media_type: MediaType,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

impl MediaQuery {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            original: name.clone(),
            name,
            year: None,
            media_type: MediaType::Unknown,
            season: None,
            episode: None,
        }
    }

    /// Build a query by parsing a raw release name.
    pub fn parse(raw: &str, parser: &dyn NameParser) -> Self {
        let parsed = parser.parse(raw);
        Self {
            original: raw.to_string(),
            name: parsed.name,
            year: parsed.year,
            media_type: parsed.media_type,
            season: parsed.season,
            episode: parsed.episode,
        }
    }

    pub fn with_year(mut self, year: u32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = media_type;
        self
    }

    pub fn with_season(mut self, season: u32) -> Self {
        self.season = Some(season);
        self
    }

    pub fn with_episode(mut self, episode: u32) -> Self {
        self.episode = Some(episode);
        self
    }

    /// Key under which the resolution of this query is cached.
    pub fn cache_key(&self) -> ResolutionKey {
        ResolutionKey::new(self.name.clone(), self.year, self.media_type)
    }
}

/// Per-call resolution options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveOptions {
    /// Never retry without the year, whatever the configured mode.
    #[serde(default)]
    pub strict: bool,
    /// Consult the resolution cache before searching.
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,
}

fn default_use_cache() -> bool {
    true
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            strict: false,
            use_cache: true,
        }
    }
}

/// Which stage produced the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    Direct,
    NoYearFallback,
    WebLookup,
    Assistant,
    Keyword,
    Unresolved,
}

/// Result of resolving a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Matched catalog entry; `None` when the name could not be resolved.
    pub entry: Option<CatalogEntry>,
    pub media_type: MediaType,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub source: ResolutionSource,
    /// Set when served from the resolution cache.
    #[serde(default)]
    pub from_cache: bool,
}

impl Resolution {
    pub fn found(entry: CatalogEntry, source: ResolutionSource) -> Self {
        Self {
            media_type: entry.media_type,
            entry: Some(entry),
            season: None,
            episode: None,
            source,
            from_cache: false,
        }
    }

    pub fn unresolved(media_type: MediaType) -> Self {
        Self {
            entry: None,
            media_type,
            season: None,
            episode: None,
            source: ResolutionSource::Unresolved,
            from_cache: false,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.entry.is_some()
    }

    pub(crate) fn with_numbering(mut self, season: Option<u32>, episode: Option<u32>) -> Self {
        self.season = season;
        self.episode = episode;
        self
    }
}

/// Outcome of a single catalog search strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyOutcome {
    Matched(CatalogEntry),
    /// The catalog answered but nothing matched.
    NoMatch,
    /// The catalog (or blacklist) could not be queried.
    Unavailable,
}

impl StrategyOutcome {
    pub fn into_entry(self) -> Option<CatalogEntry> {
        match self {
            StrategyOutcome::Matched(entry) => Some(entry),
            _ => None,
        }
    }
}
