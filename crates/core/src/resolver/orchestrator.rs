//! Resolution pipeline.
//!
//! Stages run in order and stop at the first match:
//! cache lookup, direct strategy, retry without the year, website lookup,
//! assistant extraction, keyword inference. A match is enriched with full
//! details and the result is written back to the resolution cache.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::config::{MatchMode, MatchingConfig};
use super::strategies::CatalogStrategies;
use super::types::{
    MediaQuery, Resolution, ResolutionSource, ResolveError, ResolveOptions, StrategyOutcome,
};
use crate::assistant::{AssistantOutcome, NameAssistant};
use crate::blacklist::BlacklistStore;
use crate::cache::ResultCache;
use crate::catalog::{CatalogEntry, MediaCatalog, MediaType};
use crate::keyword::KeywordInference;
use crate::names::contains_cjk;
use crate::web_lookup::WebLookup;

/// Resolves media queries to catalog entries.
pub struct Resolver {
    strategies: CatalogStrategies,
    cache: Arc<dyn ResultCache>,
    config: MatchingConfig,
    web_lookup: Option<Arc<dyn WebLookup>>,
    assistant: Option<Arc<dyn NameAssistant>>,
    keywords: Option<Arc<KeywordInference>>,
}

impl Resolver {
    pub fn new(
        catalog: Arc<dyn MediaCatalog>,
        cache: Arc<dyn ResultCache>,
        blacklist: Arc<dyn BlacklistStore>,
        config: MatchingConfig,
    ) -> Self {
        let strategies = CatalogStrategies::new(catalog, Arc::clone(&cache), blacklist)
            .with_blacklist_limit(config.blacklist_limit)
            .with_fuzzy_candidates(config.fuzzy_candidates);
        Self {
            strategies,
            cache,
            config,
            web_lookup: None,
            assistant: None,
            keywords: None,
        }
    }

    /// Language used for detail fetches.
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.strategies = self.strategies.with_language(language);
        self
    }

    /// Enable the catalog website fallback.
    pub fn with_web_lookup(mut self, web_lookup: Arc<dyn WebLookup>) -> Self {
        self.web_lookup = Some(web_lookup);
        self
    }

    /// Enable the assistant fallback.
    pub fn with_assistant(mut self, assistant: Arc<dyn NameAssistant>) -> Self {
        self.assistant = Some(assistant);
        self
    }

    /// Enable the keyword inference fallback.
    pub fn with_keyword_inference(mut self, keywords: Arc<KeywordInference>) -> Self {
        self.keywords = Some(keywords);
        self
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Resolve `query` to a catalog entry.
    ///
    /// On success the query's type is corrected to the matched entry's type,
    /// and the assistant fallback may fill in season and episode.
    /// An unresolved name is a normal outcome (`entry == None`); only a
    /// catalog configuration problem is an error.
    pub async fn resolve(
        &self,
        query: &mut MediaQuery,
        options: ResolveOptions,
    ) -> Result<Resolution, ResolveError> {
        if query.name.trim().is_empty() {
            return Err(ResolveError::InvalidQuery("empty name".to_string()));
        }

        let key = query.cache_key();

        if options.use_cache {
            match self.cache.get_resolution(&key) {
                Ok(Some(cached)) => {
                    debug!("Resolution cache hit for '{}'", query.name);
                    if let Some(entry) = &cached.entry {
                        query.media_type = entry.media_type;
                    }
                    // The key has no episode numbers; the query's own win.
                    let season = query.season.or(cached.season);
                    let episode = query.episode.or(cached.episode);
                    let mut cached = cached.with_numbering(season, episode);
                    cached.from_cache = true;
                    return Ok(cached);
                }
                Ok(None) => {}
                Err(e) => warn!("Resolution cache read failed for '{}': {}", query.name, e),
            }
        }

        let found = self.search(query, options).await?;

        let resolution = match found {
            Some((entry, source)) => {
                let entry = self.enrich(entry).await?;
                query.media_type = entry.media_type;
                info!(
                    "Resolved '{}' to {} {} '{}' via {:?}",
                    query.original, entry.media_type, entry.id, entry.title, source
                );
                Resolution::found(entry, source).with_numbering(query.season, query.episode)
            }
            None => {
                info!("Could not resolve '{}'", query.original);
                Resolution::unresolved(query.media_type)
                    .with_numbering(query.season, query.episode)
            }
        };

        if resolution.is_resolved() || self.config.cache_unresolved {
            if let Err(e) = self.cache.set_resolution(&key, &resolution) {
                warn!("Resolution cache write failed for '{}': {}", query.name, e);
            }
        }

        Ok(resolution)
    }

    /// Run the search stages in order.
    async fn search(
        &self,
        query: &mut MediaQuery,
        options: ResolveOptions,
    ) -> Result<Option<(CatalogEntry, ResolutionSource)>, ResolveError> {
        if let Some(entry) = self
            .direct(&query.name, query.year, query.media_type, query.season)
            .await?
        {
            return Ok(Some((entry, ResolutionSource::Direct)));
        }

        if let Some(entry) = self.without_year(query, options).await? {
            return Ok(Some((entry, ResolutionSource::NoYearFallback)));
        }

        if let Some(entry) = self.web_fallback(query).await? {
            return Ok(Some((entry, ResolutionSource::WebLookup)));
        }

        if let Some(entry) = self.assistant_fallback(query).await? {
            return Ok(Some((entry, ResolutionSource::Assistant)));
        }

        if let Some(entry) = self.keyword_fallback(query).await? {
            return Ok(Some((entry, ResolutionSource::Keyword)));
        }

        Ok(None)
    }

    /// The strategy matching what is known about the query.
    async fn direct(
        &self,
        name: &str,
        year: Option<u32>,
        media_type: MediaType,
        season: Option<u32>,
    ) -> Result<Option<CatalogEntry>, ResolveError> {
        match (media_type, year) {
            (MediaType::Series, _) => {
                if let (Some(year), Some(season)) = (year, season) {
                    let outcome = self.strategies.series_by_season(name, year, season).await?;
                    if let StrategyOutcome::Matched(entry) = outcome {
                        return Ok(Some(entry));
                    }
                }
                Ok(self.strategies.series_by_name(name, year).await?.into_entry())
            }
            (MediaType::Movie | MediaType::Unknown, None) => {
                Ok(self.strategies.multi_search(name).await?.into_entry())
            }
            _ => {
                if let StrategyOutcome::Matched(entry) =
                    self.strategies.movie_by_name(name, year).await?
                {
                    return Ok(Some(entry));
                }
                Ok(self.strategies.series_by_name(name, year).await?.into_entry())
            }
        }
    }

    /// Retry a failed dated search without the year.
    async fn without_year(
        &self,
        query: &MediaQuery,
        options: ResolveOptions,
    ) -> Result<Option<CatalogEntry>, ResolveError> {
        if query.year.is_none() || options.strict || self.config.mode == MatchMode::Strict {
            return Ok(None);
        }

        debug!("Retrying '{}' without year", query.name);
        let outcome = match query.media_type {
            MediaType::Series => self.strategies.series_by_name(&query.name, None).await?,
            _ => self.strategies.multi_search(&query.name).await?,
        };
        Ok(outcome.into_entry())
    }

    /// Ask the catalog website; accept only a single unambiguous hit.
    async fn web_fallback(&self, query: &MediaQuery) -> Result<Option<CatalogEntry>, ResolveError> {
        let Some(web_lookup) = &self.web_lookup else {
            return Ok(None);
        };
        if contains_cjk(&query.name) {
            debug!("Skipping website lookup for '{}'", query.name);
            return Ok(None);
        }

        let hits = match web_lookup.lookup(&query.name, query.media_type).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!("Website lookup failed for '{}': {}", query.name, e);
                return Ok(None);
            }
        };

        let mut hits = hits.into_iter().filter(|hit| {
            query.media_type != MediaType::Series || hit.media_type == MediaType::Series
        });
        let hit = match (hits.next(), hits.next()) {
            (Some(hit), None) => hit,
            (None, _) => {
                debug!("Website lookup found nothing for '{}'", query.name);
                return Ok(None);
            }
            (Some(_), Some(_)) => {
                debug!("Website lookup for '{}' is ambiguous", query.name);
                return Ok(None);
            }
        };

        if self.strategies.is_blacklisted(hit.id) {
            debug!("Website hit {} for '{}' is blacklisted", hit.id, query.name);
            return Ok(None);
        }

        self.strategies.fetch_details(hit.media_type, hit.id).await
    }

    /// Let the assistant re-read the raw name, then search again with its answer.
    async fn assistant_fallback(
        &self,
        query: &mut MediaQuery,
    ) -> Result<Option<CatalogEntry>, ResolveError> {
        let Some(assistant) = &self.assistant else {
            return Ok(None);
        };

        let extracted = match assistant.extract(&query.original).await {
            AssistantOutcome::Unavailable => return Ok(None),
            AssistantOutcome::Unparsed => {
                info!("Assistant could not parse '{}'", query.original);
                return Ok(None);
            }
            AssistantOutcome::Parsed(extracted) => extracted,
        };
        let Some(title) = extracted.search_title() else {
            info!("Assistant returned no title for '{}'", query.original);
            return Ok(None);
        };

        let media_type = if extracted.is_series() {
            MediaType::Series
        } else {
            query.media_type
        };
        let year = extracted.search_year();
        info!(
            "Assistant read '{}' as '{}' year={:?} type={}",
            query.original, title, year, media_type
        );

        query.media_type = media_type;
        query.season = query.season.or(extracted.season);
        query.episode = query.episode.or(extracted.episode);

        self.direct(&title, year, media_type, query.season).await
    }

    /// Infer a keyword for the parsed name from web search results and search for it.
    async fn keyword_fallback(
        &self,
        query: &MediaQuery,
    ) -> Result<Option<CatalogEntry>, ResolveError> {
        let Some(keywords) = &self.keywords else {
            return Ok(None);
        };

        let guess = keywords.infer(&query.name).await;
        let Some(keyword) = guess.keyword else {
            return Ok(None);
        };

        info!(
            "Keyword for '{}' is '{}' (movie: {})",
            query.name, keyword, guess.is_movie
        );
        let outcome = if guess.is_movie {
            self.strategies.movie_by_name(&keyword, None).await?
        } else {
            self.strategies.multi_search(&keyword).await?
        };
        Ok(outcome.into_entry())
    }

    /// Replace a search summary with full details when available.
    async fn enrich(&self, entry: CatalogEntry) -> Result<CatalogEntry, ResolveError> {
        if entry.is_detailed() {
            return Ok(entry);
        }
        Ok(self
            .strategies
            .fetch_details(entry.media_type, entry.id)
            .await?
            .unwrap_or(entry))
    }
}
