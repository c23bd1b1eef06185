//! Catalog search strategies.
//!
//! Every strategy fetches candidates, drops blacklisted IDs, then runs an
//! exact pass over the candidates' own titles followed by a fuzzy pass that
//! checks the first few candidates' alternate titles.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::types::{ResolveError, StrategyOutcome};
use crate::blacklist::BlacklistStore;
use crate::cache::ResultCache;
use crate::catalog::{CatalogEntry, CatalogError, MediaCatalog, MediaType};
use crate::names::names_equal;

/// Title and original title of an entry.
fn primary_names(entry: &CatalogEntry) -> Vec<&str> {
    std::iter::once(entry.title.as_str())
        .chain(entry.original_title.as_deref())
        .collect()
}

fn year_matches(entry: &CatalogEntry, year: Option<u32>) -> bool {
    year.is_none() || entry.year() == year
}

/// The four catalog search strategies.
pub struct CatalogStrategies {
    catalog: Arc<dyn MediaCatalog>,
    cache: Arc<dyn ResultCache>,
    blacklist: Arc<dyn BlacklistStore>,
    language: Option<String>,
    blacklist_limit: usize,
    fuzzy_candidates: usize,
}

impl CatalogStrategies {
    pub fn new(
        catalog: Arc<dyn MediaCatalog>,
        cache: Arc<dyn ResultCache>,
        blacklist: Arc<dyn BlacklistStore>,
    ) -> Self {
        Self {
            catalog,
            cache,
            blacklist,
            language: None,
            blacklist_limit: 1000,
            fuzzy_candidates: 5,
        }
    }

    /// Language requested for detail fetches (and part of the entry cache key).
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn with_blacklist_limit(mut self, limit: usize) -> Self {
        self.blacklist_limit = limit;
        self
    }

    pub fn with_fuzzy_candidates(mut self, count: usize) -> Self {
        self.fuzzy_candidates = count.max(1);
        self
    }

    /// Map a catalog error: configuration problems abort, the rest are logged.
    fn recover<T>(&self, context: &str, err: CatalogError) -> Result<Option<T>, ResolveError> {
        if err.is_configuration() {
            return Err(ResolveError::Configuration(err.to_string()));
        }
        error!("Catalog error during {}: {}", context, err);
        Ok(None)
    }

    /// Run a search and remove blacklisted candidates.
    ///
    /// `Ok(None)` means the catalog or the blacklist could not be queried.
    async fn fetch_candidates<F>(
        &self,
        context: &str,
        search: F,
    ) -> Result<Option<Vec<CatalogEntry>>, ResolveError>
    where
        F: Future<Output = Result<Vec<CatalogEntry>, CatalogError>>,
    {
        let candidates = match search.await {
            Ok(candidates) => candidates,
            Err(e) => return self.recover(context, e),
        };

        let blacklisted: HashSet<u32> = match self.blacklist.list(self.blacklist_limit) {
            Ok(entries) => entries.into_iter().map(|e| e.catalog_id).collect(),
            Err(e) => {
                error!("Failed to load blacklist during {}: {}", context, e);
                return Ok(None);
            }
        };

        let total = candidates.len();
        let filtered: Vec<CatalogEntry> = candidates
            .into_iter()
            .filter(|c| !blacklisted.contains(&c.id))
            .collect();
        if filtered.len() != total {
            debug!(
                "{}: {} of {} candidates left after blacklist",
                context,
                filtered.len(),
                total
            );
        }

        Ok(Some(filtered))
    }

    /// Whether `id` is on the blacklist. An unreadable blacklist counts as a yes.
    pub fn is_blacklisted(&self, id: u32) -> bool {
        match self.blacklist.list(self.blacklist_limit) {
            Ok(entries) => entries.iter().any(|e| e.catalog_id == id),
            Err(e) => {
                error!("Failed to load blacklist: {}", e);
                true
            }
        }
    }

    /// Full details for an entry, served from the entry cache when possible.
    pub async fn fetch_details(
        &self,
        media_type: MediaType,
        id: u32,
    ) -> Result<Option<CatalogEntry>, ResolveError> {
        let language = self.language.as_deref();

        match self.cache.get_entry(media_type, id, language) {
            Ok(Some(entry)) => {
                debug!("Entry cache hit: {}/{}", media_type, id);
                return Ok(Some(entry));
            }
            Ok(None) => {}
            Err(e) => warn!("Entry cache read failed for {}/{}: {}", media_type, id, e),
        }

        let entry = match self.catalog.get_details(media_type, id, language).await {
            Ok(entry) => entry,
            Err(e) => return self.recover(&format!("details {}/{}", media_type, id), e),
        };

        if let Err(e) = self.cache.set_entry(media_type, id, &entry, language) {
            warn!("Entry cache write failed for {}/{}: {}", media_type, id, e);
        }

        Ok(Some(entry))
    }

    /// Movie-by-name, trying `year` and then `year - 1`.
    pub async fn movie_by_name(
        &self,
        name: &str,
        year: Option<u32>,
    ) -> Result<StrategyOutcome, ResolveError> {
        let years = match year {
            Some(y) => vec![Some(y), y.checked_sub(1)],
            None => vec![None],
        };

        let mut unavailable = false;
        for year in years {
            debug!("Searching movie '{}' year={:?}", name, year);
            match self.titled_search(MediaType::Movie, name, year).await? {
                StrategyOutcome::Matched(entry) => {
                    info!(
                        "'{}' matched movie {} '{}' ({:?})",
                        name,
                        entry.id,
                        entry.title,
                        entry.date
                    );
                    return Ok(StrategyOutcome::Matched(entry));
                }
                StrategyOutcome::Unavailable => unavailable = true,
                StrategyOutcome::NoMatch => {}
            }
        }

        info!("No movie found for '{}' with year {:?}", name, year);
        Ok(if unavailable {
            StrategyOutcome::Unavailable
        } else {
            StrategyOutcome::NoMatch
        })
    }

    /// Series-by-name, optionally restricted to a first-air year.
    pub async fn series_by_name(
        &self,
        name: &str,
        year: Option<u32>,
    ) -> Result<StrategyOutcome, ResolveError> {
        debug!("Searching series '{}' year={:?}", name, year);
        let outcome = self.titled_search(MediaType::Series, name, year).await?;
        match &outcome {
            StrategyOutcome::Matched(entry) => info!(
                "'{}' matched series {} '{}' ({:?})",
                name, entry.id, entry.title, entry.date
            ),
            _ => info!("No series found for '{}' with year {:?}", name, year),
        }
        Ok(outcome)
    }

    /// Shared body of movie-by-name and series-by-name.
    async fn titled_search(
        &self,
        media_type: MediaType,
        name: &str,
        year: Option<u32>,
    ) -> Result<StrategyOutcome, ResolveError> {
        let context = format!("{} search '{}'", media_type, name);
        let search = async {
            match media_type {
                MediaType::Movie => self.catalog.search_movies(name, year).await,
                _ => self.catalog.search_series(name, year).await,
            }
        };
        let Some(candidates) = self.fetch_candidates(&context, search).await? else {
            return Ok(StrategyOutcome::Unavailable);
        };
        if candidates.is_empty() {
            return Ok(StrategyOutcome::NoMatch);
        }

        // Exact pass: dated candidates whose own title matches.
        if let Some(entry) = candidates.iter().find(|c| {
            c.date.is_some() && year_matches(c, year) && names_equal(name, &primary_names(c))
        }) {
            return Ok(StrategyOutcome::Matched(entry.clone()));
        }

        // Fuzzy pass: alternate titles of the leading candidates.
        for candidate in candidates.iter().take(self.fuzzy_candidates) {
            if !year_matches(candidate, year) {
                continue;
            }
            if let Some(details) = self.fetch_details(media_type, candidate.id).await? {
                if names_equal(name, &details.alternate_titles) {
                    return Ok(StrategyOutcome::Matched(details));
                }
            }
        }

        Ok(StrategyOutcome::NoMatch)
    }

    /// Series by name whose season `season` started airing in `year`.
    pub async fn series_by_season(
        &self,
        name: &str,
        year: u32,
        season: u32,
    ) -> Result<StrategyOutcome, ResolveError> {
        debug!("Searching series '{}' season={} year={}", name, season, year);
        let context = format!("season search '{}'", name);
        let search = self.catalog.search_series(name, None);
        let Some(candidates) = self.fetch_candidates(&context, search).await? else {
            return Ok(StrategyOutcome::Unavailable);
        };
        if candidates.is_empty() {
            return Ok(StrategyOutcome::NoMatch);
        }

        // Exact pass: own title matches and the show first aired in `year`.
        if let Some(entry) = candidates
            .iter()
            .find(|c| c.year() == Some(year) && names_equal(name, &primary_names(c)))
        {
            return Ok(StrategyOutcome::Matched(entry.clone()));
        }

        // Fuzzy pass: alternate and translated titles plus the season's air year.
        for candidate in candidates.iter().take(self.fuzzy_candidates) {
            if let Some(details) = self.fetch_details(MediaType::Series, candidate.id).await? {
                if names_equal(name, &details.alternate_titles)
                    && details.has_season_in_year(season, year)
                {
                    return Ok(StrategyOutcome::Matched(details));
                }
            }
        }

        info!(
            "No series found for '{}' season {} in {}",
            name, season, year
        );
        Ok(StrategyOutcome::NoMatch)
    }

    /// Movies and series at once, without a year.
    pub async fn multi_search(&self, name: &str) -> Result<StrategyOutcome, ResolveError> {
        debug!("Multi-searching '{}'", name);
        let context = format!("multi search '{}'", name);
        let search = self.catalog.search_multi(name);
        let Some(candidates) = self.fetch_candidates(&context, search).await? else {
            return Ok(StrategyOutcome::Unavailable);
        };

        if let Some(entry) = candidates
            .iter()
            .find(|c| names_equal(name, &primary_names(c)))
        {
            info!("'{}' matched {} {} '{}'", name, entry.media_type, entry.id, entry.title);
            return Ok(StrategyOutcome::Matched(entry.clone()));
        }

        for candidate in candidates.iter().take(self.fuzzy_candidates) {
            if let Some(details) = self
                .fetch_details(candidate.media_type, candidate.id)
                .await?
            {
                if names_equal(name, &details.alternate_titles) {
                    info!(
                        "'{}' matched {} {} '{}' by alternate title",
                        name, details.media_type, details.id, details.title
                    );
                    return Ok(StrategyOutcome::Matched(details));
                }
            }
        }

        info!("No media found for '{}'", name);
        Ok(StrategyOutcome::NoMatch)
    }
}
