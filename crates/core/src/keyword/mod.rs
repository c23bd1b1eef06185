//! Keyword inference.
//!
//! When the catalog cannot match a noisy name, web search engines are asked
//! what the name most likely refers to. Highlighted fragments from the
//! results pages are scored by rank and the best one becomes the keyword
//! for another catalog search.

mod config;
mod engines;
mod scoring;

pub use config::KeywordConfig;
pub use engines::{
    parse_baidu_page, parse_bing_page, BaiduEngine, BingEngine, SearchEngine, SearchEngineError,
    SearchPage,
};
pub use scoring::{choose_keyword, rank_weight, ScoreBoard, ENTITY_TITLE_SCORE};

pub(crate) use engines::BROWSER_USER_AGENT;

use std::sync::Arc;

use futures::future::join_all;
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Outcome of keyword inference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordGuess {
    /// Inferred keyword (lower-cased), if any.
    pub keyword: Option<String>,
    /// Whether an engine's knowledge panel identified a movie.
    pub is_movie: bool,
}

impl KeywordGuess {
    fn none() -> Self {
        Self::default()
    }
}

/// Infers a catalog search keyword from a noisy phrase.
pub struct KeywordInference {
    config: KeywordConfig,
    engines: Vec<Arc<dyn SearchEngine>>,
    memo: Cache<String, KeywordGuess>,
}

impl KeywordInference {
    /// Create an inference engine without any search engines.
    pub fn new(config: KeywordConfig) -> Self {
        let memo = Cache::new(config.cache_capacity);
        Self {
            config,
            engines: Vec::new(),
            memo,
        }
    }

    /// Create an inference engine querying Bing and Baidu.
    pub fn from_config(config: KeywordConfig) -> Result<Self, SearchEngineError> {
        let bing = BingEngine::new(config.bing_url.clone(), config.timeout_secs)?;
        let baidu = BaiduEngine::new(config.baidu_url.clone(), config.timeout_secs)?;
        Ok(Self::new(config)
            .with_engine(Arc::new(bing))
            .with_engine(Arc::new(baidu)))
    }

    /// Add a search engine. Engines are scored in the order they were added.
    pub fn with_engine(mut self, engine: Arc<dyn SearchEngine>) -> Self {
        self.engines.push(engine);
        self
    }

    pub fn config(&self) -> &KeywordConfig {
        &self.config
    }

    /// Remove a leading subtitle-group marker and every noise word.
    pub fn clean_phrase(&self, phrase: &str) -> String {
        let mut cleaned = strip_subtitle_group(phrase).to_string();
        let mut noise: Vec<&String> = self.config.noise_words.iter().collect();
        noise.sort_by_key(|w| std::cmp::Reverse(w.chars().count()));
        for word in noise {
            if !word.is_empty() {
                cleaned = cleaned.replace(word.as_str(), " ");
            }
        }
        cleaned.trim().to_string()
    }

    /// Infer a keyword for `phrase`, remembering the answer per phrase.
    ///
    /// Concurrent first lookups of the same phrase may both hit the engines.
    pub async fn infer(&self, phrase: &str) -> KeywordGuess {
        if let Some(guess) = self.memo.get(phrase) {
            debug!("Keyword cache hit for '{}'", phrase);
            return guess;
        }
        let guess = self.infer_uncached(phrase).await;
        self.memo.insert(phrase.to_string(), guess.clone());
        guess
    }

    async fn infer_uncached(&self, phrase: &str) -> KeywordGuess {
        let cleaned = self.clean_phrase(phrase);
        if cleaned.is_empty() {
            return KeywordGuess::none();
        }

        let pages = join_all(self.engines.iter().map(|engine| {
            let cleaned = cleaned.as_str();
            async move { (engine.name().to_string(), engine.search(cleaned).await) }
        }))
        .await;

        let mut board = ScoreBoard::new();
        let mut is_movie = false;

        for (engine, result) in pages {
            let page = match result {
                Ok(page) => page,
                Err(e) => {
                    warn!("Keyword search on {} failed: {}", engine, e);
                    continue;
                }
            };

            if let Some(title) = &page.entity_title {
                board.add(title, ENTITY_TITLE_SCORE);
                is_movie |= page.is_movie_entity;
            }

            let matches: Vec<String> = page
                .fragments
                .into_iter()
                .filter(|fragment| {
                    strsim::normalized_levenshtein(&cleaned, fragment)
                        > self.config.similarity_threshold
                })
                .collect();
            debug!(
                "{} returned {} fragments similar to '{}'",
                engine,
                matches.len(),
                cleaned
            );
            board.add_ranked(&matches, &self.config);
        }

        let ranked = board.ranked();
        if ranked.is_empty() {
            return KeywordGuess::none();
        }
        info!(
            "Keyword candidates for '{}': {:?}",
            cleaned,
            ranked.iter().take(4).map(|(k, _)| k).collect::<Vec<_>>()
        );

        let keyword = choose_keyword(&ranked, self.config.diff_score_threshold);
        info!("Chose keyword {:?} for '{}'", keyword, cleaned);

        KeywordGuess { keyword, is_movie }
    }
}

/// Strip a leading "<word>字幕", "<word>字幕组" or "<word>字幕社" marker.
///
/// The marker must start the phrase and the word before 字幕 must be made of
/// word characters only; the longest such prefix wins.
fn strip_subtitle_group(phrase: &str) -> &str {
    const MARKER: &str = "字幕";

    let word_end = phrase
        .char_indices()
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
        .map_or(phrase.len(), |(i, _)| i);
    let word = &phrase[..word_end];

    let Some(marker_at) = word.rfind(MARKER).filter(|&i| i > 0) else {
        return phrase;
    };

    let rest = &phrase[marker_at + MARKER.len()..];
    rest.strip_prefix('组')
        .or_else(|| rest.strip_prefix('社'))
        .unwrap_or(rest)
}
