//! Resolver configuration types.

use serde::{Deserialize, Serialize};

/// How hard the resolver tries before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Retry without the year (and without the type) when a direct search fails.
    #[default]
    Normal,
    /// Never drop the year.
    Strict,
}

/// Matching behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    #[serde(default)]
    pub mode: MatchMode,
    /// Also cache "not found" results.
    #[serde(default = "default_cache_unresolved")]
    pub cache_unresolved: bool,
    /// Maximum number of blacklist entries applied to searches.
    #[serde(default = "default_blacklist_limit")]
    pub blacklist_limit: usize,
    /// Number of leading candidates checked against alternate titles.
    #[serde(default = "default_fuzzy_candidates")]
    pub fuzzy_candidates: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            mode: MatchMode::default(),
            cache_unresolved: default_cache_unresolved(),
            blacklist_limit: default_blacklist_limit(),
            fuzzy_candidates: default_fuzzy_candidates(),
        }
    }
}

fn default_cache_unresolved() -> bool {
    true
}

fn default_blacklist_limit() -> usize {
    1000
}

fn default_fuzzy_candidates() -> usize {
    5
}

/// Optional fallbacks tried after the catalog searches fail. All off by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Scrape the catalog website's search page.
    #[serde(default)]
    pub web_lookup: bool,
    /// Ask the LLM name assistant (requires `[llm]`).
    #[serde(default)]
    pub assistant: bool,
    /// Infer a keyword from web search engines.
    #[serde(default)]
    pub keyword_search: bool,
    /// Timeout for the website lookup.
    #[serde(default = "default_web_timeout_secs")]
    pub web_timeout_secs: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            web_lookup: false,
            assistant: false,
            keyword_search: false,
            web_timeout_secs: default_web_timeout_secs(),
        }
    }
}

fn default_web_timeout_secs() -> u64 {
    5
}
