use std::sync::Arc;

use mediamatch_core::{
    BlacklistStore, Config, KeywordInference, ReleaseNameParser, Resolver, SanitizedConfig,
};

/// Shared application state
pub struct AppState {
    config: Config,
    /// `None` when the catalog is not configured (no API key).
    resolver: Option<Arc<Resolver>>,
    keywords: Arc<KeywordInference>,
    blacklist: Arc<dyn BlacklistStore>,
    parser: ReleaseNameParser,
}

impl AppState {
    pub fn new(
        config: Config,
        resolver: Option<Arc<Resolver>>,
        keywords: Arc<KeywordInference>,
        blacklist: Arc<dyn BlacklistStore>,
    ) -> Self {
        Self {
            config,
            resolver,
            keywords,
            blacklist,
            parser: ReleaseNameParser::new(),
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn resolver(&self) -> Option<&Resolver> {
        self.resolver.as_deref()
    }

    pub fn keywords(&self) -> &KeywordInference {
        &self.keywords
    }

    pub fn blacklist(&self) -> &dyn BlacklistStore {
        self.blacklist.as_ref()
    }

    pub fn parser(&self) -> &ReleaseNameParser {
        &self.parser
    }
}
