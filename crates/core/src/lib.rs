pub mod assistant;
pub mod blacklist;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod keyword;
pub mod names;
pub mod parser;
pub mod resolver;
pub mod testing;
pub mod web_lookup;

pub use blacklist::{BlacklistEntry, BlacklistError, BlacklistStore, NewBlacklistEntry};
pub use cache::{CacheError, ResolutionKey, ResultCache};
pub use catalog::{CatalogEntry, CatalogError, MediaCatalog, MediaType, TmdbClient};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use keyword::{KeywordGuess, KeywordInference};
pub use parser::{NameParser, ParsedName, ReleaseNameParser};
pub use resolver::{
    MediaQuery, Resolution, ResolutionSource, ResolveError, ResolveOptions, Resolver,
};
