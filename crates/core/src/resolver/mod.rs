//! Name resolution.
//!
//! [`Resolver`] turns a [`MediaQuery`] into a [`Resolution`] using the catalog
//! search strategies and the optional fallbacks.

mod config;
mod orchestrator;
mod strategies;
mod types;

pub use config::{FallbackConfig, MatchMode, MatchingConfig};
pub use orchestrator::Resolver;
pub use strategies::CatalogStrategies;
pub use types::{
    MediaQuery, Resolution, ResolutionSource, ResolveError, ResolveOptions, StrategyOutcome,
};
