use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::assistant::{LlmConfig, LlmProvider};
use crate::catalog::TmdbConfig;
use crate::keyword::KeywordConfig;
use crate::resolver::{FallbackConfig, MatchingConfig};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub fallbacks: FallbackConfig,
    #[serde(default)]
    pub keyword: KeywordConfig,
    /// LLM used by the assistant fallback.
    #[serde(default)]
    pub llm: Option<LlmConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Database configuration (resolution cache and blacklist).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("mediamatch.db")
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub tmdb: SanitizedTmdbConfig,
    pub matching: MatchingConfig,
    pub fallbacks: FallbackConfig,
    pub keyword: KeywordConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm: Option<SanitizedLlmConfig>,
}

/// Sanitized TMDB config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTmdbConfig {
    pub api_key_configured: bool,
    pub base_url: String,
    pub web_url: String,
    pub language: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

/// Sanitized LLM config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedLlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub api_key_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    pub timeout_secs: u64,
    pub max_tokens: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            tmdb: SanitizedTmdbConfig {
                api_key_configured: !config.tmdb.api_key.is_empty(),
                base_url: config.tmdb.base_url.clone(),
                web_url: config.tmdb.web_url.clone(),
                language: config.tmdb.language.clone(),
                timeout_secs: config.tmdb.timeout_secs,
                max_retries: config.tmdb.max_retries,
            },
            matching: config.matching.clone(),
            fallbacks: config.fallbacks.clone(),
            keyword: config.keyword.clone(),
            llm: config.llm.as_ref().map(|l| SanitizedLlmConfig {
                provider: l.provider,
                model: l.model.clone(),
                api_key_configured: l.api_key.as_deref().is_some_and(|k| !k.is_empty()),
                api_base: l.api_base.clone(),
                timeout_secs: l.timeout_secs,
                max_tokens: l.max_tokens,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.database.path.to_str().unwrap(), "mediamatch.db");
        assert_eq!(config.tmdb.base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.tmdb.max_retries, 2);
        assert!(config.matching.cache_unresolved);
        assert_eq!(config.matching.fuzzy_candidates, 5);
        assert_eq!(config.keyword.weights_many.len(), 5);
        assert_eq!(config.fallbacks.web_timeout_secs, 5);
    }

    #[test]
    fn test_deserialize_llm_section() {
        let toml = r#"
[fallbacks]
assistant = true

[llm]
provider = "ollama"
model = "llama3"
api_base = "http://localhost:11434"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.fallbacks.assistant);
        let llm = config.llm.unwrap();
        assert_eq!(llm.provider, LlmProvider::Ollama);
        assert_eq!(llm.timeout_secs, 30);
        assert_eq!(llm.max_tokens, 256);
    }

    #[test]
    fn test_deserialize_keyword_overrides() {
        let toml = r#"
[keyword]
weights_few = [8.0, 1.0]
noise_words = ["HDTV"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.keyword.weights_few, vec![8.0, 1.0]);
        assert_eq!(config.keyword.noise_words, vec!["HDTV".to_string()]);
        assert_eq!(config.keyword.weights_some, vec![10.0, 2.0, 1.0]);
    }

    #[test]
    fn test_sanitized_config_hides_keys() {
        let mut config = Config::default();
        config.tmdb.api_key = "secret-key".to_string();
        config.llm = Some(LlmConfig {
            provider: LlmProvider::Anthropic,
            model: "claude-3-haiku-20240307".to_string(),
            api_key: Some("sk-secret".to_string()),
            api_base: None,
            timeout_secs: 30,
            max_tokens: 256,
        });

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.tmdb.api_key_configured);
        assert!(sanitized.llm.as_ref().unwrap().api_key_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret-key"));
        assert!(!json.contains("sk-secret"));
    }
}
