//! AI-assisted name extraction.
//!
//! An optional fallback: a language model reads the raw release name and
//! returns its best guess at title, year, season and episode.

mod llm;

pub use llm::{
    AnthropicClient, CompletionRequest, CompletionResponse, LlmClient, LlmConfig, LlmError,
    LlmProvider, OllamaClient,
};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

/// What the assistant made of a name.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantOutcome {
    /// No assistant is usable (missing or rejected credentials).
    Unavailable,
    /// The assistant answered but nothing usable came out of it.
    Unparsed,
    Parsed(ExtractedName),
}

/// Fields extracted by the assistant, as returned.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExtractedName {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub season: Option<u32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub episode: Option<u32>,
}

impl ExtractedName {
    /// First `/`-separated title variant, with dots turned into spaces.
    pub fn search_title(&self) -> Option<String> {
        let title = self.title.as_deref()?.split('/').next()?.trim().replace('.', " ");
        (!title.is_empty()).then_some(title)
    }

    /// First `/`-separated year variant, only when it is all digits.
    pub fn search_year(&self) -> Option<u32> {
        let year = self.year.as_deref()?.split('/').next()?.trim();
        if year.is_empty() || !year.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        year.parse().ok()
    }

    /// Whether the assistant returned any year at all.
    pub fn has_year(&self) -> bool {
        self.year.as_deref().is_some_and(|y| !y.trim().is_empty())
    }

    /// Season or episode numbers mean the name refers to a series.
    pub fn is_series(&self) -> bool {
        self.season.is_some() || self.episode.is_some()
    }
}

/// Accepts a string or a number; blanks become `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Accepts a number or a numeric string; zero and garbage become `None`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let number = match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(number.filter(|n| *n > 0))
}

/// Extracts title information from a raw name.
#[async_trait]
pub trait NameAssistant: Send + Sync {
    async fn extract(&self, text: &str) -> AssistantOutcome;
}

const EXTRACTION_PROMPT: &str = "You identify movies and TV shows from release or file names. \
Reply with a single JSON object and nothing else, using the keys \
\"title\" (the title without release tags; separate alternative titles with '/'), \
\"year\" (release year as a string, empty if unknown), \
\"season\" (season number, or null) and \"episode\" (episode number, or null).";

/// [`NameAssistant`] backed by an LLM.
pub struct LlmNameAssistant<C: LlmClient> {
    client: C,
    max_tokens: u32,
}

impl<C: LlmClient> LlmNameAssistant<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            max_tokens: 256,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl<C: LlmClient> NameAssistant for LlmNameAssistant<C> {
    async fn extract(&self, text: &str) -> AssistantOutcome {
        let request = CompletionRequest::new(text)
            .with_system(EXTRACTION_PROMPT)
            .with_max_tokens(self.max_tokens);

        match self.client.complete_json::<ExtractedName>(request).await {
            Ok(extracted) if extracted.title.is_some() => {
                debug!(
                    "{} extracted {:?} from '{}'",
                    self.client.provider(),
                    extracted,
                    text
                );
                AssistantOutcome::Parsed(extracted)
            }
            Ok(_) => AssistantOutcome::Unparsed,
            Err(LlmError::NotConfigured(reason)) => {
                warn!("Name assistant unavailable: {}", reason);
                AssistantOutcome::Unavailable
            }
            Err(e) => {
                warn!("Name assistant failed for '{}': {}", text, e);
                AssistantOutcome::Unparsed
            }
        }
    }
}

/// Build the configured assistant.
pub fn build_name_assistant(config: &LlmConfig) -> Result<Arc<dyn NameAssistant>, LlmError> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let assistant: Arc<dyn NameAssistant> = match config.provider {
        LlmProvider::Anthropic => {
            let mut client = AnthropicClient::new(
                config.api_key.clone().unwrap_or_default(),
                config.model.clone(),
                timeout,
            )?;
            if let Some(base) = &config.api_base {
                client = client.with_api_base(base.clone());
            }
            Arc::new(LlmNameAssistant::new(client).with_max_tokens(config.max_tokens))
        }
        LlmProvider::Ollama => {
            let mut client = OllamaClient::new(config.model.clone(), timeout)?;
            if let Some(base) = &config.api_base {
                client = client.with_api_base(base.clone());
            }
            Arc::new(LlmNameAssistant::new(client).with_max_tokens(config.max_tokens))
        }
    };
    Ok(assistant)
}
