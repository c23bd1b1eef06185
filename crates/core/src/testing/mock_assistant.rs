//! Mock name assistant for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::assistant::{AssistantOutcome, ExtractedName, NameAssistant};

/// Mock implementation of the NameAssistant trait.
///
/// Answers every request with the configured outcome (`Unparsed` until one
/// is set) and records the texts it was given.
#[derive(Debug)]
pub struct MockAssistant {
    outcome: Arc<RwLock<AssistantOutcome>>,
    requests: Arc<RwLock<Vec<String>>>,
}

impl Default for MockAssistant {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAssistant {
    pub fn new() -> Self {
        Self {
            outcome: Arc::new(RwLock::new(AssistantOutcome::Unparsed)),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Set the outcome returned for every request.
    pub async fn set_outcome(&self, outcome: AssistantOutcome) {
        *self.outcome.write().await = outcome;
    }

    /// Shorthand for a parsed answer.
    pub async fn set_extracted(
        &self,
        title: &str,
        year: Option<&str>,
        season: Option<u32>,
        episode: Option<u32>,
    ) {
        self.set_outcome(AssistantOutcome::Parsed(ExtractedName {
            title: Some(title.to_string()),
            year: year.map(str::to_string),
            season,
            episode,
        }))
        .await;
    }

    /// Texts the assistant was asked about.
    pub async fn recorded_requests(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl NameAssistant for MockAssistant {
    async fn extract(&self, text: &str) -> AssistantOutcome {
        self.requests.write().await.push(text.to_string());
        self.outcome.read().await.clone()
    }
}
