use super::{types::Config, ConfigError};

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Keyword weight tables have 5, 3 and 2 entries
/// - Keyword thresholds are in range
/// - At least one fuzzy candidate is checked
/// - An `[llm]` section exists when the assistant fallback is on
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(invalid("server.port cannot be 0"));
    }

    let keyword = &config.keyword;
    for (name, table, expected) in [
        ("weights_many", &keyword.weights_many, 5),
        ("weights_some", &keyword.weights_some, 3),
        ("weights_few", &keyword.weights_few, 2),
    ] {
        if table.len() != expected {
            return Err(invalid(format!(
                "keyword.{} must have {} entries, got {}",
                name,
                expected,
                table.len()
            )));
        }
        if table.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(invalid(format!(
                "keyword.{} must contain non-negative numbers",
                name
            )));
        }
    }

    if !(0.0..=1.0).contains(&keyword.similarity_threshold) {
        return Err(invalid("keyword.similarity_threshold must be between 0 and 1"));
    }
    if !keyword.diff_score_threshold.is_finite() || keyword.diff_score_threshold < 0.0 {
        return Err(invalid("keyword.diff_score_threshold cannot be negative"));
    }
    if keyword.cache_capacity == 0 {
        return Err(invalid("keyword.cache_capacity cannot be 0"));
    }

    if config.matching.fuzzy_candidates == 0 {
        return Err(invalid("matching.fuzzy_candidates must be at least 1"));
    }

    if config.fallbacks.assistant && config.llm.is_none() {
        return Err(invalid(
            "fallbacks.assistant requires an [llm] section",
        ));
    }

    Ok(())
}
