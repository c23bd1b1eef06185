//! Keyword inference configuration types.

use serde::{Deserialize, Serialize};

/// Rank-band weight tables and thresholds for keyword inference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordConfig {
    /// Weights when an engine yields 10 or more fragments:
    /// first two, first quarter, first half, first three quarters, rest.
    #[serde(default = "default_weights_many")]
    pub weights_many: Vec<f64>,
    /// Weights for 5 to 9 fragments: first two, first half, rest.
    #[serde(default = "default_weights_some")]
    pub weights_some: Vec<f64>,
    /// Weights for fewer than 5 fragments: first two, rest.
    #[serde(default = "default_weights_few")]
    pub weights_few: Vec<f64>,
    /// Minimum similarity between a fragment and the phrase.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    /// Score gap above which the top keyword wins outright.
    #[serde(default = "default_diff_score_threshold")]
    pub diff_score_threshold: f64,
    /// Noise words removed from the phrase before searching.
    #[serde(default = "default_noise_words")]
    pub noise_words: Vec<String>,
    /// Number of phrases whose inferred keyword is remembered.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
    #[serde(default = "default_bing_url")]
    pub bing_url: String,
    #[serde(default = "default_baidu_url")]
    pub baidu_url: String,
    /// Per-request timeout for the search engines.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            weights_many: default_weights_many(),
            weights_some: default_weights_some(),
            weights_few: default_weights_few(),
            similarity_threshold: default_similarity_threshold(),
            diff_score_threshold: default_diff_score_threshold(),
            noise_words: default_noise_words(),
            cache_capacity: default_cache_capacity(),
            bing_url: default_bing_url(),
            baidu_url: default_baidu_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_weights_many() -> Vec<f64> {
    vec![10.0, 3.0, 2.0, 0.5, 0.5]
}

fn default_weights_some() -> Vec<f64> {
    vec![10.0, 2.0, 1.0]
}

fn default_weights_few() -> Vec<f64> {
    vec![10.0, 2.0]
}

fn default_similarity_threshold() -> f64 {
    0.2
}

fn default_diff_score_threshold() -> f64 {
    30.0
}

fn default_noise_words() -> Vec<String> {
    [
        "中字", "韩语", "双字", "中英", "日语", "双语", "国粤", "HD", "BD", "中日", "粤语",
        "完全版", "法语", "西班牙语", "HRHDTVAC3264", "未删减版", "未删减", "国语", "字幕组",
        "人人影视", "www66ystv", "人人影视制作", "英语", "www6vhaotv", "无删减版", "完成版",
        "德意",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_cache_capacity() -> u64 {
    512
}

fn default_bing_url() -> String {
    "https://www.cn.bing.com/search".to_string()
}

fn default_baidu_url() -> String {
    "https://www.baidu.com/s".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}
