//! Rank-banded fragment scoring and keyword selection.

use std::cmp::Ordering;

use super::KeywordConfig;

/// Score awarded to the search engine's own entity title.
pub const ENTITY_TITLE_SCORE: f64 = 200.0;

/// Score at or above which the top keyword always wins.
const DECISIVE_SCORE: f64 = 100.0;

/// Weight of the fragment at `index` in an engine's list of `total` fragments.
pub fn rank_weight(index: usize, total: usize, config: &KeywordConfig) -> f64 {
    let weight = |table: &[f64], slot: usize| table.get(slot).copied().unwrap_or(0.0);

    if total < 5 {
        let table = &config.weights_few;
        if index < 2 {
            weight(table, 0)
        } else {
            weight(table, 1)
        }
    } else if total < 10 {
        let table = &config.weights_some;
        if index < 2 {
            weight(table, 0)
        } else if index < total / 2 {
            weight(table, 1)
        } else {
            weight(table, 2)
        }
    } else {
        let table = &config.weights_many;
        let quarter = total / 4;
        let half = total / 2;
        if index < 2 {
            weight(table, 0)
        } else if index < quarter {
            weight(table, 1)
        } else if index < half {
            weight(table, 2)
        } else if index < quarter + half {
            weight(table, 3)
        } else {
            weight(table, 4)
        }
    }
}

/// Accumulated scores per lower-cased keyword, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ScoreBoard {
    scores: Vec<(String, f64)>,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `score` to `keyword`. Keys are compared case-insensitively.
    pub fn add(&mut self, keyword: &str, score: f64) {
        let key = keyword.trim().to_lowercase();
        if key.is_empty() {
            return;
        }
        match self.scores.iter_mut().find(|(k, _)| *k == key) {
            Some((_, total)) => *total += score,
            None => self.scores.push((key, score)),
        }
    }

    /// Score one engine's fragment list by rank band.
    pub fn add_ranked(&mut self, fragments: &[String], config: &KeywordConfig) {
        let total = fragments.len();
        for (index, fragment) in fragments.iter().enumerate() {
            self.add(fragment, rank_weight(index, total, config));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn score(&self, keyword: &str) -> Option<f64> {
        let key = keyword.trim().to_lowercase();
        self.scores.iter().find(|(k, _)| *k == key).map(|(_, s)| *s)
    }

    /// Keywords by descending score. Ties keep first-seen order.
    pub fn ranked(&self) -> Vec<(String, f64)> {
        let mut ranked = self.scores.clone();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked
    }
}

/// Pick the keyword from a ranked list.
///
/// When the runner-up contains the leader, the longer runner-up usually is
/// the fuller title, unless the leader is clearly ahead or removing every
/// copy of the leader from the runner-up leaves the leader again.
pub fn choose_keyword(ranked: &[(String, f64)], diff_threshold: f64) -> Option<String> {
    let (first, first_score) = ranked.first()?;
    let Some((second, second_score)) = ranked.get(1) else {
        return Some(first.clone());
    };

    if !second.contains(first.as_str()) {
        return Some(first.clone());
    }

    let keyword = if *first_score >= DECISIVE_SCORE
        || first_score - second_score > diff_threshold
        || second.replace(first.as_str(), "").trim() == first
    {
        first
    } else {
        // Purely numeric leaders fall through to the runner-up as well.
        second
    };
    Some(keyword.clone())
}
