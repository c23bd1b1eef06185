//! Release name parsing.
//!
//! Turns a raw file or release name into a title plus year, season and
//! episode hints. This is a simple heuristic parser; callers that need more
//! can plug their own [`NameParser`] into the resolver front-ends.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::catalog::MediaType;

/// What a raw name says about the media it refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedName {
    /// Title portion of the name.
    pub name: String,
    /// Release year, if one was found.
    pub year: Option<u32>,
    /// Series when season or episode markers were found, otherwise Unknown.
    pub media_type: MediaType,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

/// Extracts a [`ParsedName`] from a raw release name.
pub trait NameParser: Send + Sync {
    fn parse(&self, raw: &str) -> ParsedName;
}

static EXTENSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(mkv|mp4|avi|ts|m2ts|rmvb|wmv|mov|flv|iso|srt|ass)$").unwrap()
});

static LEADING_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[\[【][^\]】]*[\]】]").unwrap());

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[._\s]+").unwrap());

static SEASON_EPISODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bS(\d{1,2}) ?E(\d{1,4})\b").unwrap());

static SEASON_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\bS(\d{1,2})\b",
        r"(?i)\bSeason ?(\d{1,2})\b",
        r"第 ?(\d{1,2}) ?季",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static EPISODE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\bEP?(\d{1,4})\b",
        r"第 ?(\d{1,4}) ?[集话話]",
        r" - (\d{1,4})\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static QUALITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(2160p|1080p|1080i|720p|576p|480p|4k|uhd|bluray|blu-ray|bdrip|brrip|web-dl|webrip|hdtv|hdrip|dvdrip|remux|x264|x265|h264|h265|hevc|avc|hdr|10bit|aac|dts|proper|repack)\b",
    )
    .unwrap()
});

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(19\d{2}|20\d{2})\b").unwrap());

/// Default heuristic parser.
#[derive(Debug, Clone, Default)]
pub struct ReleaseNameParser;

impl ReleaseNameParser {
    pub fn new() -> Self {
        Self
    }

    /// Strip the extension and a leading `[group]` tag, and turn separators
    /// into single spaces.
    fn clean(raw: &str) -> String {
        let without_ext = EXTENSION.replace(raw.trim(), "");
        let without_group = LEADING_GROUP.replace(&without_ext, "");
        let base = if without_group.trim().is_empty() {
            without_ext.as_ref()
        } else {
            without_group.as_ref()
        };
        SEPARATORS.replace_all(base, " ").trim().to_string()
    }

    /// First capture of the first pattern that matches, with its start offset.
    fn first_number(patterns: &[Regex], text: &str) -> Option<(u32, usize)> {
        patterns.iter().find_map(|re| {
            let caps = re.captures(text)?;
            let start = caps.get(0)?.start();
            let value = caps.get(1)?.as_str().parse::<u32>().ok()?;
            Some((value, start))
        })
    }
}

impl NameParser for ReleaseNameParser {
    fn parse(&self, raw: &str) -> ParsedName {
        let cleaned = Self::clean(raw);
        let mut cut = cleaned.len();
        let mut season = None;
        let mut episode = None;

        if let Some(caps) = SEASON_EPISODE.captures(&cleaned) {
            season = caps.get(1).and_then(|m| m.as_str().parse().ok());
            episode = caps.get(2).and_then(|m| m.as_str().parse().ok());
            if let Some(m) = caps.get(0) {
                cut = cut.min(m.start());
            }
        } else {
            if let Some((value, start)) = Self::first_number(&SEASON_PATTERNS, &cleaned) {
                season = Some(value);
                cut = cut.min(start);
            }
            if let Some((value, start)) = Self::first_number(&EPISODE_PATTERNS, &cleaned) {
                episode = Some(value);
                cut = cut.min(start);
            }
        }

        if let Some(m) = QUALITY.find(&cleaned) {
            cut = cut.min(m.start());
        }

        // A year at the very start is part of the title ("1917", "2012").
        let years: Vec<_> = YEAR.find_iter(&cleaned).collect();
        let year_in_title = years.iter().rev().find(|m| m.start() > 0 && m.start() < cut);
        let year_match = year_in_title.or_else(|| years.iter().find(|m| m.start() >= cut));

        let title_end = year_in_title.map_or(cut, |m| m.start());
        let name = cleaned[..title_end]
            .trim_end_matches(|c: char| c.is_whitespace() || "([【-".contains(c))
            .trim()
            .to_string();

        let media_type = if season.is_some() || episode.is_some() {
            MediaType::Series
        } else {
            MediaType::Unknown
        };

        ParsedName {
            name,
            year: year_match.and_then(|m| m.as_str().parse().ok()),
            media_type,
            season,
            episode,
        }
    }
}
