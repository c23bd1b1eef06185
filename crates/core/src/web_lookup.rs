//! Catalog website search.
//!
//! Last-resort lookup that reads the catalog website's own search page and
//! collects the entries it links to.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::debug;

use crate::catalog::MediaType;
use crate::keyword::BROWSER_USER_AGENT;

/// Errors from the website lookup.
#[derive(Debug, Error)]
pub enum WebLookupError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected status: {0}")]
    Status(u16),
}

/// An entry linked from the search page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WebHit {
    pub media_type: MediaType,
    pub id: u32,
}

/// Looks a name up on the catalog website.
#[async_trait]
pub trait WebLookup: Send + Sync {
    /// Distinct entries linked for `name`. A Series hint restricts the
    /// results to series links.
    async fn lookup(&self, name: &str, media_type: MediaType)
        -> Result<Vec<WebHit>, WebLookupError>;
}

static ANY_RESULT: Lazy<Selector> = Lazy::new(|| Selector::parse("a[data-id]").unwrap());

static SERIES_RESULT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[data-id][data-media-type='tv']").unwrap());

/// Parse a link such as `/movie/27205-inception` or `/tv/100088`.
fn parse_result_link(href: &str) -> Option<WebHit> {
    let (media_type, rest) = if let Some(rest) = href.strip_prefix("/movie/") {
        (MediaType::Movie, rest)
    } else if let Some(rest) = href.strip_prefix("/tv/") {
        (MediaType::Series, rest)
    } else {
        return None;
    };

    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    let id = digits.parse().ok()?;
    Some(WebHit { media_type, id })
}

/// Collect the distinct result links of a search page, in page order.
pub fn parse_search_page(body: &str, media_type: MediaType) -> Vec<WebHit> {
    let html = Html::parse_document(body);
    let selector = if media_type == MediaType::Series {
        &*SERIES_RESULT
    } else {
        &*ANY_RESULT
    };

    let mut hits: Vec<WebHit> = Vec::new();
    for hit in html
        .select(selector)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(parse_result_link)
    {
        if !hits.contains(&hit) {
            hits.push(hit);
        }
    }
    hits
}

/// Website lookup against themoviedb.org.
pub struct TmdbWebLookup {
    client: Client,
    web_url: String,
}

impl TmdbWebLookup {
    pub fn new(web_url: impl Into<String>, timeout_secs: u64) -> Result<Self, WebLookupError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(BROWSER_USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            web_url: web_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl WebLookup for TmdbWebLookup {
    async fn lookup(
        &self,
        name: &str,
        media_type: MediaType,
    ) -> Result<Vec<WebHit>, WebLookupError> {
        let url = format!(
            "{}/search?query={}",
            self.web_url,
            urlencoding::encode(name)
        );
        debug!("TMDB website search: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(WebLookupError::Status(status.as_u16()));
        }
        let body = response.text().await?;

        Ok(parse_search_page(&body, media_type))
    }
}
