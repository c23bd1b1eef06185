//! Web search engines used for keyword inference.
//!
//! Engines fetch a results page; the structural regions worth reading are
//! fixed per engine and parsed here.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::debug;

/// Browser-like user agent; both engines serve stripped pages otherwise.
pub(crate) const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Errors from a search engine request.
#[derive(Debug, Error)]
pub enum SearchEngineError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected status: {0}")]
    Status(u16),
}

/// What one results page contributes to keyword inference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    /// Title of the knowledge-panel entity, with any trailing "(YYYY)" removed.
    pub entity_title: Option<String>,
    /// Whether the knowledge panel describes a movie.
    pub is_movie_entity: bool,
    /// Highlighted fragments in document order.
    pub fragments: Vec<String>,
}

/// A web search engine.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Engine name for logging.
    fn name(&self) -> &str;

    /// Search for `phrase` and parse the results page.
    async fn search(&self, phrase: &str) -> Result<SearchPage, SearchEngineError>;
}

const BING_FRAGMENT_REGIONS: &[&str] = &[
    "#sp_requery strong",
    "#sp_recourse strong",
    "#tile_link_cn strong",
    ".b_ad .ad_esltitle~div strong",
    "h2 strong",
    ".b_caption p strong",
    ".b_snippetBigText strong",
    ".recommendationsTableTitle+.b_slideexp strong",
    ".recommendationsTableTitle+table strong",
    ".recommendationsTableTitle+ul strong",
    ".pageRecoContainer .b_module_expansion_control strong",
    ".pageRecoContainer .b_title>strong",
    ".b_rs strong",
    ".b_rrsr strong",
    "#dict_ans strong",
    ".b_listnav>.b_ans_stamp>strong",
    "#b_content #ans_nws .na_cnt strong",
    ".adltwrnmsg strong",
];

static BING_FRAGMENTS: Lazy<Selector> =
    Lazy::new(|| Selector::parse(&BING_FRAGMENT_REGIONS.join(",")).unwrap());

static BING_ENTITY_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("aside h2[class='b_entityTitle']").unwrap());

static BING_MOVIE_ENTITY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("aside div[data-feedbk-ids='Movie']").unwrap());

static BAIDU_FRAGMENTS: Lazy<Selector> = Lazy::new(|| Selector::parse("em").unwrap());

static TRAILING_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\(\d{4}\)$").unwrap());

fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<String>();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Parse a Bing results page.
pub fn parse_bing_page(body: &str) -> SearchPage {
    let html = Html::parse_document(body);

    let entity_title = html
        .select(&BING_ENTITY_TITLE)
        .next()
        .and_then(element_text)
        .map(|title| TRAILING_YEAR.replace(&title, "").into_owned())
        .filter(|title| !title.is_empty());

    let is_movie_entity =
        entity_title.is_some() && html.select(&BING_MOVIE_ENTITY).next().is_some();

    let fragments = html.select(&BING_FRAGMENTS).filter_map(element_text).collect();

    SearchPage {
        entity_title,
        is_movie_entity,
        fragments,
    }
}

/// Parse a Baidu results page.
pub fn parse_baidu_page(body: &str) -> SearchPage {
    let html = Html::parse_document(body);
    SearchPage {
        entity_title: None,
        is_movie_entity: false,
        fragments: html.select(&BAIDU_FRAGMENTS).filter_map(element_text).collect(),
    }
}

fn build_client(timeout_secs: u64) -> Result<Client, SearchEngineError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(BROWSER_USER_AGENT)
        .build()?)
}

async fn fetch_page(
    client: &Client,
    url: &str,
    params: &[(&str, &str)],
) -> Result<String, SearchEngineError> {
    let response = client.get(url).query(params).send().await?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(SearchEngineError::Status(status.as_u16()));
    }
    Ok(response.text().await?)
}

/// Bing web search.
pub struct BingEngine {
    client: Client,
    base_url: String,
}

impl BingEngine {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, SearchEngineError> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl SearchEngine for BingEngine {
    fn name(&self) -> &str {
        "bing"
    }

    async fn search(&self, phrase: &str) -> Result<SearchPage, SearchEngineError> {
        debug!("Bing search: '{}'", phrase);
        let body = fetch_page(
            &self.client,
            &self.base_url,
            &[("q", phrase), ("qs", "n"), ("form", "QBRE"), ("sp", "-1")],
        )
        .await?;
        Ok(parse_bing_page(&body))
    }
}

/// Baidu web search.
pub struct BaiduEngine {
    client: Client,
    base_url: String,
}

impl BaiduEngine {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, SearchEngineError> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl SearchEngine for BaiduEngine {
    fn name(&self) -> &str {
        "baidu"
    }

    async fn search(&self, phrase: &str) -> Result<SearchPage, SearchEngineError> {
        debug!("Baidu search: '{}'", phrase);
        let body = fetch_page(
            &self.client,
            &self.base_url,
            &[("ie", "utf-8"), ("tn", "baiduhome_pg"), ("wd", phrase)],
        )
        .await?;
        Ok(parse_baidu_page(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BING_PAGE: &str = r##"
        <html><body>
          <div id="b_content">
            <ol id="b_results">
              <li><h2><a href="#">盗梦空间 <strong>Inception</strong></a></h2>
                <div class="b_caption"><p><strong>Inception</strong> is a 2010 film.</p></div>
              </li>
              <li><div class="b_caption"><p>Directed by <strong>Christopher Nolan</strong></p></div></li>
              <li><p>Outside any region <strong>ignored</strong></p></li>
            </ol>
          </div>
          <aside>
            <h2 class="b_entityTitle">Inception (2010)</h2>
            <div data-feedbk-ids="Movie"></div>
          </aside>
        </body></html>
    "##;

    #[test]
    fn test_parse_bing_entity_and_fragments() {
        let page = parse_bing_page(BING_PAGE);
        assert_eq!(page.entity_title.as_deref(), Some("Inception"));
        assert!(page.is_movie_entity);
        assert_eq!(
            page.fragments,
            vec!["Inception", "Inception", "Christopher Nolan"]
        );
    }

    #[test]
    fn test_parse_bing_without_entity() {
        let page = parse_bing_page(
            r#"<html><body><aside><div data-feedbk-ids="Movie"></div></aside>
               <div class="b_rs"><strong>三体 电视剧</strong></div></body></html>"#,
        );
        assert_eq!(page.entity_title, None);
        assert!(!page.is_movie_entity);
        assert_eq!(page.fragments, vec!["三体 电视剧"]);
    }

    #[test]
    fn test_parse_baidu_fragments() {
        let page = parse_baidu_page(
            r#"<html><body><h3><em>流浪地球</em>2 电影</h3><p><em>流浪地球</em> 豆瓣</p><em> </em></body></html>"#,
        );
        assert_eq!(page.fragments, vec!["流浪地球", "流浪地球"]);
        assert_eq!(page.entity_title, None);
    }
}
