//! Web search via the DuckDuckGo HTML results page.
//!
//! The search component is a downstream consumer of the fetcher: it builds
//! a query URL, fetches the raw response (link extraction needs the raw
//! markup, not the reduced text), and scrapes result links out of it.

use std::collections::HashSet;
use std::sync::LazyLock;

use log::{debug, info, warn};
use scraper::{Html, Selector};
use url::Url;

use crate::config::{Config, DEFAULT_ACCEPT, MAX_SEARCH_RESULTS, SEARCH_ENDPOINT};
use crate::error_handling::FetchError;
use crate::fetch::fetch_raw;

static RESULT_LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.result__a").expect("result link selector is valid"));
static GENERIC_LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("generic link selector is valid"));

/// File extensions skipped by the generic link fallback.
const SKIPPED_EXTENSIONS: [&str; 3] = [".jpg", ".png", ".gif"];

/// One search result: link title and resolved absolute URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
}

/// Builds the search URL by URL-encoding the query against the fixed
/// search-engine template.
pub fn build_search_url(query: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    format!("{SEARCH_ENDPOINT}{encoded}")
}

/// Unwraps and absolutizes a result link.
///
/// DuckDuckGo wraps outbound links in a `/l/?uddg=<encoded-url>` redirect;
/// the real URL is recovered from the `uddg` query parameter. Relative
/// links are resolved against the search engine origin. Fragment-only and
/// `javascript:` links yield `None`.
fn clean_result_url(href: &str) -> Option<String> {
    if href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }

    let absolute = if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{href}")
    } else {
        format!("https://duckduckgo.com/{href}")
    };

    let parsed = Url::parse(&absolute).ok()?;
    if let Some((_, real)) = parsed.query_pairs().find(|(name, _)| name == "uddg") {
        return Some(real.into_owned());
    }
    Some(parsed.to_string())
}

/// Extracts up to `limit` unique search results from a results page body.
///
/// Tries the result-link selector first; when the page yields nothing
/// (layout changes, unexpected markup) a generic link scan with the
/// original skip-filters serves as fallback.
pub fn extract_results(body: &str, limit: usize) -> Vec<SearchResult> {
    let document = Html::parse_document(body);
    let mut seen: HashSet<String> = HashSet::new();
    let mut results: Vec<SearchResult> = Vec::new();

    for element in document.select(&RESULT_LINK_SELECTOR) {
        if results.len() >= limit {
            break;
        }
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let title: String = element.text().collect::<String>().trim().to_string();
        if let Some(url) = clean_result_url(href) {
            if seen.insert(url.clone()) {
                results.push(SearchResult { title, url });
            }
        }
    }

    if results.is_empty() {
        debug!("no dedicated result links found, falling back to generic link scan");
        for element in document.select(&GENERIC_LINK_SELECTOR) {
            if results.len() >= limit {
                break;
            }
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let title: String = element.text().collect::<String>().trim().to_string();
            if title.chars().count() < 5 {
                continue;
            }
            if SKIPPED_EXTENSIONS.iter().any(|ext| href.ends_with(ext)) {
                continue;
            }
            if let Some(url) = clean_result_url(href) {
                if seen.insert(url.clone()) {
                    results.push(SearchResult { title, url });
                }
            }
        }
    }

    results
}

/// Runs a search and returns the top results.
///
/// The raw response feeds the link extraction; a response without a
/// header/body boundary is treated softly as "no results" rather than a
/// failed fetch.
///
/// # Errors
///
/// Propagates `FetchError` from the underlying fetch (the search request
/// itself follows redirects under the same loop/ceiling rules as any
/// other fetch).
pub async fn search(query: &str, config: &Config) -> Result<Vec<SearchResult>, FetchError> {
    let url = build_search_url(query);
    info!("searching: {url}");

    let response = fetch_raw(&url, DEFAULT_ACCEPT, config).await?;
    match response.split() {
        Ok((_, body)) => Ok(extract_results(body, MAX_SEARCH_RESULTS)),
        Err(_) => {
            warn!("search response has no header/body boundary");
            Ok(Vec::new())
        }
    }
}
