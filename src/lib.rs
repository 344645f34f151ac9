//! webgrab library: fetch web pages over raw sockets and reduce them to
//! readable text.
//!
//! Given a URL, webgrab performs a manually constructed HTTP(S) request,
//! follows redirects with loop and hop-ceiling protection, splits the raw
//! response at the header/body boundary, and either passes structured
//! payloads through untouched or strips HTML down to denoised plain text.
//! Extracted text is cached on disk keyed by URL. A search entry point
//! queries a search engine and scrapes the result links for follow-up
//! fetches.
//!
//! # Example
//!
//! ```no_run
//! use webgrab::{fetch_page, Config, TextCache};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let mut cache = TextCache::load(&config.cache_path)?;
//! let outcome = fetch_page("https://example.com", &config, &mut cache).await?;
//! println!("{}", outcome.text);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! The fetch functions require a Tokio runtime. Use `#[tokio::main]` in
//! your application or call them from an async context.

mod cache;
pub mod config;
mod error_handling;
mod fetch;
pub mod initialization;
mod reduce;
mod response;
mod search;
mod target;
mod transport;

// Re-export public API
pub use cache::TextCache;
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{CacheError, FetchError, TransportError};
pub use fetch::fetch_raw;
pub use reduce::{extract_text, reduce_html};
pub use response::RawResponse;
pub use run::{fetch_page, FetchOutcome};
pub use search::{search, SearchResult};
pub use target::{resolve_redirect, RequestTarget, Scheme};

// Internal run module (cache-aware fetch orchestration)
mod run {
    use log::{debug, info, warn};

    use crate::cache::TextCache;
    use crate::config::{Config, DEFAULT_ACCEPT, JSON_ACCEPT};
    use crate::error_handling::FetchError;
    use crate::fetch::fetch_raw;
    use crate::reduce::extract_text;

    /// Result of one top-level fetch: the extracted text and where it
    /// came from.
    #[derive(Debug, Clone)]
    pub struct FetchOutcome {
        /// The URL as requested
        pub url: String,
        /// The extracted text (reduced HTML, raw JSON, or the sentinel)
        pub text: String,
        /// Whether the text was served from the cache without a request
        pub from_cache: bool,
    }

    /// Fetches a URL and returns its extracted text, consulting and
    /// updating the cache.
    ///
    /// The cache is checked before any network activity. On a miss the
    /// URL is fetched with the default Accept header; when the response
    /// declares `application/json` the URL is fetched once more asking
    /// for JSON explicitly, and that response is the one extracted. The
    /// new entry is stored and the cache persisted before returning.
    /// Redirect-tracking state is created fresh inside every call, so
    /// repeated and nested fetches are independent.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch
    /// * `config` - Timeouts, User-Agent, and cache behavior
    /// * `cache` - The loaded text cache to consult and update
    ///
    /// # Errors
    ///
    /// Returns the `FetchError` that terminated the fetch. A failed cache
    /// persist is logged as a warning, not an error: the fetch itself
    /// succeeded.
    pub async fn fetch_page(
        url: &str,
        config: &Config,
        cache: &mut TextCache,
    ) -> Result<FetchOutcome, FetchError> {
        if !config.no_cache {
            if let Some(text) = cache.get(url) {
                info!("returning cached response for: {url}");
                return Ok(FetchOutcome {
                    url: url.to_string(),
                    text: text.to_string(),
                    from_cache: true,
                });
            }
        }

        info!("fetching from server: {url}");
        let mut response = fetch_raw(url, DEFAULT_ACCEPT, config).await?;

        if response.content_type().as_deref() == Some("application/json") {
            debug!("re-requesting {url} with Accept: {JSON_ACCEPT}");
            response = fetch_raw(url, JSON_ACCEPT, config).await?;
        }

        let text = extract_text(&response);

        if !config.no_cache {
            cache.put(url.to_string(), text.clone());
            if let Err(e) = cache.persist() {
                warn!("failed to persist cache: {e}");
            }
        }

        Ok(FetchOutcome {
            url: url.to_string(),
            text,
            from_cache: false,
        })
    }
}
