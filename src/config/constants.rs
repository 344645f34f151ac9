//! Configuration constants.
//!
//! This module defines all operational constants used throughout the
//! application: redirect limits, network timeouts, default header values,
//! and cache/search parameters.

// Redirect handling
/// Maximum number of redirect hops followed within one fetch.
/// Together with the visited-URL set this bounds worst-case work and
/// guarantees termination on adversarial redirect chains.
pub const MAX_REDIRECTS: usize = 5;

// Network operation timeouts
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;
/// TLS handshake timeout in seconds
pub const TLS_HANDSHAKE_TIMEOUT_SECS: u64 = 5;
/// Default full-response read timeout in seconds.
///
/// The read phase blocks until the peer closes the connection, so a stalled
/// server would otherwise hang the fetch forever. Overridable via
/// `--timeout-seconds`.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Socket read chunk size in bytes
pub const READ_CHUNK_SIZE: usize = 4096;

/// Default User-Agent string for HTTP requests.
///
/// Mimics a current desktop Chrome; some sites serve degraded or blocked
/// responses to unknown agents. Overridable via `--user-agent`.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Default Accept header value (HTML-leaning content negotiation)
pub const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml";
/// Accept header value used when re-requesting a JSON representation
pub const JSON_ACCEPT: &str = "application/json";
/// Accept-Language header value sent with every request
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

// Cache store
/// Default cache file path
pub const DEFAULT_CACHE_FILE: &str = "cache.txt";

// Search
/// Search endpoint the query is URL-encoded against (HTML results page)
pub const SEARCH_ENDPOINT: &str = "https://duckduckgo.com/html/?q=";
/// Maximum number of search results listed
pub const MAX_SEARCH_RESULTS: usize = 10;

// Content reduction
/// Minimum trimmed fragment length (exclusive) kept by the fragment filter
pub const MIN_FRAGMENT_CHARS: usize = 3;
/// Sentinel text returned when a response has no header/body boundary
pub const INVALID_RESPONSE_TEXT: &str = "Invalid response format";
