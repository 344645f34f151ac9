//! Error types for fetching, transport, caching, and initialization.
//!
//! One failed fetch surfaces to the caller as a single `FetchError` with a
//! human-readable message; nothing is retried automatically. A failure
//! terminates the current fetch only - cache contents and process state
//! survive it.

use std::io;
use std::path::PathBuf;

use log::SetLoggerError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    Logger(#[from] SetLoggerError),
}

/// Network-level failures inside a single transport call.
///
/// Each variant names the phase that failed: connecting, naming the TLS
/// peer, handshaking, or exchanging bytes. Timeouts get their own variants
/// so callers can tell a slow peer from an unreachable one.
#[derive(Error, Debug)]
pub enum TransportError {
    /// TCP connection failed.
    #[error("failed to connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        source: io::Error,
    },

    /// TCP connection did not complete within the configured timeout.
    #[error("connection to {host}:{port} timed out after {seconds}s")]
    ConnectTimeout { host: String, port: u16, seconds: u64 },

    /// The host is not a valid TLS server name.
    #[error("invalid server name '{0}'")]
    ServerName(String),

    /// TLS handshake failed.
    #[error("TLS handshake with {host} failed: {source}")]
    Tls { host: String, source: io::Error },

    /// TLS handshake did not complete within the configured timeout.
    #[error("TLS handshake with {host} timed out after {seconds}s")]
    TlsTimeout { host: String, seconds: u64 },

    /// Reading or writing the socket failed mid-exchange.
    #[error("I/O error talking to {host}: {source}")]
    Io { host: String, source: io::Error },

    /// The full response did not arrive within the configured read timeout.
    #[error("no complete response from {host} within {seconds}s")]
    ReadTimeout { host: String, seconds: u64 },
}

/// Failure modes of one top-level fetch operation.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The input (or a redirect target) is not a usable http(s) URL.
    #[error("malformed URL '{url}': {reason}")]
    MalformedUrl { url: String, reason: String },

    /// A network-level failure during one transport call.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A redirect pointed back at a URL already visited within this fetch.
    #[error("redirect loop detected: {0} was already visited")]
    RedirectLoop(String),

    /// The redirect chain exceeded the hop ceiling.
    #[error("too many redirects (max: {0})")]
    TooManyRedirects(usize),

    /// The response has no header/body boundary (CRLF CRLF).
    #[error("invalid response format: no header/body boundary")]
    MalformedResponse,
}

/// Error types for the on-disk text cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Reading the cache file failed (for reasons other than absence).
    #[error("failed to read cache file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    /// Writing the cache file failed.
    #[error("failed to write cache file {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_messages() {
        let err = FetchError::MalformedUrl {
            url: "not a url".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        assert!(err.to_string().contains("not a url"));

        let err = FetchError::TooManyRedirects(5);
        assert_eq!(err.to_string(), "too many redirects (max: 5)");

        let err = FetchError::RedirectLoop("http://a.example/".to_string());
        assert!(err.to_string().contains("http://a.example/"));
    }

    #[test]
    fn test_transport_error_wraps_into_fetch_error() {
        let transport = TransportError::ReadTimeout {
            host: "example.com".to_string(),
            seconds: 30,
        };
        let fetch: FetchError = transport.into();
        assert!(matches!(
            fetch,
            FetchError::Transport(TransportError::ReadTimeout { .. })
        ));
        assert!(fetch.to_string().contains("30s"));
    }
}
