//! Configuration types and CLI options.
//!
//! This module defines the enums and the `Config` struct used for
//! command-line argument parsing and for programmatic library use.

use std::path::PathBuf;

use clap::{ArgGroup, Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_CACHE_FILE, DEFAULT_READ_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to
/// most verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Application configuration, parsed from the command line.
///
/// Exactly one of `--url` or `--search` selects the mode. The struct can
/// also be constructed programmatically for library use.
///
/// # Examples
///
/// ```no_run
/// use webgrab::Config;
///
/// let config = Config {
///     url: Some("https://example.com".to_string()),
///     timeout_seconds: 10,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "webgrab",
    version,
    about = "Fetch a URL or search the web, printing a readable plain-text rendering",
    group(ArgGroup::new("mode").args(["url", "search"]))
)]
pub struct Config {
    /// URL to fetch and reduce to readable text
    #[arg(short = 'u', long, value_name = "URL")]
    pub url: Option<String>,

    /// Search terms; the top results are listed and one can be opened
    #[arg(short = 's', long, value_name = "TERM", num_args = 1..)]
    pub search: Vec<String>,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain")]
    pub log_format: LogFormat,

    /// Cache file path (URL -> extracted text)
    #[arg(long, default_value = DEFAULT_CACHE_FILE)]
    pub cache_path: PathBuf,

    /// Bypass the cache for this invocation (no lookup, no store)
    #[arg(long)]
    pub no_cache: bool,

    /// Full-response read timeout in seconds
    #[arg(long, default_value_t = DEFAULT_READ_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: None,
            search: Vec::new(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            cache_path: PathBuf::from(DEFAULT_CACHE_FILE),
            no_cache: false,
            timeout_seconds: DEFAULT_READ_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
