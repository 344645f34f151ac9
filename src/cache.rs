//! File-backed URL-to-text cache.
//!
//! The cache stores post-processed extracted text, not wire bytes: one
//! entry per distinct requested URL, last write wins. The store is loaded
//! once at startup and rewritten in full after each new entry, so a
//! partial write can only ever affect the file being replaced wholesale,
//! never individual previously saved entries in memory.
//!
//! On-disk format, one entry at a time: the URL, a literal `+++++++`
//! separator, the text (which may span lines), then a line of `=`
//! characters terminating the entry.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error_handling::CacheError;

/// Separator between the URL key and the text value.
const KEY_VALUE_SEPARATOR: &str = "+++++++";
/// Line terminating one cache entry.
const ENTRY_SEPARATOR: &str = "====================================";

/// Keyed store of URL -> extracted text, persisted to a flat file.
#[derive(Debug)]
pub struct TextCache {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl TextCache {
    /// Loads the cache from `path`.
    ///
    /// A missing file is not an error: it yields an empty cache that will
    /// create the file on first persist.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Read` when the file exists but cannot be read.
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("no existing cache at {}", path.display());
                return Ok(Self {
                    path: path.to_path_buf(),
                    entries: HashMap::new(),
                });
            }
            Err(source) => {
                return Err(CacheError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let entries = parse_entries(&content);
        info!("loaded {} cache entries from {}", entries.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Looks up the extracted text for a URL.
    pub fn get(&self, url: &str) -> Option<&str> {
        self.entries.get(url).map(String::as_str)
    }

    /// Stores extracted text for a URL. Last write wins.
    pub fn put(&mut self, url: String, text: String) {
        self.entries.insert(url, text);
    }

    /// Writes every entry back to the cache file.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Write` when the file cannot be written.
    pub fn persist(&self) -> Result<(), CacheError> {
        let mut output = String::new();
        for (url, text) in &self.entries {
            output.push_str(url);
            output.push_str(KEY_VALUE_SEPARATOR);
            output.push_str(text);
            output.push('\n');
            output.push_str(ENTRY_SEPARATOR);
            output.push('\n');
        }

        fs::write(&self.path, output).map_err(|source| CacheError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!("persisted {} cache entries to {}", self.entries.len(), self.path.display());
        Ok(())
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parses the on-disk format into a map.
///
/// Values may span multiple lines; lines after the key line accumulate
/// until the entry separator. Values are trimmed on load.
fn parse_entries(content: &str) -> HashMap<String, String> {
    let mut entries = HashMap::new();
    let mut current_url: Option<String> = None;
    let mut value = String::new();

    for line in content.lines() {
        if line == ENTRY_SEPARATOR {
            if let Some(url) = current_url.take() {
                entries.insert(url, value.trim().to_string());
            }
            value.clear();
        } else if let Some((url, first)) = line.split_once(KEY_VALUE_SEPARATOR) {
            current_url = Some(url.to_string());
            value.push_str(first);
            value.push('\n');
        } else if current_url.is_some() {
            value.push_str(line);
            value.push('\n');
        }
    }

    // an unterminated trailing entry still counts
    if let Some(url) = current_url {
        entries.insert(url, value.trim().to_string());
    }

    entries
}
