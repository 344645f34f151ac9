//! Redirect-chain resolution.
//!
//! This module drives repeated transport calls for one top-level fetch,
//! following redirects manually until a non-redirect response or a
//! terminal failure. The tracking state is created fresh inside every
//! fetch and threaded explicitly; nothing is shared across fetches.

use std::collections::HashSet;
use std::time::Duration;

use log::{info, warn};

use crate::config::{Config, MAX_REDIRECTS};
use crate::error_handling::FetchError;
use crate::response::RawResponse;
use crate::target::{resolve_redirect, RequestTarget};
use crate::transport;

/// Redirect-tracking state for a single fetch operation.
///
/// Scoped to one top-level fetch: reset at the start of every independent
/// fetch and never shared across concurrent fetches. Invariants: `hops`
/// never exceeds [`MAX_REDIRECTS`], and no URL appears twice in `visited`
/// within the same fetch.
#[derive(Debug, Default)]
struct RedirectState {
    visited: HashSet<String>,
    hops: usize,
}

impl RedirectState {
    /// Checks both termination guards for `url` and records it as visited.
    ///
    /// Both guards are necessary: a short cycle of distinct URLs needs the
    /// visited-set check, a long chain of distinct URLs needs the ceiling.
    fn admit(&mut self, url: &str) -> Result<(), FetchError> {
        if self.visited.contains(url) {
            return Err(FetchError::RedirectLoop(url.to_string()));
        }
        if self.hops >= MAX_REDIRECTS {
            return Err(FetchError::TooManyRedirects(MAX_REDIRECTS));
        }
        self.visited.insert(url.to_string());
        Ok(())
    }
}

/// Whether a status code is a redirect this controller follows.
fn is_redirect(status: u16) -> bool {
    matches!(status, 301 | 302 | 307 | 308)
}

/// Fetches a URL, following redirects, and returns the final raw response.
///
/// This is the only looping construct in the request path: a bounded,
/// observable loop, never recursion. Each iteration admits the current URL
/// against the loop/ceiling guards, performs one transport call, and
/// either follows a redirect or returns. Any non-redirect status is
/// returned as-is, including non-2xx responses; a redirect status without
/// a `Location` header is likewise terminal.
///
/// # Arguments
///
/// * `url` - The URL to fetch
/// * `accept` - Value of the `Accept` header for every hop
/// * `config` - Timeout and User-Agent settings
///
/// # Errors
///
/// Returns `MalformedUrl` for an unparsable URL or redirect target,
/// `RedirectLoop`/`TooManyRedirects` when a guard trips, or a
/// `Transport` error from the failing hop.
pub async fn fetch_raw(
    url: &str,
    accept: &str,
    config: &Config,
) -> Result<RawResponse, FetchError> {
    let read_timeout = Duration::from_secs(config.timeout_seconds);
    let mut state = RedirectState::default();
    let mut target = RequestTarget::parse(url)?;
    let mut current = url.to_string();

    loop {
        state.admit(&current)?;

        let bytes = transport::send(&target, accept, &config.user_agent, read_timeout).await?;
        let response = RawResponse::from_bytes(bytes);

        let status = match response.status_code() {
            Some(status) => status,
            None => {
                warn!("no parsable status line from {current}");
                return Ok(response);
            }
        };

        if is_redirect(status) {
            if let Some(location) = response.redirect_location() {
                target = resolve_redirect(&target, &location)?;
                current = target.to_url();
                state.hops += 1;
                info!("Following redirect #{} to: {}", state.hops, current);
                continue;
            }
            // Redirect status but no Location header: unusual, terminal
            warn!("redirect status {status} from {current} without a Location header");
        }

        return Ok(response);
    }
}
