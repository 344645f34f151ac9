//! Request target parsing and redirect resolution.
//!
//! A `RequestTarget` is the parsed form of an http(s) URL: scheme, host,
//! port, path, and query. `resolve_redirect` turns a `Location` header
//! value (absolute, host-relative, or path-relative) into a new absolute
//! target against the URL that produced it.

use url::Url;

use crate::error_handling::FetchError;

/// URL scheme. Only plain and TLS-wrapped HTTP are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    /// The default port for this scheme (80 for http, 443 for https).
    pub fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

/// The parsed form of a request URL.
///
/// Invariants established by [`RequestTarget::parse`]: `port` carries the
/// scheme default when the URL named none, and `path` is `/` when the URL
/// had an empty path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub query: Option<String>,
}

impl RequestTarget {
    /// Parses a URL string into a `RequestTarget`.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::MalformedUrl` if the string is not parsable,
    /// uses a scheme other than http/https, or has no host.
    pub fn parse(input: &str) -> Result<Self, FetchError> {
        let malformed = |reason: String| FetchError::MalformedUrl {
            url: input.to_string(),
            reason,
        };

        let parsed = Url::parse(input).map_err(|e| malformed(e.to_string()))?;

        let scheme = match parsed.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => return Err(malformed(format!("unsupported scheme '{other}'"))),
        };

        let host = parsed
            .host_str()
            .ok_or_else(|| malformed("missing host".to_string()))?
            .to_string();
        let port = parsed.port().unwrap_or_else(|| scheme.default_port());
        let path = if parsed.path().is_empty() {
            "/".to_string()
        } else {
            parsed.path().to_string()
        };

        Ok(Self {
            scheme,
            host,
            port,
            path,
            query: parsed.query().map(str::to_string),
        })
    }

    /// The origin of this target: `scheme://host`, with the port appended
    /// when it differs from the scheme default.
    pub fn origin(&self) -> String {
        if self.port == self.scheme.default_port() {
            format!("{}://{}", self.scheme.as_str(), self.host)
        } else {
            format!("{}://{}:{}", self.scheme.as_str(), self.host, self.port)
        }
    }

    /// The value of the `Host` header for this target.
    pub fn host_header(&self) -> String {
        if self.port == self.scheme.default_port() {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// The request-line path: `path` plus `?query` when present.
    pub fn request_path(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }

    /// The full URL string for this target.
    pub fn to_url(&self) -> String {
        format!("{}{}", self.origin(), self.request_path())
    }

    /// The directory portion of the path: everything up to and including
    /// the last `/`, or `/` when the path has none.
    fn directory(&self) -> String {
        match self.path.rfind('/') {
            Some(idx) => self.path[..=idx].to_string(),
            None => "/".to_string(),
        }
    }
}

/// Resolves a `Location` header value against the target it came from.
///
/// The case ordering is significant: absolute-path and absolute-URL forms
/// must be recognized before falling back to directory-relative
/// resolution, or sibling-relative redirects resolve incorrectly.
///
/// - Leading `/`: absolute path on the same origin.
/// - `http://` or `https://` prefix: a new absolute URL, parsed directly.
/// - Anything else: resolved against the directory of the base path (the
///   base query is discarded).
///
/// # Errors
///
/// Returns `FetchError::MalformedUrl` if the resolved URL is unparsable.
pub fn resolve_redirect(base: &RequestTarget, location: &str) -> Result<RequestTarget, FetchError> {
    let absolute = if location.starts_with('/') {
        format!("{}{}", base.origin(), location)
    } else if location.starts_with("http://") || location.starts_with("https://") {
        location.to_string()
    } else {
        format!("{}{}{}", base.origin(), base.directory(), location)
    };
    RequestTarget::parse(&absolute)
}
