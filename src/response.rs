//! Raw HTTP response inspection and splitting.
//!
//! A `RawResponse` owns the full response text, decoded from the wire
//! bytes exactly once. Two levels of access exist on purpose: cheap
//! line-oriented scans (`status_code`, `redirect_location`) that work even
//! on responses with no header/body boundary, used by the redirect
//! controller; and the strict `split`/`headers`/`content_type` accessors
//! that fail with `MalformedResponse` when the CRLF CRLF boundary is
//! missing.

use crate::error_handling::FetchError;

/// End-of-headers marker.
const HEADER_BOUNDARY: &str = "\r\n\r\n";

/// One full raw HTTP response, immutable after construction.
#[derive(Debug, Clone)]
pub struct RawResponse {
    text: String,
}

impl RawResponse {
    /// Builds a response from the raw bytes read off the socket.
    ///
    /// Decoding is lossy UTF-8: the transport collects the complete byte
    /// sequence first, so multi-byte sequences are never split.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            text: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// The full decoded response text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The status line (first line of the response), if any.
    pub fn status_line(&self) -> Option<&str> {
        self.text.split("\r\n").next().filter(|l| !l.is_empty())
    }

    /// The numeric status code parsed from the status line.
    pub fn status_code(&self) -> Option<u16> {
        self.status_line()?
            .split_whitespace()
            .nth(1)?
            .parse()
            .ok()
    }

    /// The `Location` header value, scanned case-insensitively from the
    /// header lines. The scan stops at the first blank line so body text
    /// can never be mistaken for a header.
    pub fn redirect_location(&self) -> Option<String> {
        for line in self.text.split("\r\n").skip(1) {
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.trim().eq_ignore_ascii_case("location") {
                    return Some(value.trim().to_string());
                }
            }
        }
        None
    }

    /// Splits the response into header block and body at the first
    /// CRLF CRLF boundary.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::MalformedResponse` when the boundary is
    /// absent; no further processing is attempted on such a response.
    pub fn split(&self) -> Result<(&str, &str), FetchError> {
        match self.text.find(HEADER_BOUNDARY) {
            Some(idx) => Ok((
                &self.text[..idx],
                &self.text[idx + HEADER_BOUNDARY.len()..],
            )),
            None => Err(FetchError::MalformedResponse),
        }
    }

    /// The headers as an ordered sequence of (name, value) pairs.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::MalformedResponse` when the header/body
    /// boundary is absent.
    pub fn headers(&self) -> Result<Vec<(String, String)>, FetchError> {
        let (header_block, _) = self.split()?;
        Ok(header_block
            .split("\r\n")
            .skip(1) // status line
            .filter_map(|line| line.split_once(':'))
            .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
            .collect())
    }

    /// The declared media type, without parameters.
    ///
    /// Case-insensitive `Content-Type` lookup; anything after `;` (e.g. a
    /// charset) is discarded. `None` when the header is absent or the
    /// response is malformed.
    pub fn content_type(&self) -> Option<String> {
        let headers = self.headers().ok()?;
        headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .map(|(_, value)| {
                value
                    .split(';')
                    .next()
                    .unwrap_or(value)
                    .trim()
                    .to_string()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(text: &str) -> RawResponse {
        RawResponse::from_bytes(text.as_bytes().to_vec())
    }

    #[test]
    fn test_split_at_boundary() {
        let r = response("HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n<p>hi</p>");
        let (headers, body) = r.split().unwrap();
        assert_eq!(headers, "HTTP/1.1 200 OK\r\nContent-Type: text/html");
        assert_eq!(body, "<p>hi</p>");
    }

    #[test]
    fn test_split_missing_boundary_is_malformed() {
        let r = response("HTTP/1.1 200 OK\r\nContent-Type: text/html");
        assert!(matches!(r.split(), Err(FetchError::MalformedResponse)));
        assert!(matches!(r.headers(), Err(FetchError::MalformedResponse)));
        assert_eq!(r.content_type(), None);
    }

    #[test]
    fn test_status_code() {
        assert_eq!(response("HTTP/1.1 301 Moved Permanently\r\n\r\n").status_code(), Some(301));
        assert_eq!(response("HTTP/1.1 200 OK\r\n\r\nbody").status_code(), Some(200));
        assert_eq!(response("").status_code(), None);
        assert_eq!(response("garbage with no code").status_code(), None);
    }

    #[test]
    fn test_redirect_location_case_insensitive() {
        let r = response("HTTP/1.1 302 Found\r\nlocation:  /next \r\n\r\n");
        assert_eq!(r.redirect_location().as_deref(), Some("/next"));

        let r = response("HTTP/1.1 302 Found\r\nLocation: https://y.com/z\r\n\r\n");
        assert_eq!(r.redirect_location().as_deref(), Some("https://y.com/z"));
    }

    #[test]
    fn test_redirect_location_ignores_body() {
        // "Location:" appearing in the body must not be picked up
        let r = response("HTTP/1.1 200 OK\r\n\r\nLocation: /fake");
        assert_eq!(r.redirect_location(), None);
    }

    #[test]
    fn test_headers_are_ordered_pairs() {
        let r = response("HTTP/1.1 200 OK\r\nServer: test\r\nContent-Type: text/html\r\n\r\n");
        let headers = r.headers().unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0], ("Server".to_string(), "test".to_string()));
        assert_eq!(headers[1].0, "Content-Type");
    }

    #[test]
    fn test_content_type_strips_parameters() {
        let r = response("HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\n\r\n");
        assert_eq!(r.content_type().as_deref(), Some("text/html"));

        let r = response("HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\r\n{}");
        assert_eq!(r.content_type().as_deref(), Some("application/json"));
    }

    #[test]
    fn test_from_bytes_is_binary_safe() {
        // multi-byte UTF-8 decoded only after the full buffer is collected
        let text = "HTTP/1.1 200 OK\r\n\r\ncafé ☕";
        let r = RawResponse::from_bytes(text.as_bytes().to_vec());
        let (_, body) = r.split().unwrap();
        assert_eq!(body, "café ☕");
    }
}
