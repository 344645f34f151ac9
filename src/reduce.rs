//! Content reduction: HTML to denoised plain text.
//!
//! The reducer is an ordered sequence of independent pure transforms.
//! Order matters: later steps assume earlier ones already removed whole
//! element blocks (stripping tags before removing `<script>` blocks, for
//! example, would leak script text into the output). The pipeline is lossy
//! by design - it favors discarding boilerplate and navigation over
//! preserving every character of the original text.
//!
//! Non-markup payloads (`application/json`) bypass the pipeline entirely
//! and are returned verbatim.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{INVALID_RESPONSE_TEXT, MIN_FRAGMENT_CHARS};
use crate::response::RawResponse;

static DOCTYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!DOCTYPE[^>]*>").expect("doctype pattern is valid"));
static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"));
static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<script.*?</script>").expect("script pattern is valid"));
static STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<style.*?</style>").expect("style pattern is valid"));
static STYLE_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"style="[^"]*""#).expect("style attr pattern is valid"));
static CLASS_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"class="[^"]*""#).expect("class attr pattern is valid"));
static ID_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"id="[^"]*""#).expect("id attr pattern is valid"));
static HEAD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<head>.*?</head>").expect("head pattern is valid"));
static NAV_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<nav.*?</nav>").expect("nav pattern is valid"));
static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<header.*?</header>").expect("header pattern is valid"));
static FOOTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<footer.*?</footer>").expect("footer pattern is valid"));
static FORM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<form.*?</form>").expect("form pattern is valid"));
static BLOCK_BOUNDARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</(?:p|div|li|ul|ol|h[1-6]|tr|table|section|article|blockquote)>|<br\s*/?>")
        .expect("block boundary pattern is valid")
});
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));
// Matches fragments made entirely of whitespace, digits, and non-word
// punctuation, i.e. anything without a word-like token.
static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s\d\W]+$").expect("non-word pattern is valid"));

/// Step 1: remove a doctype declaration.
fn strip_doctype(body: &str) -> String {
    DOCTYPE_RE.replace_all(body, "").into_owned()
}

/// Step 2: remove HTML comments (non-greedy span match).
fn strip_comments(body: &str) -> String {
    COMMENT_RE.replace_all(body, "").into_owned()
}

/// Step 3: remove `<script>` and `<style>` blocks including their content.
fn strip_script_and_style(body: &str) -> String {
    let body = SCRIPT_RE.replace_all(body, "");
    STYLE_RE.replace_all(&body, "").into_owned()
}

/// Step 4: strip `style=`, `class=`, and `id=` attribute assignments.
/// Values only; the tags themselves remain for later steps.
fn strip_presentation_attrs(body: &str) -> String {
    let body = STYLE_ATTR_RE.replace_all(body, "");
    let body = CLASS_ATTR_RE.replace_all(&body, "");
    ID_ATTR_RE.replace_all(&body, "").into_owned()
}

/// Step 5: remove head, navigation, header, footer, and form blocks
/// including their content.
fn strip_boilerplate_blocks(body: &str) -> String {
    let body = HEAD_RE.replace_all(body, "");
    let body = NAV_RE.replace_all(&body, "");
    let body = HEADER_RE.replace_all(&body, "");
    let body = FOOTER_RE.replace_all(&body, "");
    FORM_RE.replace_all(&body, "").into_owned()
}

/// Step 6: strip all remaining tags, keeping their text content.
///
/// Closing block-level tags and `<br>` become `". "` so that text from
/// sibling blocks lands in separate fragments for the filter in step 9;
/// inline tags are dropped outright.
fn strip_tags(body: &str) -> String {
    let body = BLOCK_BOUNDARY_RE.replace_all(body, ". ");
    TAG_RE.replace_all(&body, "").into_owned()
}

/// Step 7: decode the five supported entities.
fn decode_entities(body: &str) -> String {
    body.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
}

/// Step 8: collapse whitespace runs to a single space and trim.
fn collapse_whitespace(body: &str) -> String {
    WHITESPACE_RE.replace_all(body, " ").trim().to_string()
}

/// Step 9: drop meaningless fragments.
///
/// Splits on the literal `". "`, keeps a fragment only if its trimmed
/// length exceeds [`MIN_FRAGMENT_CHARS`] and it contains at least one
/// word-like token, then re-joins with `". "`. The criterion is a
/// compatibility-preserved heuristic; its edge behavior is part of the
/// observable output.
fn keep_meaningful_fragments(text: &str) -> String {
    let kept: Vec<&str> = text
        .split(". ")
        .map(str::trim)
        .filter(|fragment| {
            fragment.chars().count() > MIN_FRAGMENT_CHARS && !NON_WORD_RE.is_match(fragment)
        })
        .collect();

    let mut result = kept.join(". ");
    // a single trailing period, added only when missing, keeps a second
    // reduction pass from changing the text
    if !result.is_empty() && !result.ends_with('.') {
        result.push('.');
    }
    result
}

/// Reduces an HTML body to denoised plain text.
///
/// Applies the fixed transform sequence in order: doctype, comments,
/// script/style blocks, presentation attributes, boilerplate blocks, tag
/// stripping, entity decoding, whitespace collapsing, and the
/// meaningless-fragment filter.
pub fn reduce_html(body: &str) -> String {
    let body = strip_doctype(body);
    let body = strip_comments(&body);
    let body = strip_script_and_style(&body);
    let body = strip_presentation_attrs(&body);
    let body = strip_boilerplate_blocks(&body);
    let body = strip_tags(&body);
    let body = decode_entities(&body);
    let body = collapse_whitespace(&body);
    keep_meaningful_fragments(&body)
}

/// Produces the final extracted text for a response.
///
/// A response with no header/body boundary yields the sentinel text
/// rather than an error: a degraded answer is preferred to a crash.
/// Structured payloads (`application/json`) are returned unmodified;
/// everything else goes through [`reduce_html`].
pub fn extract_text(response: &RawResponse) -> String {
    let (_, body) = match response.split() {
        Ok(parts) => parts,
        Err(_) => return INVALID_RESPONSE_TEXT.to_string(),
    };

    match response.content_type().as_deref() {
        Some("application/json") => body.to_string(),
        _ => reduce_html(body),
    }
}
