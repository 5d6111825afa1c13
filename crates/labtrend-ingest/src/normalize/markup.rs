//! Markup flattening for positioned HTML renderings.
//!
//! pdf2htmlEX emits every text fragment in nested `div`s. Adjacent
//! fragments of one table row are separated by a closing and reopening pair
//! of nested `div`s, words of one fragment by a single pair. Rows of the
//! hospital export start with a `dd/mm/yyyy hh:mm` timestamp, which is the
//! only reliable row boundary in that output.

use std::borrow::Cow;
use std::sync::LazyLock;

use quick_xml::escape::{resolve_html5_entity, unescape_with};
use regex::{Captures, Regex};

/// Canonical column gap written into normalized text.
pub const COLUMN_GAP: char = '\t';

static MARKUP_SNIFF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(?:!doctype|html|body|div|table|span|br|p)\b").expect("valid regex")
});

static HIDDEN_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<!--.*?-->|<head\b.*?</head\s*>|<style\b.*?</style\s*>|<script\b.*?</script\s*>")
        .expect("valid regex")
});

static CELL_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)</div\s*>\s*</div\s*><div\b[^>]*>\s*<div\b[^>]*>|</t[dh]\s*>\s*<t[dh]\b[^>]*>",
    )
    .expect("valid regex")
});

static FRAGMENT_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</div\s*><div\b[^>]*>").expect("valid regex"));

static BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)</?(?:div|p|br|tr|li|ul|ol|table|thead|tbody|tfoot|h[1-6]|body|html|section|article|header|footer)\b[^>]*>",
    )
    .expect("valid regex")
});

static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[!/?]?[A-Za-z][^>]*>").expect("valid regex"));

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});")
        .expect("valid regex")
});

static ROW_TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}/\d{2}/\d{4} \d{2}:\d{2}").expect("valid regex"));

/// Returns true when the text looks like HTML rather than plain text.
pub fn looks_like_markup(text: &str) -> bool {
    MARKUP_SNIFF.is_match(text)
}

/// Flattens markup to line-oriented text with column gaps.
///
/// Entities are decoded after tags are removed so an escaped `&lt;` never
/// turns into a tag.
pub fn flatten_markup(text: &str) -> String {
    let text = HIDDEN_BLOCK.replace_all(text, "");
    let gap = COLUMN_GAP.to_string();
    let text = CELL_BOUNDARY.replace_all(&text, gap.as_str());
    let text = FRAGMENT_BOUNDARY.replace_all(&text, " ");
    let text = BLOCK_TAG.replace_all(&text, "\n");
    let text = ANY_TAG.replace_all(&text, "");
    let text = decode_entities(&text);
    split_rows_at_timestamps(&text)
}

/// Decodes HTML5 named and numeric character references.
///
/// A reference that does not resolve is kept literally.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    ENTITY.replace_all(text, |caps: &Captures<'_>| {
        let raw = &caps[0];
        unescape_with(raw, resolve_html5_entity)
            .map(Cow::into_owned)
            .unwrap_or_else(|_| raw.to_string())
    })
}

/// Starts a new line before each row timestamp.
fn split_rows_at_timestamps(text: &str) -> String {
    ROW_TIMESTAMP
        .replace_all(text, |caps: &Captures<'_>| format!("\n{}", &caps[0]))
        .into_owned()
}
