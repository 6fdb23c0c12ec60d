//! Text decoding helpers shared by the text-based readers.

use std::sync::OnceLock;

use encoding_rs::Encoding;
use log::warn;
use regex::{Captures, Regex};

use crate::crossword::types::error::{CrosswordError, Result};

/// Resolves a WHATWG encoding label such as `"ISO-8859-1"` or `"windows-1252"`.
///
/// # Errors
/// Returns [`CrosswordError::InvalidArgument`] if the label is unknown.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| CrosswordError::InvalidArgument(format!("Unknown encoding: {}", label)))
}

/// Decodes a whole document, honoring a byte order mark if present.
///
/// Malformed sequences are replaced rather than rejected.
pub fn decode(input: &[u8], encoding: &'static Encoding) -> String {
    let (text, actual, had_errors) = encoding.decode(input);
    if had_errors {
        warn!("Document contains byte sequences that are invalid in {}", actual.name());
    }
    text.into_owned()
}

/// Decodes a single field (no BOM handling).
pub fn decode_field(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    text.into_owned()
}

/// Splits on `separator`, dropping empty trailing fields.
pub fn split_trimmed(line: &str, separator: char) -> Vec<&str> {
    let mut parts: Vec<&str> = line.split(separator).collect();
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    parts
}

/// Parses an integer field, wrapping the parse error with its context.
pub fn parse_int<T>(value: &str, context: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| CrosswordError::caused_by(format!("{} '{}' is not a number", context, value), e))
}

static ENTITY_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Matches a terminated numeric or named entity, including empty ones such as `&;`.
fn entity_regex() -> &'static Regex {
    ENTITY_PATTERN.get_or_init(|| Regex::new(r"&(?:#[0-9]*|[A-Za-z0-9]*);").expect("Invalid entity regex pattern"))
}

/// Replaces HTML entities with the characters they stand for.
///
/// Terminated entities that do not resolve (`&;`, `&#;`, unknown names) are
/// removed. Unterminated ones such as `&amp` are left untouched. Entity names
/// are case-sensitive.
pub fn strip_html_entities(value: &str) -> String {
    entity_regex()
        .replace_all(value, |caps: &Captures| {
            quick_xml::escape::unescape(&caps[0])
                .map(|resolved| resolved.into_owned())
                .unwrap_or_default()
        })
        .into_owned()
}
