//! Token normalization and free-text tokenization.

use regex::Regex;
use std::collections::HashSet;

/// Clean one path-like token: trim, strip a single layer of angle brackets
/// or matching quotes, percent-decode, trim again.
///
/// Decode failure leaves the value percent-encoded rather than dropping the
/// token.
pub(crate) fn normalize_token(value: &str) -> String {
    let mut normalized = value.trim();
    normalized = normalized.strip_prefix('<').unwrap_or(normalized);
    normalized = normalized.strip_suffix('>').unwrap_or(normalized);
    if normalized.len() >= 2
        && ((normalized.starts_with('"') && normalized.ends_with('"'))
            || (normalized.starts_with('\'') && normalized.ends_with('\'')))
    {
        normalized = &normalized[1..normalized.len() - 1];
    }

    let decoded = match urlencoding::decode(normalized) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => normalized.to_string(),
    };

    decoded.trim().to_string()
}

/// Split free text into candidate tokens.
///
/// Line tokens: trimmed non-empty lines not starting with `#` (URI-list
/// comment convention). URI tokens: every `uri_scan` match over the whole
/// text, because recognized URIs may sit inline in HTML or Markdown rather
/// than on their own line. The union is deduplicated by exact equality,
/// preserving discovery order.
pub(crate) fn extract_tokens(text: &str, uri_scan: &Regex) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut tokens = Vec::new();
    let mut seen = HashSet::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if seen.insert(line.to_string()) {
            tokens.push(line.to_string());
        }
    }

    for found in uri_scan.find_iter(text) {
        let token = found.as_str();
        if seen.insert(token.to_string()) {
            tokens.push(token.to_string());
        }
    }

    tokens
}
