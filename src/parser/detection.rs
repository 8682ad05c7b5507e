//! Link list format detection
//!
//! Public link lists are published either as plain text (one link per line)
//! or as a single Base64 blob of the same text. This module tells the two
//! apart and decodes the latter.

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use tracing::{debug, trace};

// ============================================================================
// List Type Detection
// ============================================================================

/// Detected link list content type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListType {
    /// One link per line
    PlainLinkList,
    /// Base64 encoded link list
    Base64LinkList,
    /// Anything else
    Unknown,
}

impl std::fmt::Display for ListType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListType::PlainLinkList => write!(f, "Plain Link List"),
            ListType::Base64LinkList => write!(f, "Base64 Link List"),
            ListType::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Detects the type of link list content
pub fn detect_list_type(content: &str) -> ListType {
    let trimmed = content.trim();
    let preview: String = trimmed.chars().take(100).collect();
    debug!(
        "Detecting link list type, content length: {} bytes, preview: {:?}...",
        content.len(),
        preview
    );

    if is_plain_link_list(trimmed) {
        debug!("Detected plain link list");
        return ListType::PlainLinkList;
    }

    if is_base64_content(trimmed) {
        debug!("Detected Base64 encoded link list");
        return ListType::Base64LinkList;
    }

    debug!("Unable to detect link list format");
    ListType::Unknown
}

/// Checks if the first meaningful line looks like a link
fn is_plain_link_list(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .is_some_and(looks_like_link)
}

fn looks_like_link(line: &str) -> bool {
    line.split_once("://").is_some_and(|(scheme, _)| {
        !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-')
    })
}

/// Checks if content appears to be Base64 of a link list
fn is_base64_content(content: &str) -> bool {
    let cleaned: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.len() < 4 {
        return false;
    }

    let is_valid_charset = cleaned.chars().all(|c| {
        c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '=' || c == '-' || c == '_'
    });
    if !is_valid_charset {
        return false;
    }

    if let Ok(decoded) = decode_base64(&cleaned)
        && let Ok(decoded_str) = String::from_utf8(decoded)
    {
        return decoded_str.lines().any(|line| looks_like_link(line.trim()));
    }

    false
}

// ============================================================================
// Content Decoding
// ============================================================================

/// Decodes Base64 content, trying standard and URL-safe alphabets
pub fn decode_base64(content: &str) -> Result<Vec<u8>> {
    let cleaned: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    trace!(
        "Attempting Base64 decode, cleaned length: {} bytes",
        cleaned.len()
    );

    if let Ok(decoded) = STANDARD.decode(&cleaned) {
        trace!("Decoded using standard Base64");
        return Ok(decoded);
    }

    if let Ok(decoded) = URL_SAFE.decode(&cleaned) {
        trace!("Decoded using URL-safe Base64");
        return Ok(decoded);
    }

    if let Ok(decoded) = URL_SAFE_NO_PAD.decode(&cleaned) {
        trace!("Decoded using URL-safe Base64 without padding");
        return Ok(decoded);
    }

    let padded = add_base64_padding(&cleaned);
    if let Ok(decoded) = STANDARD.decode(&padded) {
        trace!("Decoded using standard Base64 with added padding");
        return Ok(decoded);
    }

    bail!("Failed to decode Base64 content")
}

fn add_base64_padding(s: &str) -> String {
    let mut result = s.to_string();
    while !result.len().is_multiple_of(4) {
        result.push('=');
    }
    result
}

/// Decodes a list already detected as [`ListType::Base64LinkList`].
pub fn decode_base64_text(content: &str) -> Result<String> {
    let decoded = decode_base64(content)?;
    String::from_utf8(decoded).context("Decoded Base64 content is not valid UTF-8")
}
