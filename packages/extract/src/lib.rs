#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Embedded-JSON extraction from server-rendered pages.
//!
//! The listing portal streams its page data as framework push chunks
//! (`self.__next_f.push([1, "..."])`) whose payloads are escaped string
//! fragments containing JSON. This crate decodes those fragments and
//! pulls out the first object or array carrying a required-field
//! fingerprint (e.g. `"totalHouseholdNumber"`).
//!
//! Brace matching is an explicit depth counter that honors string
//! literals and escapes — regex cannot pair nested brackets correctly.
//! "First structurally valid match wins" is an accepted heuristic of
//! the upstream page format.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Start marker of a streamed push chunk, up to the opening quote of
/// its string payload.
static CHUNK_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"self\.__next_f\.push\(\[1,\s*""#).expect("valid regex"));

/// Returns the balanced `{...}` or `[...]` slice starting at byte
/// offset `start`, or `None` if `start` is not an opening bracket or
/// the text ends before the bracket closes.
///
/// String literals are skipped wholesale, so braces inside strings
/// never affect the depth count.
#[must_use]
pub fn balanced_slice(text: &str, start: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    let (open, close) = match bytes.get(start)? {
        b'{' => (b'{', b'}'),
        b'[' => (b'[', b']'),
        _ => return None,
    };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b if b == open => depth += 1,
            b if b == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Finds the first JSON object containing `"key"` and parses it.
///
/// For each occurrence of the quoted key, the scan walks outward to
/// enclosing `{` candidates (innermost first) and accepts the first
/// one whose balanced slice parses as JSON. Occurrences inside broken
/// or truncated structures are skipped rather than failing the whole
/// document.
#[must_use]
pub fn first_object_with_key(text: &str, key: &str) -> Option<Value> {
    objects_with_key(text, key).into_iter().next()
}

/// All distinct JSON objects containing `"key"`, in document order.
///
/// Overlapping matches (several key occurrences inside one object) are
/// deduplicated by span.
#[must_use]
pub fn objects_with_key(text: &str, key: &str) -> Vec<Value> {
    let needle = format!("\"{key}\"");
    let bytes = text.as_bytes();
    let mut results = Vec::new();
    let mut covered_until = 0usize;

    let mut search_from = 0usize;
    while let Some(found) = text[search_from..].find(&needle) {
        let key_at = search_from + found;
        search_from = key_at + needle.len();

        if key_at < covered_until {
            continue;
        }

        if let Some((start, value)) = enclosing_object(text, bytes, key_at) {
            let len = balanced_slice(text, start).map_or(0, str::len);
            covered_until = start + len;
            results.push(value);
        }
    }

    results
}

/// Walks backward from `key_at` to enclosing `{` candidates and
/// returns the first (innermost) one that parses.
fn enclosing_object(text: &str, bytes: &[u8], key_at: usize) -> Option<(usize, Value)> {
    let mut depth = 0usize;
    for idx in (0..key_at).rev() {
        match bytes[idx] {
            b'}' => depth += 1,
            b'{' if depth == 0 => {
                if let Some(slice) = balanced_slice(text, idx)
                    && let Ok(value) = serde_json::from_str::<Value>(slice)
                {
                    return Some((idx, value));
                }
                // Not valid JSON from here (brace inside a string or a
                // truncated chunk) — keep walking outward.
            }
            b'{' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Decodes the string payloads of all framework push chunks in `html`.
///
/// Payloads are escaped string fragments; fragments that fail to
/// decode are dropped with a debug log.
#[must_use]
pub fn decode_push_chunks(html: &str) -> Vec<String> {
    let mut chunks = Vec::new();

    for m in CHUNK_START_RE.find_iter(html) {
        let body_start = m.end();
        let Some(body) = string_literal_body(html, body_start) else {
            continue;
        };
        match serde_json::from_str::<String>(&format!("\"{body}\"")) {
            Ok(decoded) => chunks.push(decoded),
            Err(e) => log::debug!("undecodable push chunk at {body_start}: {e}"),
        }
    }

    chunks
}

/// Returns the raw (still-escaped) body of the string literal starting
/// at `start`, i.e. everything up to the first unescaped quote.
fn string_literal_body(text: &str, start: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut escaped = false;
    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
        } else if byte == b'\\' {
            escaped = true;
        } else if byte == b'"' {
            return Some(&text[start..start + offset]);
        }
    }
    None
}

/// Extracts the first fingerprinted object from a server-rendered page:
/// decoded push chunks are searched first, then the raw document (for
/// plain inline `<script>` payloads).
#[must_use]
pub fn extract_from_page(html: &str, key: &str) -> Option<Value> {
    for chunk in decode_push_chunks(html) {
        if let Some(value) = first_object_with_key(&chunk, key) {
            return Some(value);
        }
    }
    first_object_with_key(html, key)
}

/// Extracts every fingerprinted object from a server-rendered page,
/// chunk payloads first.
#[must_use]
pub fn extract_all_from_page(html: &str, key: &str) -> Vec<Value> {
    let mut out = Vec::new();
    for chunk in decode_push_chunks(html) {
        out.extend(objects_with_key(&chunk, key));
    }
    if out.is_empty() {
        out = objects_with_key(html, key);
    }
    out
}

/// Strips a JSON-P style wrapper (`callback({...})` or `callback([...])`)
/// and parses the payload. A bare JSON document passes through.
#[must_use]
pub fn strip_jsonp(body: &str) -> Option<Value> {
    let start = body.find(['{', '['])?;
    let slice = balanced_slice(body, start)?;
    serde_json::from_str(slice).ok()
}
