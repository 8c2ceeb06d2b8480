//! Structured-output extraction from free-form model text.
//!
//! The pipeline is heuristic, so it lives here as pure functions:
//!
//! 1. a fenced code block tagged `json`, `js`, `javascript` or `text`;
//! 2. the span from the first `{` to the last `}`, accepted as-is when it
//!    covers the whole text and otherwise only if it parses;
//! 3. the whole text when it is brace-delimited.
//!
//! A candidate that fails to parse gets one repair pass (trailing commas
//! dropped, single-quoted strings converted to double-quoted).

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

static FENCED_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:json|js|javascript|text)?\s*([\s\S]*?)\s*```")
        .expect("fenced block regex must compile")
});

static TRAILING_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([\]}])").expect("trailing comma regex must compile"));

static SINGLE_QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'([^']*)'").expect("single quote regex must compile"));

/// Extract a JSON object (or array) from model text.
pub fn extract_json_object(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let candidate = find_candidate(trimmed)?;
    if let Some(value) = parse_structured(candidate) {
        return Some(value);
    }

    let repaired = repair(candidate);
    match parse_structured(&repaired) {
        Some(value) => {
            warn!("Parsed structured output after repair");
            Some(value)
        }
        None => {
            debug!(candidate, repaired = %repaired, "Failed to parse structured output");
            None
        }
    }
}

fn find_candidate(trimmed: &str) -> Option<&str> {
    if let Some(inner) = FENCED_BLOCK_RE
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
    {
        return Some(inner);
    }

    if let (Some(first), Some(last)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if last > first {
            let span = &trimmed[first..=last];
            let covers_all = first == 0 && last == trimmed.len() - 1;
            if covers_all || serde_json::from_str::<Value>(span).is_ok() {
                return Some(span);
            }
        }
    }

    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Some(trimmed);
    }
    None
}

fn parse_structured(candidate: &str) -> Option<Value> {
    serde_json::from_str::<Value>(candidate)
        .ok()
        .filter(|v| v.is_object() || v.is_array())
}

fn repair(candidate: &str) -> String {
    let without_commas = TRAILING_COMMA_RE.replace_all(candidate, "$1");
    SINGLE_QUOTED_RE
        .replace_all(&without_commas, "\"$1\"")
        .into_owned()
}
