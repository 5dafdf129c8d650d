//! Completion-promise detection.
//!
//! Detection is two independent steps: pull the first `<promise>...</promise>`
//! span out of free-form text, then compare its whitespace-normalized content
//! against the configured promise. The comparison is exact and case-sensitive.

use regex::Regex;
use std::sync::LazyLock;

/// Opening marker wrapping a completion promise
pub const PROMISE_OPEN: &str = "<promise>";

/// Closing marker wrapping a completion promise
pub const PROMISE_CLOSE: &str = "</promise>";

static PROMISE_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "(?s){}(.*?){}",
        regex::escape(PROMISE_OPEN),
        regex::escape(PROMISE_CLOSE)
    ))
    .expect("promise pattern is valid")
});

/// Wrap a promise in its markers, as the agent is expected to emit it.
pub fn wrap_promise(promise: &str) -> String {
    format!("{}{}{}", PROMISE_OPEN, promise, PROMISE_CLOSE)
}

/// Return the inner text of the first delimited promise span, if any.
pub fn extract_promise(text: &str) -> Option<&str> {
    PROMISE_SPAN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Collapse whitespace runs to single spaces and trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns true if `output` carries a promise span equal to `expected`
/// after whitespace normalization.
pub fn promise_matches(expected: &str, output: &str) -> bool {
    match extract_promise(output) {
        Some(found) => normalize_whitespace(found) == normalize_whitespace(expected),
        None => false,
    }
}
