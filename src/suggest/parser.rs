//! Suggestion response parsing
//!
//! The autosuggest endpoint answers with JSON, optionally wrapped in a JSONP
//! callback. The payload format has shifted over time, so suggestion lists
//! are looked for in several places in priority order. Anything that does
//! not parse degrades to "no suggestions" - the caller falls back to the
//! seed keyword and the crawl continues.

use serde_json::Value;

/// One suggested keyword, optionally pinned to a category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub keyword: String,
    pub category_id: Option<String>,
}

/// Paths the suggestion list has been observed under, in priority order
const SUGGESTION_SOURCES: &[&str] = &["/richRes/sug", "/rcser/sug", "/sug"];

/// Strips a JSONP wrapper `callback(...)` when present
pub fn strip_jsonp<'a>(body: &'a str, callback: &str) -> &'a str {
    let trimmed = body.trim();
    if callback.is_empty() {
        return trimmed;
    }

    let prefix = format!("{}(", callback);
    if let Some(inner) = trimmed.strip_prefix(&prefix) {
        if let Some(inner) = inner.strip_suffix(')') {
            return inner;
        }
    }

    trimmed
}

/// Parses a suggestion endpoint response body
///
/// Returns an empty vector for invalid JSON or when no usable suggestion
/// list is present; the distinction is deliberately not observable so the
/// fallback path behaves identically in both cases.
pub fn parse_suggestions(body: &str, callback: &str) -> Vec<Suggestion> {
    let payload = strip_jsonp(body, callback);

    let data: Value = match serde_json::from_str(payload) {
        Ok(data) => data,
        Err(e) => {
            tracing::debug!("Suggestion response is not valid JSON: {}", e);
            return Vec::new();
        }
    };

    for source in SUGGESTION_SOURCES {
        let Some(list) = data.pointer(source).and_then(Value::as_array) else {
            continue;
        };
        if list.is_empty() {
            continue;
        }

        let suggestions: Vec<Suggestion> = list.iter().filter_map(parse_entry).collect();
        if !suggestions.is_empty() {
            return suggestions;
        }
    }

    Vec::new()
}

/// Parses a single suggestion object; non-objects and entries without a
/// keyword are skipped
fn parse_entry(entry: &Value) -> Option<Suggestion> {
    let obj = entry.as_object()?;

    let keyword = obj.get("kwd").and_then(Value::as_str)?.trim();
    if keyword.is_empty() {
        return None;
    }

    // The category comes as an array; only its first element matters and it
    // may be a number or a string depending on the endpoint revision.
    let category_id = obj
        .get("category")
        .and_then(Value::as_array)
        .and_then(|cats| cats.first())
        .and_then(|cat| match cat {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

    Some(Suggestion {
        keyword: keyword.to_string(),
        category_id,
    })
}
