//! Turning raw model text into domain results
//!
//! Models wrap their JSON in prose or code fences often enough that the
//! first well-formed object anywhere in the text is accepted.

use domain::{Category, MAX_TIPS, ParsedTask, Priority, Source, SuggestionResult};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ApplicationError;

/// Find the first substring of `text` that parses as a JSON object
///
/// Candidates start at each `{` and end at its balanced `}`; braces inside
/// string literals are ignored.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(len) = balanced_object_len(&text.as_bytes()[start..]) {
            if let Ok(Value::Object(map)) = serde_json::from_str(&text[start..start + len]) {
                return Some(map);
            }
        }
        search_from = start + 1;
    }
    None
}

/// Length of the brace-balanced prefix of `bytes`, which starts with `{`
fn balanced_object_len(bytes: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (index, &byte) in bytes.iter().enumerate() {
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
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(index + 1);
                }
            },
            _ => {},
        }
    }
    None
}

#[derive(Debug, Deserialize)]
struct RawSuggestion {
    category: String,
    priority: String,
    #[serde(default)]
    tips: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawParsedTask {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

fn object_from(content: &str) -> Result<Map<String, Value>, ApplicationError> {
    extract_json_object(content)
        .ok_or_else(|| ApplicationError::ResponseParse("no JSON object in model output".into()))
}

fn decode<T: for<'de> Deserialize<'de>>(object: Map<String, Value>) -> Result<T, ApplicationError> {
    serde_json::from_value(Value::Object(object))
        .map_err(|e| ApplicationError::ResponseParse(e.to_string()))
}

/// Validate a suggestion produced by the model
///
/// Unknown categories or priorities reject the whole output. Tips are
/// trimmed, blanks dropped, and the list capped at [`MAX_TIPS`].
pub fn parse_suggestion(content: &str) -> Result<SuggestionResult, ApplicationError> {
    let raw: RawSuggestion = decode(object_from(content)?)?;
    let category: Category = raw.category.parse()?;
    let priority: Priority = raw.priority.parse()?;
    let tips = raw
        .tips
        .iter()
        .map(|tip| tip.trim())
        .filter(|tip| !tip.is_empty())
        .take(MAX_TIPS)
        .map(str::to_string)
        .collect();

    Ok(SuggestionResult::new(category, priority, tips, Source::Model))
}

/// Validate a parsed task produced by the model
///
/// A missing category is filled in by `fallback_category`; a present but
/// unknown one rejects the output. A blank title rejects the output.
pub fn parse_task(
    content: &str,
    fallback_category: impl FnOnce() -> Category,
) -> Result<ParsedTask, ApplicationError> {
    let raw: RawParsedTask = decode(object_from(content)?)?;
    let title = raw.title.trim();
    if title.is_empty() {
        return Err(ApplicationError::ResponseParse("model returned an empty title".into()));
    }
    let category = match raw.category.as_deref().map(str::trim) {
        Some(label) if !label.is_empty() => label.parse()?,
        _ => fallback_category(),
    };
    let description = raw.description.as_deref().map_or("", str::trim);

    Ok(ParsedTask::new(title, description, category, Source::Model))
}
