// Response Interpreter - Turn untrusted model text into structured results
//
// Grouping output goes through a two-stage best-effort parse:
// 1. scan for the first `[[ ... ]]` shaped substring
// 2. parse the whole reply (or the body of a markdown fence)
// followed by coverage repair. Nothing in here panics on model output;
// failures come back as `ParseError` for the service's fallback policy.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::error::ParseError;

lazy_static! {
    // Non-greedy, `.` spans newlines
    static ref GROUPS_PATTERN: Regex =
        Regex::new(r"(?s)\[\s*\[.*?\]\s*\]").expect("grouping pattern is valid");
}

/// Ordered list of sentence groups
pub type Groups = Vec<Vec<String>>;

/// Parse a grouping reply and make sure every input sentence is accounted for.
pub fn interpret_grouping(raw_text: &str, original_sentences: &[String]) -> Result<Groups, ParseError> {
    tracing::debug!("interpret_grouping: response_len={}", raw_text.len());

    let candidate = extract_groups(raw_text)?;
    Ok(repair_coverage(candidate, original_sentences))
}

/// Normalize a synthesis reply. A missing reply degrades to an empty paragraph.
pub fn interpret_synthesis(raw_text: Option<&str>) -> String {
    raw_text.map(str::trim).unwrap_or_default().to_string()
}

/// Extract a candidate grouping from the reply without checking coverage
pub fn extract_groups(raw_text: &str) -> Result<Groups, ParseError> {
    // Stage 1: first array-of-arrays shaped substring
    if let Some(found) = GROUPS_PATTERN.find(raw_text) {
        if let Ok(value) = serde_json::from_str::<Value>(found.as_str()) {
            if let Some(groups) = value_to_groups(value) {
                return Ok(groups);
            }
        }
        tracing::debug!("extract_groups: pattern matched but did not parse, trying whole reply");
    }

    // Stage 2: the whole reply, then a fenced block inside it
    let err = match parse_list(raw_text.trim()) {
        Ok(groups) => return Ok(groups),
        Err(e) => e,
    };
    if let Some(block) = extract_from_code_block(raw_text) {
        if let Ok(groups) = parse_list(block) {
            return Ok(groups);
        }
    }

    tracing::debug!("extract_groups: no usable JSON in response: {err}");
    Err(err)
}

/// Append every input sentence the model left out as one trailing group.
///
/// Hallucinated or duplicated sentences are kept as the model returned them;
/// this only repairs omissions. Missing sentences keep their input order.
pub fn repair_coverage(mut groups: Groups, original_sentences: &[String]) -> Groups {
    let present: HashSet<&str> = groups.iter().flatten().map(String::as_str).collect();

    let mut seen = HashSet::new();
    let missing: Vec<String> = original_sentences
        .iter()
        .filter(|s| !present.contains(s.as_str()) && seen.insert(s.as_str()))
        .cloned()
        .collect();

    if !missing.is_empty() {
        tracing::warn!(
            "Some sentences missing from groups, adding {} as separate group",
            missing.len()
        );
        groups.push(missing);
    }

    groups
}

fn parse_list(text: &str) -> Result<Groups, ParseError> {
    if text.is_empty() {
        return Err(ParseError::NoJsonFound);
    }

    let value = serde_json::from_str::<Value>(text).map_err(|e| {
        if text.contains('[') {
            ParseError::InvalidJson(e.to_string())
        } else {
            ParseError::NoJsonFound
        }
    })?;

    value_to_groups(value).ok_or(ParseError::NotAnArray)
}

/// Convert a parsed JSON value into groups.
///
/// Inner arrays keep their string members, bare strings become singleton
/// groups, everything else (and groups left empty) is dropped.
fn value_to_groups(value: Value) -> Option<Groups> {
    let Value::Array(items) = value else {
        return None;
    };

    let groups = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Array(members) => {
                let group: Vec<String> = members
                    .into_iter()
                    .filter_map(|m| match m {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect();
                (!group.is_empty()).then_some(group)
            }
            Value::String(s) => Some(vec![s]),
            _ => None,
        })
        .collect();

    Some(groups)
}

/// Extract the body of the first markdown code block
fn extract_from_code_block(response: &str) -> Option<&str> {
    let patterns = ["```json", "```JSON", "```"];

    for pattern in patterns {
        if let Some(start_idx) = response.find(pattern) {
            let content_start = start_idx + pattern.len();
            if let Some(end_idx) = response[content_start..].find("```") {
                let content = response[content_start..content_start + end_idx].trim();
                if content.starts_with('[') {
                    return Some(content);
                }
            }
        }
    }
    None
}
