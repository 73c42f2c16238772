//! Reviewer reply parsing.
//!
//! Reviewers answer with a JSON object `{decision, justification, confidence}`,
//! sometimes wrapped in prose or a fenced code block. Anything unusable is
//! rejected with a reason, and the caller records an `error` verdict.

use super::verdict::{Decision, ReviewVerdict};
use serde_json::Value;

/// Parse a reviewer reply into a verdict, reporting why an unusable reply
/// was rejected.
pub fn try_parse_verdict(reviewer: &str, response: &str) -> Result<ReviewVerdict, String> {
    let object = extract_json_object(response).ok_or_else(|| "no JSON object found".to_string())?;

    let decision = object
        .get("decision")
        .and_then(Value::as_str)
        .ok_or_else(|| "missing decision".to_string())?;
    let decision =
        Decision::parse(decision).ok_or_else(|| format!("unrecognized decision '{decision}'"))?;

    let justification = object
        .get("justification")
        .and_then(Value::as_str)
        .ok_or_else(|| "missing justification".to_string())?;

    let confidence = match object.get("confidence") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|c| c.is_finite())
    .ok_or_else(|| "missing or non-numeric confidence".to_string())?;

    Ok(ReviewVerdict::new(
        reviewer,
        decision,
        confidence,
        justification.trim(),
    ))
}

/// Locate the outermost `{ ... }` span in a reply and parse it as an object.
pub fn extract_json_object(response: &str) -> Option<serde_json::Map<String, Value>> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end <= start {
        return None;
    }

    match serde_json::from_str::<Value>(&response[start..=end]).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
