//! Best-effort JSON extraction from raw model output.
//!
//! Models wrap JSON in markdown fences or surrounding prose. Candidates are
//! tried in order: the first ` ```json ` fence, the outermost brace span,
//! then the whole trimmed text. The first candidate that deserializes wins.

use serde::de::DeserializeOwned;

use crate::error::LlmError;

const SAMPLE_LEN: usize = 120;

/// Extracts a `T` from raw model output.
pub fn extract_json<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let mut last_error = None;
    for candidate in candidates(text) {
        match serde_json::from_str(candidate) {
            Ok(value) => return Ok(value),
            Err(e) => last_error = Some(e),
        }
    }
    let reason = last_error.map_or_else(|| "empty response".to_string(), |e| e.to_string());
    Err(LlmError::Parse(format!(
        "{reason}; output began: {:?}",
        sample(text)
    )))
}

fn candidates(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    if let Some(fenced) = fenced_block(text) {
        out.push(fenced);
    }
    if let (Some(open), Some(close)) = (text.find('{'), text.rfind('}')) {
        if open < close {
            out.push(text[open..=close].trim());
        }
    }
    out.push(text.trim());
    out
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```json")? + "```json".len();
    let rest = &text[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

fn sample(text: &str) -> &str {
    if text.len() <= SAMPLE_LEN {
        return text;
    }
    let mut cut = SAMPLE_LEN;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    &text[..cut]
}
