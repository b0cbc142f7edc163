//! Recovering a JSON object from free-form model output.
//!
//! Models wrap JSON in prose or Markdown fences even when told not to. Two
//! stages are tried in order: decode the whole text, then decode the greedy
//! span from the first `{` to the last `}`. Which stage succeeded is logged
//! and returned so callers can track how often the fallback is needed.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, ResponseParseError};
use crate::types::analysis::{ElementTarget, PageAnalysis, RecommendedAction};
use crate::types::extraction::ExtractedData;
use crate::validate::{
    lenient_element_target, validate_extracted_data, validate_page_analysis,
    validate_recommended_action,
};

static BRACE_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// Which recovery stage produced the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStage {
    /// The whole response was a JSON object
    Direct,
    /// Only the `{...}` span decoded
    BraceSpan,
}

/// A JSON object recovered from model output.
#[derive(Debug, Clone, PartialEq)]
pub struct Recovered {
    pub value: Value,
    pub stage: RecoveryStage,
}

/// Recover one JSON object from `raw`.
///
/// A direct decode that yields something other than an object (an array, a
/// bare string) does not count; the brace stage gets a chance instead.
pub fn recover_json(raw: &str) -> std::result::Result<Recovered, ResponseParseError> {
    let direct = match serde_json::from_str::<Value>(raw.trim()) {
        Ok(value @ Value::Object(_)) => {
            debug!(stage = "direct", "Recovered JSON object from model response");
            return Ok(Recovered {
                value,
                stage: RecoveryStage::Direct,
            });
        }
        Ok(other) => format!("decoded to {} instead of an object", kind(&other)),
        Err(e) => e.to_string(),
    };
    debug!(error = %direct, "Direct decode failed, trying brace span");

    let brace_span = match BRACE_SPAN.find(raw) {
        None => "no brace span".to_string(),
        Some(span) => match serde_json::from_str::<Value>(span.as_str()) {
            Ok(value @ Value::Object(_)) => {
                debug!(
                    stage = "brace_span",
                    offset = span.start(),
                    len = span.len(),
                    "Recovered JSON object from model response"
                );
                return Ok(Recovered {
                    value,
                    stage: RecoveryStage::BraceSpan,
                });
            }
            Ok(other) => format!("decoded to {} instead of an object", kind(&other)),
            Err(e) => e.to_string(),
        },
    };
    debug!(error = %brace_span, "Brace span decode failed");

    Err(ResponseParseError {
        raw: raw.to_string(),
        direct,
        brace_span,
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse and validate a page analysis response.
pub fn parse_page_analysis(raw: &str) -> Result<PageAnalysis> {
    let recovered = recover_json(raw)?;
    Ok(validate_page_analysis(&recovered.value)?)
}

/// Parse and validate an extraction response.
pub fn parse_extracted_data(raw: &str) -> Result<ExtractedData> {
    let recovered = recover_json(raw)?;
    Ok(validate_extracted_data(&recovered.value)?)
}

/// Parse and validate a standalone action plan.
pub fn parse_recommended_action(raw: &str) -> Result<RecommendedAction> {
    let recovered = recover_json(raw)?;
    Ok(validate_recommended_action(&recovered.value)?)
}

/// Parse an element-location response.
///
/// The text must still contain a JSON object, but its fields are read
/// leniently; see [`lenient_element_target`].
pub fn parse_element_target(raw: &str, fallback_description: &str) -> Result<ElementTarget> {
    let recovered = recover_json(raw)?;
    Ok(lenient_element_target(&recovered.value, fallback_description))
}
