//! Schema validators for model output.
//!
//! Each validator takes an already-decoded JSON value and either returns the
//! fully typed result or the first failing field. Shapes, enum membership and
//! field bounds come from the `Deserialize` impls on the wire types; the
//! rules that span several fields are checked afterwards. Nothing is
//! defaulted or coerced. Keys outside the schema are ignored.

pub(crate) mod de;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{ResponseValidationError, ValidationResult};
use crate::types::analysis::{Coordinates, ElementTarget, PageAnalysis, RecommendedAction};
use crate::types::extraction::ExtractedData;

/// Path used when the failing value is the whole response.
const ROOT: &str = "$";

/// Validate a page classification and next-action decision.
pub fn validate_page_analysis(value: &Value) -> ValidationResult<PageAnalysis> {
    let analysis: PageAnalysis = decode(value)?;

    if !analysis.has_opportunities && analysis.opportunity_count.is_some_and(|n| n > 0) {
        return Err(ResponseValidationError::new(
            "opportunityCount",
            value["opportunityCount"].clone(),
            "must be absent or zero when hasOpportunities is false",
        ));
    }

    if !analysis.has_pagination && analysis.pagination_type.is_some() {
        return Err(ResponseValidationError::new(
            "paginationType",
            value["paginationType"].clone(),
            "must be absent when hasPagination is false",
        ));
    }

    check_action(&analysis.recommended_action, "recommendedAction")?;
    Ok(analysis)
}

/// Validate a standalone action plan.
pub fn validate_recommended_action(value: &Value) -> ValidationResult<RecommendedAction> {
    let action: RecommendedAction = decode(value)?;
    check_action(&action, ROOT)?;
    Ok(action)
}

/// Validate the output of an extraction call.
pub fn validate_extracted_data(value: &Value) -> ValidationResult<ExtractedData> {
    decode(value)
}

/// `click` and `fill` need something a browser can locate.
///
/// A missing `value` is not an error here; see
/// [`RecommendedAction::needs_input`].
fn check_action(action: &RecommendedAction, path: &str) -> ValidationResult<()> {
    if action.action.requires_target()
        && !action.target.as_ref().is_some_and(ElementTarget::is_locatable)
    {
        return Err(ResponseValidationError::new(
            join(path, "target"),
            target_json(&action.target),
            format!("`{}` needs a target with a selector or coordinates", action.action),
        ));
    }
    Ok(())
}

fn target_json(target: &Option<ElementTarget>) -> Value {
    target
        .as_ref()
        .and_then(|t| serde_json::to_value(t).ok())
        .unwrap_or(Value::Null)
}

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() || parent == ROOT {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

/// Deserialize `value`, turning a failure into the failing path and value.
fn decode<T: DeserializeOwned>(value: &Value) -> ValidationResult<T> {
    serde_path_to_error::deserialize(value).map_err(|err| {
        let mut path = String::new();
        let mut found = Some(value);
        for segment in err.path().iter() {
            match segment {
                serde_path_to_error::Segment::Seq { index } => {
                    path.push_str(&format!("[{}]", index));
                    found = found.and_then(|v| v.get(*index));
                }
                serde_path_to_error::Segment::Map { key } => {
                    path = join(&path, key);
                    found = found.and_then(|v| v.get(key));
                }
                _ => {}
            }
        }

        let reason = err.into_inner().to_string();
        let missing = reason
            .strip_prefix("missing field `")
            .and_then(|rest| rest.strip_suffix('`'));

        match missing {
            Some(field) => ResponseValidationError::new(
                join(&path, field),
                Value::Null,
                "required field is missing",
            ),
            None => ResponseValidationError::new(
                if path.is_empty() { ROOT.to_string() } else { path },
                found.cloned().unwrap_or(Value::Null),
                reason,
            ),
        }
    })
}

/// Best-effort reading of an element-location answer.
///
/// Unlike the strict validators, malformed optional parts are dropped rather
/// than rejected: `selector` must be a string and `coordinates` must carry two
/// finite numbers, otherwise they read as absent. The description falls back
/// to `fallback_description` only when the model gave none.
pub fn lenient_element_target(value: &Value, fallback_description: &str) -> ElementTarget {
    let selector = value
        .get("selector")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let description = value
        .get("description")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback_description)
        .to_string();

    let coordinates = value.get("coordinates").and_then(|c| {
        let x = c.get("x").and_then(Value::as_f64).filter(|n| n.is_finite())?;
        let y = c.get("y").and_then(Value::as_f64).filter(|n| n.is_finite())?;
        Some(Coordinates { x, y })
    });

    if coordinates.is_none() && !value.get("coordinates").map_or(true, Value::is_null) {
        debug!(coordinates = %value["coordinates"], "Dropping unusable coordinates");
    }

    ElementTarget {
        selector,
        description,
        coordinates,
    }
}
