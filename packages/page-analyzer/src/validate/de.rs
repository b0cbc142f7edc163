//! Field-level deserializers for model output.
//!
//! Used through `#[serde(deserialize_with = ...)]` on the wire types so bounds
//! are checked while decoding and errors carry the field path.

use serde::de::{Deserializer, Error};
use serde::Deserialize;

/// A number within `[0, 1]`, boundaries included.
pub(crate) fn unit_interval<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let number = f64::deserialize(deserializer)?;
    if (0.0..=1.0).contains(&number) {
        Ok(number)
    } else {
        Err(D::Error::custom(format!("{} is outside [0, 1]", number)))
    }
}

/// A string with at least one non-whitespace character.
pub(crate) fn non_blank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let text = String::deserialize(deserializer)?;
    if text.trim().is_empty() {
        return Err(D::Error::custom("must not be blank"));
    }
    Ok(text)
}

/// Optional selector. Blank strings read as absent.
pub(crate) fn optional_locator<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
}

/// Optional non-negative integer that fits in `u32`. Integral floats such as
/// `8.0` pass; fractions and negatives do not.
pub(crate) fn optional_count<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<u32>, D::Error> {
    let Some(number) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Some(n) = number.as_u64() {
        return u32::try_from(n)
            .map(Some)
            .map_err(|_| D::Error::custom(format!("{} is too large", n)));
    }
    match number.as_f64() {
        Some(n) if n.fract() == 0.0 && n >= 0.0 && n <= u32::MAX as f64 => Ok(Some(n as u32)),
        _ => Err(D::Error::custom(format!(
            "{} is not a non-negative integer",
            number
        ))),
    }
}
