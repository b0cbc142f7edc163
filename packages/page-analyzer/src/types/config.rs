//! Analyzer configuration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Markup beyond this many characters is cut before it reaches the model.
pub const DEFAULT_MAX_MARKUP_CHARS: usize = 50_000;

/// Configuration for the analyzer and its default model binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Vision-capable chat model. Default: gpt-4o.
    pub model: String,

    /// Hard character cap on markup included in a request.
    pub max_markup_chars: usize,

    /// Sampling temperature. Default: 0.1.
    pub temperature: f32,

    /// Completion token cap. Default: 4096.
    pub max_tokens: u32,

    /// MIME type assumed for bare base64 screenshots.
    pub image_mime: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            max_markup_chars: DEFAULT_MAX_MARKUP_CHARS,
            temperature: 0.1,
            max_tokens: 4096,
            image_mime: "image/png".to_string(),
        }
    }
}

impl AnalyzerConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_markup_chars(mut self, max: usize) -> Self {
        self.max_markup_chars = max;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_image_mime(mut self, mime: impl Into<String>) -> Self {
        self.image_mime = mime.into();
        self
    }

    /// Defaults overlaid with `PAGE_ANALYZER_*` environment variables.
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should count.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overlaid with values from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(model) = lookup("PAGE_ANALYZER_MODEL").filter(|m| !m.trim().is_empty()) {
            config.model = model.trim().to_string();
        }
        if let Some(max) = parse_var(&lookup, "PAGE_ANALYZER_MAX_MARKUP_CHARS")? {
            config.max_markup_chars = max;
        }
        if let Some(temperature) = parse_var::<f32>(&lookup, "PAGE_ANALYZER_TEMPERATURE")? {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError {
                    variable: "PAGE_ANALYZER_TEMPERATURE".into(),
                    value: temperature.to_string(),
                    reason: "must be between 0.0 and 2.0".into(),
                });
            }
            config.temperature = temperature;
        }
        if let Some(max_tokens) = parse_var(&lookup, "PAGE_ANALYZER_MAX_TOKENS")? {
            config.max_tokens = max_tokens;
        }

        Ok(config)
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    raw.trim().parse().map(Some).map_err(|e: T::Err| ConfigError {
        variable: name.to_string(),
        value: raw.clone(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = AnalyzerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AnalyzerConfig::default());
        assert_eq!(config.max_markup_chars, DEFAULT_MAX_MARKUP_CHARS);
    }

    #[test]
    fn test_overrides_from_variables() {
        let config = AnalyzerConfig::from_lookup(lookup(&[
            ("PAGE_ANALYZER_MODEL", "gpt-4o-mini"),
            ("PAGE_ANALYZER_MAX_MARKUP_CHARS", " 20000 "),
            ("PAGE_ANALYZER_TEMPERATURE", "0"),
            ("PAGE_ANALYZER_MAX_TOKENS", "2048"),
        ]))
        .unwrap();

        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_markup_chars, 20_000);
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.max_tokens, 2048);
    }

    #[test]
    fn test_bad_number_names_variable() {
        let err = AnalyzerConfig::from_lookup(lookup(&[("PAGE_ANALYZER_MAX_MARKUP_CHARS", "lots")]))
            .unwrap_err();
        assert_eq!(err.variable, "PAGE_ANALYZER_MAX_MARKUP_CHARS");
        assert_eq!(err.value, "lots");
    }

    #[test]
    fn test_temperature_out_of_range() {
        let err = AnalyzerConfig::from_lookup(lookup(&[("PAGE_ANALYZER_TEMPERATURE", "3.5")]))
            .unwrap_err();
        assert_eq!(err.variable, "PAGE_ANALYZER_TEMPERATURE");
    }

    #[test]
    fn test_partial_config_file_fills_defaults() {
        let config: AnalyzerConfig = serde_json::from_str(r#"{"model": "gpt-4.1"}"#).unwrap();
        assert_eq!(config.model, "gpt-4.1");
        assert_eq!(config.max_tokens, 4096);
    }
}
