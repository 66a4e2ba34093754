//! Engine configuration.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ConfigError;

/// Quote character preferred when a primitive has to write a new string.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Hash, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum QuoteStyle {
    /// `'`
    #[default]
    Single,
    /// `"`
    Double,
}

impl QuoteStyle {
    /// Returns the quote character.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Single => '\'',
            Self::Double => '"',
        }
    }
}

/// Engine configuration.
///
/// # Defaults
///
/// - `fallback_identifier`: `"element"`
/// - `selector_cache_capacity`: 256
/// - `preferred_quote`: single
///
/// # Example
///
/// ```
/// use tessel_engine::{EngineConfig, QuoteStyle};
///
/// let config = EngineConfig::from_json(r#"{ "preferred_quote": "double" }"#)?;
/// assert_eq!(config.preferred_quote(), QuoteStyle::Double);
/// assert_eq!(config.fallback_identifier(), "element");
/// # Ok::<(), tessel_engine::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Name used when no usable identifier can be derived.
    fallback_identifier: String,
    /// Maximum number of parsed selectors kept by a `SelectorCache`.
    selector_cache_capacity: usize,
    /// Quote style for newly written strings.
    preferred_quote: QuoteStyle,
}

impl EngineConfig {
    /// Creates a configuration with explicit values.
    #[must_use]
    pub fn new(
        fallback_identifier: impl Into<String>,
        selector_cache_capacity: usize,
        preferred_quote: QuoteStyle,
    ) -> Self {
        Self {
            fallback_identifier: fallback_identifier.into(),
            selector_cache_capacity,
            preferred_quote,
        }
    }

    /// Parses and validates a JSON configuration. Missing keys take their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed JSON, unknown keys, a zero cache
    /// capacity, or an empty fallback identifier.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.selector_cache_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "selector_cache_capacity",
                message: "must be at least 1".to_owned(),
            });
        }
        if self.fallback_identifier.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "fallback_identifier",
                message: "must not be empty".to_owned(),
            });
        }
        Ok(())
    }

    /// Returns the fallback identifier.
    #[must_use]
    pub fn fallback_identifier(&self) -> &str {
        &self.fallback_identifier
    }

    /// Returns the selector cache capacity.
    #[must_use]
    pub const fn selector_cache_capacity(&self) -> usize {
        self.selector_cache_capacity
    }

    /// Returns the preferred quote style.
    #[must_use]
    pub const fn preferred_quote(&self) -> QuoteStyle {
        self.preferred_quote
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fallback_identifier: "element".to_owned(),
            selector_cache_capacity: 256,
            preferred_quote: QuoteStyle::Single,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn empty_json_yields_defaults() {
        let config = EngineConfig::from_json("{}").expect("config");
        assert_eq!(config, EngineConfig::default());
    }

    #[rstest]
    #[case(r#"{ "selector_cache_capacity": 0 }"#)]
    #[case(r#"{ "fallback_identifier": "" }"#)]
    #[case(r#"{ "unknown": true }"#)]
    #[case(r#"{ "preferred_quote": "backtick" }"#)]
    fn invalid_configuration_is_rejected(#[case] text: &str) {
        assert!(EngineConfig::from_json(text).is_err());
    }

    #[rstest]
    #[case("single", QuoteStyle::Single)]
    #[case("DOUBLE", QuoteStyle::Double)]
    fn quote_style_parses_case_insensitively(#[case] text: &str, #[case] expected: QuoteStyle) {
        assert_eq!(text.parse::<QuoteStyle>(), Ok(expected));
    }
}
