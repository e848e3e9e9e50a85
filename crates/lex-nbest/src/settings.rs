//! Global settings loaded from TOML.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`

use std::sync::OnceLock;

use serde::Deserialize;

use crate::converter::BoundaryCheckMode;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str).expect("settings TOML must be valid")
    })
}

/// Returns the embedded default settings TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub cost: CostSettings,
    pub nbest: NBestSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CostSettings {
    pub segment_penalty: i64,
    pub unknown_word_cost: i16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NBestSettings {
    pub max_trials: usize,
    pub candidates_per_segment: usize,
    default_mode: String,
    /// Parsed form of `default_mode`.
    #[serde(skip)]
    mode: BoundaryCheckMode,
}

impl NBestSettings {
    pub fn default_mode(&self) -> BoundaryCheckMode {
        self.mode
    }
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let mut s: Settings =
        toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    s.nbest.mode =
        s.nbest
            .default_mode
            .parse()
            .map_err(|e: crate::converter::ModeError| SettingsError::InvalidValue {
                field: "nbest.default_mode".to_string(),
                reason: e.to_string(),
            })?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_non_negative {
        ($section:ident . $field:ident) => {
            if s.$section.$field < 0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be non-negative".to_string(),
                });
            }
        };
    }
    macro_rules! check_positive_usize {
        ($section:ident . $field:ident) => {
            if s.$section.$field == 0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        };
    }

    check_non_negative!(cost.segment_penalty);
    check_non_negative!(cost.unknown_word_cost);

    check_positive_usize!(nbest.max_trials);
    check_positive_usize!(nbest.candidates_per_segment);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_default_toml() {
        let s = parse_settings_toml(DEFAULT_SETTINGS_TOML).unwrap();
        assert_eq!(s.cost.segment_penalty, 5000);
        assert_eq!(s.cost.unknown_word_cost, 10000);
        assert_eq!(s.nbest.max_trials, 500);
        assert_eq!(s.nbest.candidates_per_segment, 10);
        assert_eq!(s.nbest.default_mode(), BoundaryCheckMode::Strict);
    }

    #[test]
    fn parse_valid_custom_toml() {
        let toml = r#"
[cost]
segment_penalty = 1000
unknown_word_cost = 5000

[nbest]
max_trials = 2000
candidates_per_segment = 20
default_mode = "only_edge"
"#;
        let s = parse_settings_toml(toml).unwrap();
        assert_eq!(s.cost.segment_penalty, 1000);
        assert_eq!(s.nbest.max_trials, 2000);
        assert_eq!(s.nbest.default_mode(), BoundaryCheckMode::OnlyEdge);
    }

    #[test]
    fn error_negative_penalty() {
        let toml = r#"
[cost]
segment_penalty = -1
unknown_word_cost = 10000

[nbest]
max_trials = 500
candidates_per_segment = 10
default_mode = "strict"
"#;
        let err = parse_settings_toml(toml).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { .. }));
        assert!(err.to_string().contains("cost.segment_penalty"));
    }

    #[test]
    fn error_zero_trials() {
        let toml = r#"
[cost]
segment_penalty = 5000
unknown_word_cost = 10000

[nbest]
max_trials = 0
candidates_per_segment = 10
default_mode = "strict"
"#;
        let err = parse_settings_toml(toml).unwrap_err();
        assert!(err.to_string().contains("nbest.max_trials"));
    }

    #[test]
    fn error_unknown_mode() {
        let toml = r#"
[cost]
segment_penalty = 5000
unknown_word_cost = 10000

[nbest]
max_trials = 500
candidates_per_segment = 10
default_mode = "loose"
"#;
        let err = parse_settings_toml(toml).unwrap_err();
        assert!(err.to_string().contains("nbest.default_mode"));
        assert!(err.to_string().contains("loose"));
    }

    #[test]
    fn error_invalid_toml() {
        let err = parse_settings_toml("not valid toml {{{").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn error_missing_section() {
        let toml = r#"
[cost]
segment_penalty = 5000
unknown_word_cost = 10000
"#;
        let err = parse_settings_toml(toml).unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }
}
