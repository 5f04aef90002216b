//! Global settings loaded from TOML.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`

use std::sync::OnceLock;

use serde::Deserialize;

use crate::profile::GRAPHEME_COL;
use crate::tokenizer::ErrorPolicy;

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
    pub tokenize: TokenizeSettings,
    pub profile: ProfileSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenizeSettings {
    pub segment_separator: String,
    pub word_separator: String,
    pub errors: String,
    pub replacement_marker: String,
}

impl TokenizeSettings {
    /// The default error policy. Always valid once parsed.
    pub fn error_policy(&self) -> ErrorPolicy {
        self.errors.parse().unwrap_or(ErrorPolicy::Replace)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileSettings {
    pub null: String,
    pub mapping_column: String,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings =
        toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_non_empty {
        ($section:ident . $field:ident) => {
            if s.$section.$field.is_empty() {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        };
    }

    check_non_empty!(tokenize.word_separator);
    check_non_empty!(profile.null);
    check_non_empty!(profile.mapping_column);

    if s.tokenize.replacement_marker.chars().count() != 1 {
        return Err(SettingsError::InvalidValue {
            field: "tokenize.replacement_marker".to_string(),
            reason: "must be a single character".to_string(),
        });
    }
    if s.tokenize.errors.parse::<ErrorPolicy>().is_err() {
        return Err(SettingsError::InvalidValue {
            field: "tokenize.errors".to_string(),
            reason: "must be one of strict, replace, ignore".to_string(),
        });
    }
    if s.profile.mapping_column == GRAPHEME_COL {
        return Err(SettingsError::InvalidValue {
            field: "profile.mapping_column".to_string(),
            reason: format!("must differ from the {GRAPHEME_COL} column"),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
[tokenize]
segment_separator = "."
word_separator = " | "
errors = "strict"
replacement_marker = "?"

[profile]
null = "-"
mapping_column = "IPA"
"#;

    #[test]
    fn parse_default_toml() {
        let s = parse_settings_toml(DEFAULT_SETTINGS_TOML).unwrap();
        assert_eq!(s.tokenize.segment_separator, " ");
        assert_eq!(s.tokenize.word_separator, " # ");
        assert_eq!(s.tokenize.replacement_marker, "\u{FFFD}");
        assert!(matches!(s.tokenize.error_policy(), ErrorPolicy::Replace));
        assert_eq!(s.profile.null, "NULL");
        assert_eq!(s.profile.mapping_column, "mapping");
    }

    #[test]
    fn parse_valid_custom_toml() {
        let s = parse_settings_toml(VALID).unwrap();
        assert_eq!(s.tokenize.segment_separator, ".");
        assert!(matches!(s.tokenize.error_policy(), ErrorPolicy::Strict));
        assert_eq!(s.profile.mapping_column, "IPA");
    }

    #[test]
    fn error_multi_char_marker() {
        let toml = VALID.replace(r#"replacement_marker = "?""#, r#"replacement_marker = "??""#);
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { .. }));
        assert!(err.to_string().contains("tokenize.replacement_marker"));
    }

    #[test]
    fn error_unknown_policy() {
        let toml = VALID.replace(r#"errors = "strict""#, r#"errors = "lenient""#);
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("tokenize.errors"));
    }

    #[test]
    fn error_empty_null() {
        let toml = VALID.replace(r#"null = "-""#, r#"null = """#);
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("profile.null"));
    }

    #[test]
    fn error_mapping_is_grapheme_column() {
        let toml = VALID.replace(r#"mapping_column = "IPA""#, r#"mapping_column = "Grapheme""#);
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("profile.mapping_column"));
    }

    #[test]
    fn error_invalid_toml() {
        let err = parse_settings_toml("not valid toml {{{").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn error_missing_section() {
        let toml = r#"
[tokenize]
segment_separator = " "
word_separator = " # "
errors = "replace"
replacement_marker = "?"
"#;
        let err = parse_settings_toml(toml).unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }
}
