use std::fs;
use std::process;

use seg_core::settings::{parse_settings_toml, Settings, SettingsError};

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

/// Read and install a custom settings file. Must run before anything reads
/// the settings.
pub fn load_settings(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    die!(seg_core::settings::init_custom(content), "Error: {}");
}

pub fn settings_export() {
    print!("{}", seg_core::settings::default_toml());
}

pub fn settings_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let summary = die!(validate_summary(&content), "Error: {}");
    println!("{summary}");
}

/// One-line summary of a valid settings file.
pub fn validate_summary(content: &str) -> Result<String, SettingsError> {
    let s: Settings = parse_settings_toml(content)?;
    Ok(format!(
        "OK: tokenize.errors={}, tokenize.word_separator={:?}, profile.null={:?}",
        s.tokenize.errors, s.tokenize.word_separator, s.profile.null
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_settings() {
        let summary = validate_summary(seg_core::settings::default_toml()).unwrap();
        assert_eq!(
            summary,
            r#"OK: tokenize.errors=replace, tokenize.word_separator=" # ", profile.null="NULL""#
        );
    }

    #[test]
    fn test_validate_rejects_bad_policy() {
        let toml = seg_core::settings::default_toml().replace("\"replace\"", "\"loose\"");
        let err = validate_summary(&toml).unwrap_err();
        assert!(err.to_string().contains("tokenize.errors"));
    }
}
