//! Unicode normalization, grapheme clusters and character classification.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use unicode_normalization::UnicodeNormalization;
use unicode_properties::{GeneralCategory, UnicodeGeneralCategory};
use unicode_segmentation::UnicodeSegmentation;

/// IPA primary stress mark ˈ.
pub const PRIMARY_STRESS: char = '\u{02C8}';
/// IPA secondary stress mark ˌ.
pub const SECONDARY_STRESS: char = '\u{02CC}';
/// Combining double inverted breve (tie bar above).
pub const TIE_BAR_ABOVE: char = '\u{0361}';
/// Combining double breve below (tie bar below).
pub const TIE_BAR_BELOW: char = '\u{035C}';

/// One of the four Unicode normalization forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum NormalizationForm {
    Nfc,
    Nfd,
    Nfkc,
    Nfkd,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown normalization form: {0}")]
pub struct UnknownForm(pub String);

impl NormalizationForm {
    pub fn normalize(self, s: &str) -> String {
        match self {
            NormalizationForm::Nfc => s.nfc().collect(),
            NormalizationForm::Nfd => s.nfd().collect(),
            NormalizationForm::Nfkc => s.nfkc().collect(),
            NormalizationForm::Nfkd => s.nfkd().collect(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NormalizationForm::Nfc => "NFC",
            NormalizationForm::Nfd => "NFD",
            NormalizationForm::Nfkc => "NFKC",
            NormalizationForm::Nfkd => "NFKD",
        }
    }
}

impl FromStr for NormalizationForm {
    type Err = UnknownForm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NFC" => Ok(NormalizationForm::Nfc),
            "NFD" => Ok(NormalizationForm::Nfd),
            "NFKC" => Ok(NormalizationForm::Nfkc),
            "NFKD" => Ok(NormalizationForm::Nfkd),
            _ => Err(UnknownForm(s.to_string())),
        }
    }
}

impl TryFrom<String> for NormalizationForm {
    type Error = UnknownForm;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for NormalizationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical decomposition (NFD).
pub fn nfd(s: &str) -> String {
    s.nfd().collect()
}

/// Split a string into extended grapheme clusters (UAX #29).
pub fn grapheme_clusters(s: &str) -> Vec<&str> {
    s.graphemes(true).collect()
}

/// Returns the only `char` of `s`, or `None` if `s` is empty or longer.
pub fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Spacing modifier letter (general category Lm).
pub fn is_modifier_letter(c: char) -> bool {
    c.general_category() == GeneralCategory::ModifierLetter
}

/// Modifier symbol (general category Sk), e.g. tone letters ˥ ˦ ˧.
pub fn is_modifier_symbol(c: char) -> bool {
    c.general_category() == GeneralCategory::ModifierSymbol
}

pub fn is_stress_mark(c: char) -> bool {
    c == PRIMARY_STRESS || c == SECONDARY_STRESS
}

pub fn is_tie_bar(c: char) -> bool {
    c == TIE_BAR_ABOVE || c == TIE_BAR_BELOW
}
