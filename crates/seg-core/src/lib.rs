pub mod profile;
pub mod rules;
pub mod settings;
pub mod tokenizer;
pub mod trie;
pub mod unicode;

pub use profile::{AttrValue, Profile, ProfileError, ProfileOptions, SpecRow, GRAPHEME_COL};
pub use rules::{Rules, RulesError};
pub use tokenizer::{ErrorPolicy, TokenizeError, TokenizeOptions, Tokenizer};
pub use unicode::NormalizationForm;
