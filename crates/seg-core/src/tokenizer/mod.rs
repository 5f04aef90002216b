//! Profile-driven tokenization.
//!
//! A `Tokenizer` turns a string into space-separated segments, either by
//! plain grapheme-cluster splitting, by longest-match parsing against an
//! orthography profile, or by IPA modifier combination. The result may then
//! be rewritten by ordered regex rules.

pub mod ipa;
pub mod policy;

use std::sync::Arc;

use tracing::debug;

use crate::profile::{Profile, GRAPHEME_COL};
use crate::rules::Rules;
use crate::settings::settings;
use crate::trie::Segment;
use crate::unicode::{grapheme_clusters, nfd, NormalizationForm};

pub use policy::{ErrorHandler, ErrorPolicy, UnknownPolicy};
use policy::ErrorHandlers;

#[derive(Debug, thiserror::Error)]
pub enum TokenizeError {
    #[error("invalid grapheme: {0}")]
    InvalidGrapheme(String),
    #[error("column {0} not found in profile")]
    UnknownColumn(String),
    #[error("no orthography profile specified")]
    NoProfile,
}

/// Per-call tokenization options.
#[derive(Debug, Clone)]
pub struct TokenizeOptions {
    /// Output column; `None` (or the grapheme column) emits matched graphemes.
    pub column: Option<String>,
    /// Normalization applied to each output word.
    pub form: Option<NormalizationForm>,
    /// Combine modifier letters, stress and tone marks into IPA segments.
    pub ipa: bool,
    pub segment_separator: String,
    pub word_separator: String,
    pub errors: ErrorPolicy,
}

impl Default for TokenizeOptions {
    fn default() -> Self {
        let s = &settings().tokenize;
        Self {
            column: None,
            form: None,
            ipa: false,
            segment_separator: s.segment_separator.clone(),
            word_separator: s.word_separator.clone(),
            errors: s.error_policy(),
        }
    }
}

#[derive(Clone)]
pub struct Tokenizer {
    profile: Option<Arc<Profile>>,
    rules: Option<Arc<Rules>>,
    handlers: ErrorHandlers,
}

impl std::fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer")
            .field("profile", &self.profile.as_ref().map(|p| p.len()))
            .field("rules", &self.rules.as_ref().map(|r| r.len()))
            .finish()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    /// Tokenizer without profile or rules: plain grapheme-cluster splitting.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn with_profile(profile: impl Into<Arc<Profile>>) -> Self {
        Self::builder().profile(profile).build()
    }

    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::default()
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_deref()
    }

    pub fn rule_set(&self) -> Option<&Rules> {
        self.rules.as_deref()
    }

    /// Tokenize `text` into segments joined by `opts.segment_separator`,
    /// words joined by `opts.word_separator`.
    ///
    /// The output column is only checked when a word is parsed against the
    /// profile; IPA mode and plain splitting never look at it.
    pub fn tokenize(&self, text: &str, opts: &TokenizeOptions) -> Result<String, TokenizeError> {
        let text = nfd(text);
        let handler = self.handlers.resolve(&opts.errors);

        let mut words = Vec::new();
        for word in text.split_whitespace() {
            let tokens = if opts.ipa {
                ipa::combine_modifiers(&grapheme_clusters(word))
            } else if let Some(profile) = &self.profile {
                let column = self.output_column(opts.column.as_deref())?;
                self.map_word(profile, word, column, handler)?
            } else {
                grapheme_clusters(word)
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            };

            let mut out = tokens.join(&opts.segment_separator).trim().to_string();
            out = self.rules(&out);
            if let Some(form) = opts.form {
                out = form.normalize(&out);
            }
            words.push(out);
        }
        Ok(words.join(&opts.word_separator))
    }

    /// Tokenize with default options.
    pub fn graphemes(&self, text: &str) -> Result<String, TokenizeError> {
        self.tokenize(text, &TokenizeOptions::default())
    }

    /// Parse a single word against the profile and map each matched
    /// grapheme through `column`.
    pub fn transform(
        &self,
        word: &str,
        column: Option<&str>,
        errors: &ErrorPolicy,
    ) -> Result<Vec<String>, TokenizeError> {
        let profile = self.profile.as_ref().ok_or(TokenizeError::NoProfile)?;
        let column = self.output_column(column)?;
        self.map_word(profile, word, column, self.handlers.resolve(errors))
    }

    /// Apply the attached rules, or return `s` unchanged without any.
    pub fn rules(&self, s: &str) -> String {
        match &self.rules {
            Some(rules) => rules.apply(s),
            None => s.to_string(),
        }
    }

    /// Split `text` into code points, ignoring any profile.
    pub fn characters(&self, text: &str, segment_separator: &str, word_separator: &str) -> String {
        let text = nfd(text);
        text.split_whitespace()
            .map(|word| {
                word.chars()
                    .map(String::from)
                    .collect::<Vec<_>>()
                    .join(segment_separator)
            })
            .collect::<Vec<_>>()
            .join(word_separator)
    }

    /// Resolve the requested output column; `None` means graphemes.
    fn output_column<'a>(&self, column: Option<&'a str>) -> Result<Option<&'a str>, TokenizeError> {
        match column {
            None | Some(GRAPHEME_COL) => Ok(None),
            Some(column) => match &self.profile {
                Some(profile) if !profile.has_column(column) => {
                    Err(TokenizeError::UnknownColumn(column.to_string()))
                }
                _ => Ok(Some(column)),
            },
        }
    }

    fn map_word(
        &self,
        profile: &Profile,
        word: &str,
        column: Option<&str>,
        handler: &ErrorHandler,
    ) -> Result<Vec<String>, TokenizeError> {
        let mut out = Vec::new();
        for segment in profile.trie().segment(word) {
            match segment {
                Segment::Unmatched(c) => out.push(handler(c)?),
                Segment::Grapheme { text, .. } => match column {
                    None => out.push(text.to_string()),
                    Some(column) => {
                        match profile.get(text).and_then(|spec| spec.get(column)) {
                            Some(value) => out.extend(value.segments().iter().cloned()),
                            None => {
                                debug!(grapheme = text, column, "no value for column");
                                out.push((self.handlers.replace)(text)?);
                            }
                        }
                    }
                },
            }
        }
        Ok(out)
    }
}

/// Builds a `Tokenizer`, optionally overriding its named error handlers.
#[derive(Default)]
pub struct TokenizerBuilder {
    profile: Option<Arc<Profile>>,
    rules: Option<Arc<Rules>>,
    marker: Option<String>,
    strict: Option<ErrorHandler>,
    replace: Option<ErrorHandler>,
    ignore: Option<ErrorHandler>,
}

impl TokenizerBuilder {
    pub fn profile(mut self, profile: impl Into<Arc<Profile>>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn rules(mut self, rules: impl Into<Arc<Rules>>) -> Self {
        self.rules = Some(rules.into());
        self
    }

    /// Marker emitted by the default replace handler.
    pub fn replacement_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    pub fn on_strict<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<String, TokenizeError> + Send + Sync + 'static,
    {
        self.strict = Some(Arc::new(f));
        self
    }

    pub fn on_replace<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<String, TokenizeError> + Send + Sync + 'static,
    {
        self.replace = Some(Arc::new(f));
        self
    }

    pub fn on_ignore<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<String, TokenizeError> + Send + Sync + 'static,
    {
        self.ignore = Some(Arc::new(f));
        self
    }

    pub fn build(self) -> Tokenizer {
        let marker = self
            .marker
            .unwrap_or_else(|| settings().tokenize.replacement_marker.clone());
        let mut handlers = ErrorHandlers::new(marker);
        if let Some(h) = self.strict {
            handlers.strict = h;
        }
        if let Some(h) = self.replace {
            handlers.replace = h;
        }
        if let Some(h) = self.ignore {
            handlers.ignore = h;
        }
        Tokenizer {
            profile: self.profile,
            rules: self.rules,
            handlers,
        }
    }
}
