//! Ordered regular-expression rewrite rules applied after segmentation.
//!
//! Each rule is a single global substitution over the output of the previous
//! one. Replacements use `\1`-style back-references.

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::unicode::nfd;

#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("rule {index}: invalid pattern: {source}")]
    Pattern {
        index: usize,
        #[source]
        source: regex::Error,
    },

    #[error("line {line}: expected `pattern, replacement`")]
    Parse { line: usize },
}

#[derive(Debug)]
struct Rule {
    pattern: Regex,
    replacement: String,
}

#[derive(Debug)]
pub struct Rules {
    rules: Vec<Rule>,
}

impl Rules {
    /// Compile `(pattern, replacement)` pairs. Every pattern is compiled up
    /// front so a bad rule fails here rather than on first use.
    pub fn new<I, P, R>(pairs: I) -> Result<Self, RulesError>
    where
        I: IntoIterator<Item = (P, R)>,
        P: AsRef<str>,
        R: AsRef<str>,
    {
        let rules = pairs
            .into_iter()
            .enumerate()
            .map(|(index, (pattern, replacement))| {
                let pattern = Regex::new(pattern.as_ref())
                    .map_err(|source| RulesError::Pattern { index, source })?;
                Ok(Rule {
                    pattern,
                    replacement: translate_replacement(replacement.as_ref()),
                })
            })
            .collect::<Result<Vec<_>, RulesError>>()?;
        Ok(Self { rules })
    }

    /// Parse a rules file: one `pattern, replacement` per line, split on the
    /// last comma. Blank lines and lines starting with `#` are skipped and the
    /// text is NFD-normalized first.
    ///
    /// Both halves are trimmed, so the space usually written after the comma
    /// is not part of the replacement. A rule that must emit leading or
    /// trailing whitespace has to be built with `Rules::new`.
    pub fn from_text(text: &str) -> Result<Self, RulesError> {
        let text = nfd(text);
        let mut pairs = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (pattern, replacement) = line
                .rsplit_once(',')
                .ok_or(RulesError::Parse { line: i + 1 })?;
            pairs.push((pattern.trim().to_string(), replacement.trim().to_string()));
        }
        Self::new(pairs)
    }

    pub fn open(path: &Path) -> Result<Self, RulesError> {
        Self::from_text(&fs::read_to_string(path)?)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule once, in order.
    pub fn apply(&self, s: &str) -> String {
        let mut out = s.to_string();
        for rule in &self.rules {
            let next = rule.pattern.replace_all(&out, rule.replacement.as_str());
            if let Cow::Owned(rewritten) = next {
                debug!(pattern = rule.pattern.as_str(), "rule applied");
                out = rewritten;
            }
        }
        out
    }
}

/// Rewrite `\1`-style group references into the `${1}` syntax of the
/// `regex` crate, escaping literal `$`.
fn translate_replacement(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '$' => out.push_str("$$"),
            '\\' => match chars.peek() {
                Some(d) if d.is_ascii_digit() => {
                    let mut group = String::new();
                    while let Some(d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                        group.push(*d);
                        chars.next();
                    }
                    out.push_str("${");
                    out.push_str(&group);
                    out.push('}');
                }
                Some('\\') => {
                    out.push('\\');
                    chars.next();
                }
                _ => out.push('\\'),
            },
            _ => out.push(c),
        }
    }
    out
}
