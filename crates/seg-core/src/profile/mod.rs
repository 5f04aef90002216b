//! Orthography profiles.
//!
//! A `Profile` is an ordered table of graphemes, each with optional values in
//! user-defined output columns (e.g. an IPA transcription). It owns the
//! `GraphemeTrie` used to segment text into its graphemes.

pub mod source;
#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::settings::settings;
use crate::trie::GraphemeTrie;
use crate::unicode::{grapheme_clusters, NormalizationForm};

pub use source::{rules_path_for, sibling_rules, SourceError};

/// Reserved column holding the grapheme itself.
pub const GRAPHEME_COL: &str = "Grapheme";

/// Value of one column for one grapheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Null,
    One(String),
    /// One-to-many mapping, emitted as several segments in order.
    Many(Vec<String>),
}

impl AttrValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    /// The values this attribute expands to, in order.
    pub fn segments(&self) -> &[String] {
        match self {
            AttrValue::Null => &[],
            AttrValue::One(s) => std::slice::from_ref(s),
            AttrValue::Many(v) => v,
        }
    }

    /// Whether any value would break a TSV row.
    fn has_separator(&self) -> bool {
        self.segments().iter().any(|s| contains_separator(s))
    }

    fn normalized(self, form: NormalizationForm) -> Self {
        match self {
            AttrValue::Null => AttrValue::Null,
            AttrValue::One(s) => AttrValue::One(form.normalize(&s)),
            AttrValue::Many(v) => AttrValue::Many(v.iter().map(|s| form.normalize(s)).collect()),
        }
    }

    fn render(&self, null: &str) -> String {
        match self {
            AttrValue::Null => null.to_string(),
            AttrValue::One(s) => s.clone(),
            AttrValue::Many(v) => v.join(" "),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::One(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::One(s)
    }
}

impl<S: Into<String>> From<Option<S>> for AttrValue {
    fn from(s: Option<S>) -> Self {
        s.map_or(AttrValue::Null, |s| AttrValue::One(s.into()))
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(v: Vec<String>) -> Self {
        AttrValue::Many(v)
    }
}

fn contains_separator(s: &str) -> bool {
    s.contains(['\t', '\n', '\r'])
}

/// One grapheme specification as handed to the profile: column → value.
pub type SpecRow = Vec<(String, AttrValue)>;

/// A validated grapheme specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphemeSpec {
    grapheme: String,
    attrs: Vec<(String, AttrValue)>,
}

impl GraphemeSpec {
    pub fn grapheme(&self) -> &str {
        &self.grapheme
    }

    /// Value of `column`, or `None` if this grapheme does not specify it.
    pub fn get(&self, column: &str) -> Option<&AttrValue> {
        self.attrs
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attrs.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Non-fatal issue found while building a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDiagnostic {
    /// Zero-based index of the offending row.
    pub row: usize,
    pub grapheme: String,
}

impl fmt::Display for ProfileDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Line numbers count the header row of a profile file.
        write!(
            f,
            "line {}: duplicate grapheme in profile: {}",
            self.row + 2,
            self.grapheme
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("row {row}: invalid grapheme specification, missing {GRAPHEME_COL} column")]
    MissingGrapheme { row: usize },
    #[error("row {row}: {GRAPHEME_COL} must be a non-empty string")]
    EmptyGrapheme { row: usize },
    #[error("row {row}: {column} contains a tab or line break")]
    InvalidField { row: usize, column: String },
}

#[derive(Debug, Clone, Default)]
pub struct ProfileOptions {
    /// Normalization applied to every key and value before validation.
    pub form: Option<NormalizationForm>,
    /// Opaque metadata carried along with the profile.
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// File the profile was read from.
    pub source: Option<PathBuf>,
}

#[derive(Debug)]
pub struct Profile {
    specs: Vec<GraphemeSpec>,
    index: HashMap<String, usize>,
    columns: Vec<String>,
    trie: GraphemeTrie,
    diagnostics: Vec<ProfileDiagnostic>,
    options: ProfileOptions,
}

impl Profile {
    pub fn new(rows: impl IntoIterator<Item = SpecRow>) -> Result<Self, ProfileError> {
        Self::with_options(rows, ProfileOptions::default())
    }

    /// Validate and index grapheme specifications.
    ///
    /// Duplicate graphemes keep the first row; later rows are reported in
    /// `diagnostics()` and dropped.
    pub fn with_options(
        rows: impl IntoIterator<Item = SpecRow>,
        options: ProfileOptions,
    ) -> Result<Self, ProfileError> {
        let mut specs: Vec<GraphemeSpec> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut columns: Vec<String> = Vec::new();
        let mut diagnostics = Vec::new();

        for (row, spec) in rows.into_iter().enumerate() {
            let mut grapheme = None;
            let mut attrs: Vec<(String, AttrValue)> = Vec::new();
            for (key, value) in spec {
                let (key, value) = match options.form {
                    Some(form) => (form.normalize(&key), value.normalized(form)),
                    None => (key, value),
                };
                if key == GRAPHEME_COL {
                    grapheme.get_or_insert(value);
                } else if !attrs.iter().any(|(k, _)| *k == key) {
                    attrs.push((key, value));
                }
            }

            let grapheme = match grapheme {
                None => return Err(ProfileError::MissingGrapheme { row }),
                Some(AttrValue::One(g)) if !g.is_empty() => g,
                Some(_) => return Err(ProfileError::EmptyGrapheme { row }),
            };

            if contains_separator(&grapheme) {
                let column = GRAPHEME_COL.to_string();
                return Err(ProfileError::InvalidField { row, column });
            }
            if let Some((key, _)) = attrs
                .iter()
                .find(|(key, value)| contains_separator(key) || value.has_separator())
            {
                let column = key.clone();
                return Err(ProfileError::InvalidField { row, column });
            }

            for (key, _) in &attrs {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }

            if index.contains_key(&grapheme) {
                let diagnostic = ProfileDiagnostic { row, grapheme };
                warn!("{diagnostic}");
                diagnostics.push(diagnostic);
                continue;
            }
            index.insert(grapheme.clone(), specs.len());
            specs.push(GraphemeSpec { grapheme, attrs });
        }

        Ok(Self::assemble(specs, index, columns, diagnostics, options))
    }

    fn assemble(
        specs: Vec<GraphemeSpec>,
        index: HashMap<String, usize>,
        columns: Vec<String>,
        diagnostics: Vec<ProfileDiagnostic>,
        options: ProfileOptions,
    ) -> Self {
        let trie = GraphemeTrie::build(specs.iter().map(|s| s.grapheme.as_str()));
        Self {
            specs,
            index,
            columns,
            trie,
            diagnostics,
            options,
        }
    }

    /// Build a frequency profile from the grapheme clusters of `text`.
    ///
    /// Each distinct cluster gets a `frequency` column and an identity
    /// `mapping` column. Rows are ordered by descending frequency, ties by
    /// first occurrence. Whitespace clusters are skipped.
    pub fn from_text(text: &str, mapping: &str) -> Self {
        let mut counts: Vec<(&str, u64)> = Vec::new();
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for cluster in grapheme_clusters(text) {
            if cluster.chars().all(char::is_whitespace) {
                continue;
            }
            match seen.get(cluster) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    seen.insert(cluster, counts.len());
                    counts.push((cluster, 1));
                }
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        let mut columns = vec!["frequency".to_string()];
        if mapping != GRAPHEME_COL && mapping != "frequency" {
            columns.push(mapping.to_string());
        }
        let mut index = HashMap::with_capacity(counts.len());
        let specs: Vec<GraphemeSpec> = counts
            .into_iter()
            .enumerate()
            .map(|(i, (cluster, frequency))| {
                index.insert(cluster.to_string(), i);
                let mut attrs = vec![(
                    "frequency".to_string(),
                    AttrValue::One(frequency.to_string()),
                )];
                if columns.len() > 1 {
                    attrs.push((mapping.to_string(), AttrValue::from(cluster)));
                }
                GraphemeSpec {
                    grapheme: cluster.to_string(),
                    attrs,
                }
            })
            .collect();

        Self::assemble(specs, index, columns, Vec::new(), ProfileOptions::default())
    }

    /// `from_text` over the lines of a file, joined with a space.
    pub fn from_text_file(path: &Path, mapping: &str) -> Result<Self, io::Error> {
        let content = fs::read_to_string(path)?;
        let text = content.lines().collect::<Vec<_>>().join(" ");
        Ok(Self::from_text(&text, mapping))
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Grapheme specifications in insertion order.
    pub fn graphemes(&self) -> impl Iterator<Item = &GraphemeSpec> {
        self.specs.iter()
    }

    pub fn get(&self, grapheme: &str) -> Option<&GraphemeSpec> {
        self.index.get(grapheme).map(|&i| &self.specs[i])
    }

    pub fn contains(&self, grapheme: &str) -> bool {
        self.index.contains_key(grapheme)
    }

    /// Labels of all non-grapheme columns, in first-seen order.
    pub fn column_labels(&self) -> &[String] {
        &self.columns
    }

    /// Whether `column` is the grapheme column or one of the labels.
    pub fn has_column(&self, column: &str) -> bool {
        column == GRAPHEME_COL || self.columns.iter().any(|c| c == column)
    }

    pub fn trie(&self) -> &GraphemeTrie {
        &self.trie
    }

    pub fn diagnostics(&self) -> &[ProfileDiagnostic] {
        &self.diagnostics
    }

    pub fn form(&self) -> Option<NormalizationForm> {
        self.options.form
    }

    pub fn metadata(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.options.metadata
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.options.source.as_deref()
    }

    /// Full rows, one per grapheme, with `Null` for unspecified columns.
    pub fn rows(&self) -> impl Iterator<Item = SpecRow> + '_ {
        self.specs.iter().map(|spec| {
            let mut row = Vec::with_capacity(self.columns.len() + 1);
            row.push((GRAPHEME_COL.to_string(), AttrValue::from(spec.grapheme())));
            for column in &self.columns {
                let value = spec.get(column).cloned().unwrap_or(AttrValue::Null);
                row.push((column.clone(), value));
            }
            row
        })
    }

    /// Render as tab-separated text: a header row, then one row per grapheme.
    /// Construction rejects tabs and line breaks, so every field fits.
    pub fn to_tsv(&self, null: &str) -> String {
        let mut lines = Vec::with_capacity(self.specs.len() + 1);
        let mut header = vec![GRAPHEME_COL];
        header.extend(self.columns.iter().map(String::as_str));
        lines.push(header.join("\t"));
        for row in self.rows() {
            let fields: Vec<String> = row.iter().map(|(_, v)| v.render(null)).collect();
            lines.push(fields.join("\t"));
        }
        lines.join("\n")
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_tsv(&settings().profile.null))
    }
}
