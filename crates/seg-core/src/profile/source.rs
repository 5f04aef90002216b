//! Reading profiles from disk.
//!
//! Two layouts are supported: a plain tab-separated file whose header names
//! the columns, and a JSON metadata file describing a single table (its
//! `url`, dialect, null sentinel and per-column list separators).

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{AttrValue, Profile, ProfileError, ProfileOptions, SpecRow, GRAPHEME_COL};
use crate::rules::{Rules, RulesError};
use crate::settings::settings;
use crate::unicode::NormalizationForm;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid profile metadata: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Rules(#[from] RulesError),
}

#[derive(Deserialize)]
struct ProfileMetadata {
    tables: Vec<TableDescription>,
    #[serde(flatten)]
    common: Map<String, Value>,
}

#[derive(Deserialize)]
struct TableDescription {
    #[serde(default)]
    url: String,
    #[serde(default)]
    null: Option<String>,
    #[serde(default)]
    dialect: Dialect,
    #[serde(default, rename = "tableSchema")]
    table_schema: TableSchema,
}

#[derive(Deserialize, Default)]
struct Dialect {
    delimiter: Option<String>,
}

#[derive(Deserialize, Default)]
struct TableSchema {
    #[serde(default)]
    columns: Vec<ColumnDescription>,
}

#[derive(Deserialize)]
struct ColumnDescription {
    name: Option<String>,
    separator: Option<String>,
}

/// How the fields of a delimited profile are split and interpreted.
pub struct TableFormat<'a> {
    pub delimiter: char,
    pub null: &'a str,
    /// Column name → separator for columns holding lists.
    pub separators: HashMap<String, String>,
}

impl<'a> TableFormat<'a> {
    pub fn tsv(null: &'a str) -> Self {
        Self {
            delimiter: '\t',
            null,
            separators: HashMap::new(),
        }
    }
}

/// Parse a tab-separated profile. Empty fields and fields equal to `null`
/// are `Null` except in the grapheme column.
pub fn parse_tsv(text: &str, null: &str) -> Result<Vec<SpecRow>, SourceError> {
    parse_table(text, &TableFormat::tsv(null))
}

/// Parse a delimited profile table whose first non-empty line is the header.
pub fn parse_table(text: &str, format: &TableFormat<'_>) -> Result<Vec<SpecRow>, SourceError> {
    let mut lines = text
        .trim_start_matches('\u{FEFF}')
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((_, header)) = lines.next() else {
        return Err(SourceError::Parse("profile is empty".to_string()));
    };
    let header: Vec<&str> = header.split(format.delimiter).collect();
    if !header.contains(&GRAPHEME_COL) {
        return Err(SourceError::Parse(format!(
            "header has no {GRAPHEME_COL} column"
        )));
    }

    let mut rows = Vec::new();
    for (lineno, line) in lines {
        let fields: Vec<&str> = line.split(format.delimiter).collect();
        if fields.len() > header.len() {
            return Err(SourceError::Parse(format!(
                "line {}: expected at most {} fields, found {}",
                lineno + 1,
                header.len(),
                fields.len()
            )));
        }
        let row: SpecRow = header
            .iter()
            .enumerate()
            .map(|(i, &column)| {
                let field = fields.get(i).copied().unwrap_or("");
                (column.to_string(), field_value(column, field, format))
            })
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

fn field_value(column: &str, field: &str, format: &TableFormat<'_>) -> AttrValue {
    if column == GRAPHEME_COL {
        return AttrValue::from(field);
    }
    if field.is_empty() || field == format.null {
        return AttrValue::Null;
    }
    match format.separators.get(column) {
        Some(sep) => AttrValue::Many(
            field
                .split(sep.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        None => AttrValue::from(field),
    }
}

impl Profile {
    /// Read a profile from a metadata JSON file or a plain TSV file.
    ///
    /// A file that parses as a JSON object is treated as metadata; anything
    /// else is read as tab-separated text.
    pub fn open(path: &Path, form: Option<NormalizationForm>) -> Result<Self, SourceError> {
        let content = fs::read_to_string(path)?;
        match serde_json::from_str::<Value>(&content) {
            Ok(value @ Value::Object(_)) => Self::from_metadata(path, value, form),
            _ => {
                let rows = parse_tsv(&content, &settings().profile.null)?;
                let options = ProfileOptions {
                    form,
                    metadata: Map::new(),
                    source: Some(path.to_path_buf()),
                };
                Ok(Self::with_options(rows, options)?)
            }
        }
    }

    fn from_metadata(
        path: &Path,
        value: Value,
        form: Option<NormalizationForm>,
    ) -> Result<Self, SourceError> {
        let ProfileMetadata { tables, mut common } = serde_json::from_value(value)?;
        let [table] = <[TableDescription; 1]>::try_from(tables).map_err(|_| {
            SourceError::Parse("profile description must contain exactly one table".to_string())
        })?;
        if table.url.is_empty() {
            return Err(SourceError::Parse("table has no url".to_string()));
        }

        let delimiter = match table.dialect.delimiter.as_deref() {
            None => '\t',
            Some(d) => {
                let mut chars = d.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => c,
                    _ => {
                        return Err(SourceError::Parse(format!(
                            "delimiter must be a single character: {d:?}"
                        )))
                    }
                }
            }
        };
        let null = table
            .null
            .unwrap_or_else(|| settings().profile.null.clone());
        let separators = table
            .table_schema
            .columns
            .into_iter()
            .filter_map(|c| Some((c.name?, c.separator?)))
            .collect();

        let table_path = path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(&table.url);
        let content = fs::read_to_string(&table_path)?;
        let format = TableFormat {
            delimiter,
            null: &null,
            separators,
        };
        let rows = parse_table(&content, &format)?;

        common.remove("@context");
        let options = ProfileOptions {
            form,
            metadata: common,
            source: Some(path.to_path_buf()),
        };
        Ok(Self::with_options(rows, options)?)
    }
}

/// Rules file conventionally kept next to a profile: `<stem>.rules`.
pub fn rules_path_for(profile_path: &Path) -> Option<PathBuf> {
    let candidate = profile_path.with_extension("rules");
    candidate.is_file().then_some(candidate)
}

/// Load the rules file kept next to a profile, if there is one.
pub fn sibling_rules(profile_path: &Path) -> Result<Option<Rules>, SourceError> {
    match rules_path_for(profile_path) {
        Some(path) => Ok(Some(Rules::open(&path)?)),
        None => Ok(None),
    }
}
