pub mod config_ops;
pub mod profile_ops;
pub mod tokenize_ops;

use std::io::{self, Read};

use seg_core::profile::SourceError;
use seg_core::rules::RulesError;
use seg_core::tokenizer::TokenizeError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Source(#[from] SourceError),
    #[error("{0}")]
    Rules(#[from] RulesError),
    #[error("{0}")]
    Tokenize(#[from] TokenizeError),
    #[error("--profile must be a path to an existing file: {0}")]
    MissingProfile(String),
}

/// The command's input: `text` if given, otherwise all of stdin, trimmed.
pub fn read_input(text: Option<&str>) -> Result<String, io::Error> {
    match text {
        Some(text) => Ok(text.trim().to_string()),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf.trim().to_string())
        }
    }
}
