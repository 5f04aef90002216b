use std::path::PathBuf;
use std::process;

use seg_core::profile::{sibling_rules, Profile};
use seg_core::rules::Rules;
use seg_core::tokenizer::{ErrorPolicy, TokenizeOptions, Tokenizer};
use seg_core::unicode::NormalizationForm;

use super::{read_input, CliError};

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

#[derive(Debug, Clone, Default)]
pub struct TokenizeArgs {
    pub profile: Option<PathBuf>,
    pub rules: Option<PathBuf>,
    pub mapping: Option<String>,
    pub form: Option<NormalizationForm>,
    pub ipa: bool,
    pub errors: Option<ErrorPolicy>,
    pub segment_separator: Option<String>,
    pub separator: Option<String>,
}

impl TokenizeArgs {
    fn options(&self) -> TokenizeOptions {
        let defaults = TokenizeOptions::default();
        TokenizeOptions {
            column: self.mapping.clone(),
            form: self.form,
            ipa: self.ipa,
            segment_separator: self
                .segment_separator
                .clone()
                .unwrap_or(defaults.segment_separator),
            word_separator: self.separator.clone().unwrap_or(defaults.word_separator),
            errors: self.errors.clone().unwrap_or(defaults.errors),
        }
    }
}

pub fn tokenize_cmd(text: Option<&str>, args: &TokenizeArgs) {
    let input = die!(read_input(text), "Error reading input: {}");
    let tokenizer = die!(build_tokenizer(args), "Error: {}");
    let out = die!(tokenize_text(&tokenizer, &input, args), "Error: {}");
    println!("{out}");
}

/// Tokenizer for the given profile and rules. Without `--rules`, a rules
/// file next to the profile is picked up.
pub fn build_tokenizer(args: &TokenizeArgs) -> Result<Tokenizer, CliError> {
    let mut builder = Tokenizer::builder();
    if let Some(path) = &args.profile {
        if !path.is_file() {
            return Err(CliError::MissingProfile(path.display().to_string()));
        }
        builder = builder.profile(Profile::open(path, None)?);
    }
    let rules = match (&args.rules, &args.profile) {
        (Some(path), _) => Some(Rules::open(path)?),
        (None, Some(profile)) => sibling_rules(profile)?,
        (None, None) => None,
    };
    if let Some(rules) = rules {
        builder = builder.rules(rules);
    }
    Ok(builder.build())
}

pub fn tokenize_text(
    tokenizer: &Tokenizer,
    text: &str,
    args: &TokenizeArgs,
) -> Result<String, CliError> {
    Ok(tokenizer.tokenize(text, &args.options())?)
}

/// Convenience for one-shot use: build and run.
pub fn run(text: &str, args: &TokenizeArgs) -> Result<String, CliError> {
    let tokenizer = build_tokenizer(args)?;
    tokenize_text(&tokenizer, text, args)
}
