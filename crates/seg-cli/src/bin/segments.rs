use std::path::PathBuf;

use clap::{Parser, Subcommand};

use seg_cli::commands::tokenize_ops::TokenizeArgs;
use seg_cli::commands::{config_ops, profile_ops, tokenize_ops};
use seg_cli::trace_init::init_tracing;
use seg_core::tokenizer::ErrorPolicy;
use seg_core::unicode::NormalizationForm;

#[derive(Parser)]
#[command(name = "segments", about = "Orthography-profile tokenization")]
struct Cli {
    /// Custom settings TOML (see `segments settings export`)
    #[arg(long, global = true)]
    settings: Option<String>,
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Tokenize TEXT (or stdin)
    Tokenize {
        /// Text to tokenize; read from stdin if omitted
        text: Option<String>,
        /// Path to an orthography profile (TSV or JSON metadata)
        #[arg(long)]
        profile: Option<PathBuf>,
        /// Path to a rules file (default: <profile-stem>.rules if present)
        #[arg(long)]
        rules: Option<PathBuf>,
        /// Profile column to map graphemes to
        #[arg(long)]
        mapping: Option<String>,
        /// Normalization form of the output (NFC, NFD, NFKC, NFKD)
        #[arg(long)]
        form: Option<NormalizationForm>,
        /// Combine IPA modifier letters, stress and tone marks
        #[arg(long)]
        ipa: bool,
        /// Handling of unmatched input: strict, replace or ignore
        #[arg(long)]
        errors: Option<ErrorPolicy>,
        /// Separator between segments
        #[arg(long)]
        segment_separator: Option<String>,
        /// Separator between words
        #[arg(long)]
        separator: Option<String>,
    },

    /// Print a frequency profile of TEXT (or stdin)
    Profile {
        /// Text to profile; read from stdin if omitted
        text: Option<String>,
        /// Name of the identity mapping column
        #[arg(long)]
        mapping: Option<String>,
    },

    /// Settings management
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the default settings TOML
    Export,
    /// Validate a settings TOML file
    Validate {
        /// Path to the settings file
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Some(file) = &cli.settings {
        config_ops::load_settings(file);
    }

    match cli.command {
        Command::Tokenize {
            text,
            profile,
            rules,
            mapping,
            form,
            ipa,
            errors,
            segment_separator,
            separator,
        } => {
            let args = TokenizeArgs {
                profile,
                rules,
                mapping,
                form,
                ipa,
                errors,
                segment_separator,
                separator,
            };
            tokenize_ops::tokenize_cmd(text.as_deref(), &args);
        }
        Command::Profile { text, mapping } => {
            profile_ops::profile_cmd(text.as_deref(), mapping.as_deref())
        }
        Command::Settings { action } => match action {
            SettingsAction::Export => config_ops::settings_export(),
            SettingsAction::Validate { file } => config_ops::settings_validate(&file),
        },
    }
}
