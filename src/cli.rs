//! Command-line interface for chunk-translator

use crate::text_processor::BudgetMeasure;
use crate::utils::ProviderKind;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Translate long text files chunk by chunk, resuming where a previous run stopped
#[derive(Parser, Debug)]
#[command(name = "chunk-translator", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file (default: ./config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split, translate the missing chunks and merge
    Run {
        #[command(flatten)]
        job: JobArgs,

        #[command(flatten)]
        split: SplitArgs,

        /// Translation backend (papago, anthropic)
        #[arg(long, value_name = "KIND")]
        provider: Option<ProviderKind>,

        /// Discard the existing split and translations first
        #[arg(long)]
        resplit: bool,

        /// Exit without waiting for Enter after the run
        #[arg(long)]
        no_pause: bool,
    },

    /// Only split the input into chunk files
    Split {
        /// Text file to split
        #[arg(long, short, value_name = "FILE")]
        input: PathBuf,

        /// Directory holding the working directories (default: from config)
        #[arg(long, value_name = "DIR")]
        work_dir: Option<PathBuf>,

        #[command(flatten)]
        split: SplitArgs,

        /// Discard an existing split first
        #[arg(long)]
        resplit: bool,
    },

    /// Show how far a run has progressed
    Status {
        #[command(flatten)]
        job: JobArgs,
    },

    /// Merge the translated chunks into the output file
    Merge {
        #[command(flatten)]
        job: JobArgs,

        /// Merge even if some chunks have no translation yet
        #[arg(long)]
        allow_gaps: bool,
    },

    /// List the supported languages
    Languages,
}

/// Identifies one run: which file, which pair, which working directory.
#[derive(Args, Debug, Clone)]
pub struct JobArgs {
    /// Text file to translate
    #[arg(long, short, value_name = "FILE")]
    pub input: PathBuf,

    /// Source language, as a code (ko) or menu number (1). Prompted when omitted
    #[arg(long, short, value_name = "LANG")]
    pub source: Option<String>,

    /// Target language, as a code (en) or menu number (3). Prompted when omitted
    #[arg(long, short, value_name = "LANG")]
    pub target: Option<String>,

    /// Directory holding the working directories (default: from config)
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SplitArgs {
    /// Maximum budget per chunk (default: from config)
    #[arg(long, value_name = "N")]
    pub max_chars: Option<usize>,

    /// How a line's budget is counted (chars, bytes, tokens)
    #[arg(long, value_name = "MEASURE")]
    pub measure: Option<BudgetMeasure>,
}
