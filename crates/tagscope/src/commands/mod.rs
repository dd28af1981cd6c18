//! Command implementations.

use std::time::Duration;

use anyhow::Context;
use camino::Utf8Path;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tagscope_core::{Dataset, PhraseOptions, ScanOptions};

pub mod filter;
pub mod info;
pub mod phrases;
pub mod scan;
#[cfg(feature = "mcp")]
pub mod serve;
pub mod tag;

/// Phrase extraction overrides shared by commands that report phrases.
#[derive(Args, Debug, Clone, Default)]
pub struct PhraseArgs {
    /// Shortest phrase, in characters.
    #[arg(long)]
    pub min_len: Option<usize>,

    /// Longest phrase, in characters.
    #[arg(long)]
    pub max_len: Option<usize>,

    /// Captions a phrase must appear in.
    #[arg(long)]
    pub min_docs: Option<usize>,

    /// Maximum phrases reported.
    #[arg(long)]
    pub limit: Option<usize>,
}

impl PhraseArgs {
    /// Layer command-line overrides over configured options.
    pub fn resolve(&self, config: PhraseOptions) -> PhraseOptions {
        PhraseOptions {
            min_len: self.min_len.unwrap_or(config.min_len),
            max_len: self.max_len.unwrap_or(config.max_len),
            min_documents: self.min_docs.unwrap_or(config.min_documents),
            limit: self.limit.unwrap_or(config.limit),
        }
    }
}

/// Scan a dataset directory behind a spinner.
///
/// The spinner draws to stderr and stays hidden when stderr is not a terminal.
pub fn load_dataset(dir: &Utf8Path, options: &ScanOptions) -> anyhow::Result<Dataset> {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("scanning {dir}"));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = Dataset::scan(dir, options).with_context(|| format!("failed to scan {dir}"));
    spinner.finish_and_clear();
    result
}
