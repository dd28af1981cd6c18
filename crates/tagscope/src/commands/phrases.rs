//! Phrases command: rank the phrases shared across a dataset's captions.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use tagscope_core::{Config, PhraseRecord};

use super::PhraseArgs;

/// Arguments for the `phrases` subcommand.
#[derive(Args, Debug)]
pub struct PhrasesArgs {
    /// Dataset directory to scan.
    pub dir: Utf8PathBuf,

    /// Phrase extraction overrides.
    #[command(flatten)]
    pub phrase: PhraseArgs,
}

/// Scan a dataset and print its common phrases.
#[instrument(name = "cmd_phrases", skip_all, fields(dir = %args.dir))]
pub fn cmd_phrases(args: PhrasesArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    debug!(dir = %args.dir, phrase = ?args.phrase, "executing phrases command");

    let options = args.phrase.resolve(config.phrase_options());
    let dataset = super::load_dataset(&args.dir, &config.scan_options())?;
    let phrases = dataset
        .common_phrases(&options)
        .with_context(|| format!("failed to extract phrases from {}", args.dir))?;

    if global_json {
        println!("{}", serde_json::to_string_pretty(&phrases)?);
        return Ok(());
    }

    let summary = dataset.summary();
    println!(
        "{} {} items, {} captioned",
        args.dir.bold(),
        summary.total_items,
        summary.captioned,
    );
    if phrases.is_empty() {
        println!("  {}", "no phrase appears in more than one caption".dimmed());
        return Ok(());
    }
    print_phrases(&phrases);

    Ok(())
}

/// Print phrases as a right-aligned count column followed by the phrase.
pub fn print_phrases(phrases: &[PhraseRecord]) {
    let width = phrases
        .iter()
        .map(|p| p.document_frequency.to_string().len())
        .max()
        .unwrap_or(1);
    for phrase in phrases {
        println!(
            "  {:>width$}  {}",
            phrase.document_frequency.cyan(),
            phrase.text,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn dataset_dir() -> (TempDir, Utf8PathBuf) {
        let tmp = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        for (name, caption) in [("a", "cat, dog"), ("b", "cat, bird")] {
            fs::write(root.join(format!("{name}.png")), b"").unwrap();
            fs::write(root.join(format!("{name}.txt")), caption).unwrap();
        }
        (tmp, root)
    }

    #[test]
    fn text_output_succeeds() {
        let (_tmp, root) = dataset_dir();
        let args = PhrasesArgs {
            dir: root,
            phrase: PhraseArgs::default(),
        };
        assert!(cmd_phrases(args, false, &Config::default()).is_ok());
    }

    #[test]
    fn invalid_bounds_fail() {
        let (_tmp, root) = dataset_dir();
        let args = PhrasesArgs {
            dir: root,
            phrase: PhraseArgs {
                min_len: Some(9),
                max_len: Some(3),
                ..PhraseArgs::default()
            },
        };
        assert!(cmd_phrases(args, true, &Config::default()).is_err());
    }
}
