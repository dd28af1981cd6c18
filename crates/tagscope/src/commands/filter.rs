//! Filter command: list items whose caption contains a phrase.

use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use tagscope_core::Config;

/// Arguments for the `filter` subcommand.
#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Dataset directory to scan.
    pub dir: Utf8PathBuf,

    /// Phrase to look for (substring match against the raw caption).
    pub phrase: String,
}

/// Print the items whose caption contains the phrase.
#[instrument(name = "cmd_filter", skip_all, fields(dir = %args.dir))]
pub fn cmd_filter(args: FilterArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    debug!(dir = %args.dir, phrase = %args.phrase, "executing filter command");

    let dataset = super::load_dataset(&args.dir, &config.scan_options())?;
    let matches = dataset.filter_by_tag(&args.phrase);

    if global_json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    println!(
        "{} of {} items contain {}",
        matches.len().bold(),
        dataset.len(),
        format!("\"{}\"", args.phrase).cyan(),
    );
    for item in matches {
        println!("  {}  {}", item.id.cyan(), item.raw_tags.trim());
    }

    Ok(())
}
