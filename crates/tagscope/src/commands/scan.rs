//! Scan command: summarize a dataset directory.

use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use tagscope_core::Config;
use tagscope_core::dataset::{DatasetItem, DatasetSummary};

/// Arguments for the `scan` subcommand.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Dataset directory to scan.
    pub dir: Utf8PathBuf,

    /// List every item with its tags.
    #[arg(long)]
    pub list: bool,
}

#[derive(Serialize)]
struct ScanOutput<'a> {
    #[serde(flatten)]
    summary: DatasetSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<&'a [DatasetItem]>,
}

/// Scan a dataset and print item counts.
#[instrument(name = "cmd_scan", skip_all, fields(dir = %args.dir))]
pub fn cmd_scan(args: ScanArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    debug!(dir = %args.dir, list = args.list, "executing scan command");

    let dataset = super::load_dataset(&args.dir, &config.scan_options())?;
    let summary = dataset.summary();

    if global_json {
        let output = ScanOutput {
            summary,
            items: args.list.then(|| dataset.items()),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", args.dir.bold());
    println!("  {}: {}", "Items".dimmed(), summary.total_items);
    println!("  {}: {}", "Images".dimmed(), summary.total_images);
    println!("  {}: {}", "Videos".dimmed(), summary.total_videos);
    println!("  {}: {}", "Captioned".dimmed(), summary.captioned);

    if args.list {
        println!();
        for item in dataset.items() {
            if item.tags.is_empty() {
                println!("  {} {}", item.id.cyan(), "(no tags)".yellow());
            } else {
                println!("  {} {}", item.id.cyan(), item.tags.join(", "));
            }
        }
    }

    Ok(())
}
