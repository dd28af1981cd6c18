//! Tag command: bulk caption edits followed by a phrase refresh.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Args, Subcommand};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use tagscope_core::dataset::{Position, TagMatcher};
use tagscope_core::{Config, Dataset, PhraseRecord};

use super::PhraseArgs;

/// Caption edit operations.
#[derive(Subcommand, Debug)]
pub enum TagCommand {
    /// Add a tag to captions
    Add(AddArgs),
    /// Remove matching tags from captions
    Remove(RemoveArgs),
    /// Replace matching tags in captions
    Replace(ReplaceArgs),
    /// Overwrite one item's caption
    Set(SetArgs),
}

/// Which items an edit applies to, and whether it is written.
#[derive(Args, Debug, Clone)]
pub struct Target {
    /// Dataset directory to scan.
    pub dir: Utf8PathBuf,

    /// Only edit these item ids (repeatable). Omit to edit every item.
    #[arg(long = "only", value_name = "ID")]
    pub only: Vec<String>,

    /// Show the result without writing caption files.
    #[arg(long)]
    pub dry_run: bool,

    /// Phrase extraction overrides for the refreshed statistics.
    #[command(flatten)]
    pub phrase: PhraseArgs,
}

/// Arguments for `tag add`.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Items to edit.
    #[command(flatten)]
    pub target: Target,

    /// Tag to add.
    pub tag: String,

    /// Where to place the tag.
    #[arg(long, value_enum, default_value_t)]
    pub position: Position,
}

/// Arguments for `tag remove`.
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Items to edit.
    #[command(flatten)]
    pub target: Target,

    /// Tag to remove (exact match unless --regex).
    pub tag: String,

    /// Treat the tag as a regular expression.
    #[arg(long)]
    pub regex: bool,
}

/// Arguments for `tag replace`.
#[derive(Args, Debug)]
pub struct ReplaceArgs {
    /// Items to edit.
    #[command(flatten)]
    pub target: Target,

    /// Tag to replace (exact match unless --regex).
    pub old: String,

    /// Replacement text (`$1` groups expand with --regex).
    pub new: String,

    /// Treat the old tag as a regular expression.
    #[arg(long)]
    pub regex: bool,
}

/// Arguments for `tag set`.
#[derive(Args, Debug)]
pub struct SetArgs {
    /// Dataset directory to scan.
    pub dir: Utf8PathBuf,

    /// Item id (path relative to the dataset, without extension).
    pub id: String,

    /// New caption text.
    pub caption: String,

    /// Show the result without writing the caption file.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Serialize)]
struct EditReport {
    edited: usize,
    saved: usize,
    dry_run: bool,
    phrases: Vec<PhraseRecord>,
}

/// Apply a caption edit, save it, and report the refreshed phrases.
#[instrument(name = "cmd_tag", skip_all)]
pub fn cmd_tag(command: TagCommand, global_json: bool, config: &Config) -> anyhow::Result<()> {
    debug!(command = ?command, "executing tag command");

    let scan_options = config.scan_options();
    let (mut dataset, target, edited) = match command {
        TagCommand::Add(args) => {
            let mut dataset = super::load_dataset(&args.target.dir, &scan_options)?;
            let ids = selected_ids(&dataset, &args.target);
            let edited = dataset.add_tag(&ids, &args.tag, args.position)?;
            (dataset, args.target, edited)
        }
        TagCommand::Remove(args) => {
            let matcher = TagMatcher::new(&args.tag, args.regex)
                .with_context(|| format!("invalid tag pattern: {}", args.tag))?;
            let mut dataset = super::load_dataset(&args.target.dir, &scan_options)?;
            let ids = selected_ids(&dataset, &args.target);
            let edited = dataset.remove_tag(&ids, &matcher)?;
            (dataset, args.target, edited)
        }
        TagCommand::Replace(args) => {
            let matcher = TagMatcher::new(&args.old, args.regex)
                .with_context(|| format!("invalid tag pattern: {}", args.old))?;
            let mut dataset = super::load_dataset(&args.target.dir, &scan_options)?;
            let ids = selected_ids(&dataset, &args.target);
            let edited = dataset.replace_tag(&ids, &matcher, &args.new)?;
            (dataset, args.target, edited)
        }
        TagCommand::Set(args) => {
            let mut dataset = super::load_dataset(&args.dir, &scan_options)?;
            dataset.set_caption(&args.id, &args.caption)?;
            let target = Target {
                dir: args.dir,
                only: vec![args.id],
                dry_run: args.dry_run,
                phrase: PhraseArgs::default(),
            };
            (dataset, target, 1)
        }
    };

    let changed: Vec<(String, String)> = dataset
        .items()
        .iter()
        .filter(|item| item.modified)
        .map(|item| (item.id.clone(), item.raw_tags.clone()))
        .collect();

    let saved = if target.dry_run {
        0
    } else {
        dataset
            .save_modified()
            .with_context(|| format!("failed to save captions in {}", target.dir))?
    };

    // Statistics come from the edited in-memory captions; no rescan.
    let options = target.phrase.resolve(config.phrase_options());
    let phrases = dataset
        .common_phrases(&options)
        .context("failed to refresh phrase statistics")?;

    if global_json {
        let report = EditReport {
            edited,
            saved,
            dry_run: target.dry_run,
            phrases,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for (id, caption) in &changed {
        println!("  {}  {}", id.cyan(), caption);
    }
    if target.dry_run {
        println!(
            "{} {} captions would change (dry run, nothing written)",
            "DRY RUN:".yellow(),
            edited
        );
    } else {
        println!("{} {} captions edited, {} saved", "OK:".green(), edited, saved);
    }
    println!("{} common phrases after refresh", phrases.len().bold());
    super::phrases::print_phrases(&phrases);

    Ok(())
}

fn selected_ids(dataset: &Dataset, target: &Target) -> Vec<String> {
    if target.only.is_empty() {
        dataset.ids()
    } else {
        target.only.clone()
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
        for (name, caption) in [("a", "cat, dog"), ("b", "cat")] {
            fs::write(root.join(format!("{name}.png")), b"").unwrap();
            fs::write(root.join(format!("{name}.txt")), caption).unwrap();
        }
        (tmp, root)
    }

    fn target(root: &Utf8PathBuf, dry_run: bool) -> Target {
        Target {
            dir: root.clone(),
            only: Vec::new(),
            dry_run,
            phrase: PhraseArgs::default(),
        }
    }

    #[test]
    fn add_writes_captions() {
        let (_tmp, root) = dataset_dir();
        let command = TagCommand::Add(AddArgs {
            target: target(&root, false),
            tag: "solo".to_string(),
            position: Position::Prepend,
        });
        cmd_tag(command, true, &Config::default()).unwrap();
        assert_eq!(fs::read_to_string(root.join("a.txt")).unwrap(), "solo, cat, dog");
        assert_eq!(fs::read_to_string(root.join("b.txt")).unwrap(), "solo, cat");
    }

    #[test]
    fn dry_run_leaves_files_untouched() {
        let (_tmp, root) = dataset_dir();
        let command = TagCommand::Remove(RemoveArgs {
            target: target(&root, true),
            tag: "cat".to_string(),
            regex: false,
        });
        cmd_tag(command, false, &Config::default()).unwrap();
        assert_eq!(fs::read_to_string(root.join("a.txt")).unwrap(), "cat, dog");
    }

    #[test]
    fn unknown_id_fails() {
        let (_tmp, root) = dataset_dir();
        let mut t = target(&root, false);
        t.only = vec!["missing".to_string()];
        let command = TagCommand::Replace(ReplaceArgs {
            target: t,
            old: "cat".to_string(),
            new: "kitten".to_string(),
            regex: false,
        });
        assert!(cmd_tag(command, true, &Config::default()).is_err());
    }

    #[test]
    fn set_overwrites_one_caption() {
        let (_tmp, root) = dataset_dir();
        let command = TagCommand::Set(SetArgs {
            dir: root.clone(),
            id: "b".to_string(),
            caption: "bird".to_string(),
            dry_run: false,
        });
        cmd_tag(command, true, &Config::default()).unwrap();
        assert_eq!(fs::read_to_string(root.join("b.txt")).unwrap(), "bird");
        assert_eq!(fs::read_to_string(root.join("a.txt")).unwrap(), "cat, dog");
    }
}
