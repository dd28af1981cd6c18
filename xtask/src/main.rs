//! Build tasks: man pages and shell completions for `tagscope`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clap_complete::{Shell, generate_to};

const BIN_NAME: &str = "tagscope";

#[derive(Parser)]
#[command(name = "xtask", about = "Project automation tasks")]
struct Xtask {
    #[command(subcommand)]
    task: Task,
}

#[derive(Subcommand)]
enum Task {
    /// Generate man pages into DIR (default: target/man)
    Man {
        #[arg(long, default_value = "target/man")]
        out_dir: PathBuf,
    },
    /// Generate shell completions into DIR (default: target/completions)
    Completions {
        #[arg(long, default_value = "target/completions")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    match Xtask::parse().task {
        Task::Man { out_dir } => man(&out_dir),
        Task::Completions { out_dir } => completions(&out_dir),
    }
}

fn man(out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let cmd = tagscope::command();
    clap_mangen::generate_to(cmd, out_dir).context("failed to render man pages")?;

    eprintln!("Wrote man pages to {}", out_dir.display());
    Ok(())
}

fn completions(out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let mut cmd = tagscope::command();
    for shell in [
        Shell::Bash,
        Shell::Zsh,
        Shell::Fish,
        Shell::PowerShell,
        Shell::Elvish,
    ] {
        let path = generate_to(shell, &mut cmd, BIN_NAME, out_dir)
            .with_context(|| format!("failed to generate {shell} completions"))?;
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}
