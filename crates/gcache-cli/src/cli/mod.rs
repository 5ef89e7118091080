//! CLI for the gcache cache synchronizer.

mod commands;
mod confirm;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_checksum, run_status, run_sync};

/// Top-level CLI for the gcache game-asset cache synchronizer.
#[derive(Debug, Parser)]
#[command(name = "gcache")]
#[command(about = "gcache: manifest-driven game-asset cache synchronizer", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Reconcile the cache against the manifest, fetching what is missing.
    Sync {
        /// Manifest file (defaults to the configured path).
        #[arg(long, value_name = "FILE")]
        manifest: Option<PathBuf>,

        /// Game installation directory (defaults to the configured path).
        #[arg(long, value_name = "DIR")]
        game_dir: Option<PathBuf>,

        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },

    /// Show which manifest entries are unsatisfied, without transferring.
    Status {
        /// Manifest file (defaults to the configured path).
        #[arg(long, value_name = "FILE")]
        manifest: Option<PathBuf>,

        /// Game installation directory (defaults to the configured path).
        #[arg(long, value_name = "DIR")]
        game_dir: Option<PathBuf>,
    },

    /// Compute the SHA-1 checksum of a file.
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = gcache_core::config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Sync { manifest, game_dir, yes } => {
                run_sync(&cfg, manifest, game_dir, yes)?
            }
            CliCommand::Status { manifest, game_dir } => run_status(&cfg, manifest, game_dir)?,
            CliCommand::Checksum { path } => run_checksum(&path)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
