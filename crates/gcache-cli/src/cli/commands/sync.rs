//! `gcache sync` – full reconciliation run.

use anyhow::Result;
use std::path::{Path, PathBuf};

use gcache_core::checksum::NoProgress;
use gcache_core::config::{self, GcacheConfig};
use gcache_core::extract::{ArchiveOpener, InstallerArchive};
use gcache_core::layout::CacheLayout;
use gcache_core::manifest::Manifest;
use gcache_core::transport::CurlTransport;
use gcache_core::update::{sync_cache, SyncOutcome};

use crate::cli::confirm::{AlwaysConfirm, PromptConfirm};

/// No installer parser is wired into the CLI; a manifest that needs archive
/// extraction gets a clear failure instead of a guessed container format.
struct NoInstallerBackend;

impl ArchiveOpener for NoInstallerBackend {
    fn open(&self, archive: &Path) -> Result<Box<dyn InstallerArchive>> {
        anyhow::bail!(
            "no installer extraction backend available for {}",
            archive.display()
        )
    }
}

pub fn run_sync(
    cfg: &GcacheConfig,
    manifest: Option<PathBuf>,
    game_dir: Option<PathBuf>,
    yes: bool,
) -> Result<()> {
    let manifest_path = match manifest {
        Some(path) => path,
        None => config::manifest_path(cfg)?,
    };
    let manifest = Manifest::load(&manifest_path)?;
    let game_dir = game_dir.unwrap_or_else(|| cfg.game_dir.clone());
    let layout = CacheLayout::new(config::cache_dir(cfg)?, &manifest);
    tracing::info!(
        "syncing {} entries against {}",
        manifest.entries.len(),
        game_dir.display()
    );

    let mut transport = CurlTransport::new();
    let outcome = if yes {
        sync_cache(
            &manifest,
            &layout,
            &game_dir,
            &mut transport,
            &AlwaysConfirm,
            &NoInstallerBackend,
            &NoProgress,
        )?
    } else {
        sync_cache(
            &manifest,
            &layout,
            &game_dir,
            &mut transport,
            &PromptConfirm,
            &NoInstallerBackend,
            &NoProgress,
        )?
    };

    match outcome {
        SyncOutcome::Completed(assets) => {
            println!("Cache in sync; {} asset(s) resolved.", assets.len());
            for (name, path) in assets {
                println!("  {name} -> {}", path.display());
            }
            Ok(())
        }
        SyncOutcome::Declined => {
            println!("Update declined; nothing was changed.");
            Ok(())
        }
        SyncOutcome::Blocked => anyhow::bail!(
            "required files are missing from the game installation and cannot be \
             downloaded; verify the installation with its own launcher and retry"
        ),
    }
}
