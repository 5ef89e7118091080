//! `gcache status` – show unsatisfied entries without acting.

use anyhow::Result;
use std::path::PathBuf;

use gcache_core::config::{self, GcacheConfig};
use gcache_core::differ;
use gcache_core::layout::CacheLayout;
use gcache_core::ledger::Ledger;
use gcache_core::manifest::Manifest;

pub fn run_status(
    cfg: &GcacheConfig,
    manifest: Option<PathBuf>,
    game_dir: Option<PathBuf>,
) -> Result<()> {
    let manifest_path = match manifest {
        Some(path) => path,
        None => config::manifest_path(cfg)?,
    };
    let manifest = Manifest::load(&manifest_path)?;
    let game_dir = game_dir.unwrap_or_else(|| cfg.game_dir.clone());
    let layout = CacheLayout::new(config::cache_dir(cfg)?, &manifest);

    let ledger = Ledger::load(layout.cache_dir())?;
    let pending = differ::unsatisfied_entries(&manifest, &ledger, &layout, &game_dir);

    if pending.is_empty() {
        println!("Cache is in sync ({} entries).", manifest.entries.len());
        return Ok(());
    }

    println!(
        "{} of {} entries need action:",
        pending.len(),
        manifest.entries.len()
    );
    println!("{:<12} {:<10} {}", "SIZE", "SOURCE", "PATH");
    for entry in pending {
        let source = match entry.source.url() {
            Some(_) if entry.archive_member.is_some() => "archive",
            Some(_) => "download",
            None => "local",
        };
        println!("{:<12} {:<10} {}", entry.local_size, source, entry.path);
    }
    Ok(())
}
