//! Reconciliation diff: which manifest entries need action.

use std::path::Path;

use crate::layout::CacheLayout;
use crate::ledger::Ledger;
use crate::manifest::{Manifest, ManifestEntry};

/// Returns the manifest entries not currently satisfied, in manifest order.
///
/// An entry whose checksum appears in the ledger is satisfied unless its
/// cache file is missing and it cannot fall back to the installed copy: a
/// local-only entry may substitute the ledger for re-hashing the installed
/// file as long as that file is present. An entry absent from the ledger is
/// unsatisfied regardless of disk state. Entries are reconciled
/// independently; no entry is skipped because an earlier one needs action.
pub fn unsatisfied_entries(
    manifest: &Manifest,
    ledger: &Ledger,
    layout: &CacheLayout,
    game_dir: &Path,
) -> Vec<ManifestEntry> {
    let mut pending = Vec::new();
    for entry in &manifest.entries {
        if !ledger.contains(&entry.checksum) {
            pending.push(entry.clone());
            continue;
        }
        if layout.entry_cache_path(entry).exists() {
            continue;
        }
        let installed = entry.install_path(game_dir).exists();
        if !installed || !entry.source.is_local_only() {
            pending.push(entry.clone());
        }
    }
    pending
}
