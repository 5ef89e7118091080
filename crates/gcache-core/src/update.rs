//! Update orchestration: diff → confirm → transfers → extraction → ledger.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::checksum::{HashProgress, Sha1Digest};
use crate::differ;
use crate::extract::{self, ArchiveOpener};
use crate::layout::CacheLayout;
use crate::ledger::{self, Ledger};
use crate::manifest::Manifest;
use crate::plan::{self, ConfirmTransfer};
use crate::transport::Transport;

/// Fatal update failures, classified by phase.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    /// A queued download or copy failed; no extraction was attempted.
    #[error("cache transfer failed: {0:#}")]
    Transfer(anyhow::Error),
    /// An archive batch could not be extracted; batches already processed
    /// keep their ledger records.
    #[error("archive extraction failed: {0:#}")]
    Extraction(anyhow::Error),
    /// Failure outside the transfer/extraction phases (ledger I/O, hashing).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// How a reconciliation run ended. Declining or blocking is a deliberate
/// stop, not a failure.
#[derive(Debug)]
pub enum SyncOutcome {
    /// Cache is in sync; canonical asset name → resolved cache path.
    Completed(BTreeMap<String, PathBuf>),
    /// The confirmation step declined the transfers; nothing was changed.
    Declined,
    /// An entry required a fetch with no usable source; nothing was changed.
    Blocked,
}

/// Runs one full reconciliation of the cache directory against `manifest`.
///
/// At most one run may be active per cache directory; concurrent runs against
/// the same ledger are not supported.
pub fn sync_cache(
    manifest: &Manifest,
    layout: &CacheLayout,
    game_dir: &Path,
    transport: &mut dyn Transport,
    confirm: &dyn ConfirmTransfer,
    archives: &dyn ArchiveOpener,
    progress: &dyn HashProgress,
) -> Result<SyncOutcome, UpdateError> {
    let ledger = Ledger::load(layout.cache_dir())?;
    let pending = differ::unsatisfied_entries(manifest, &ledger, layout, game_dir);
    tracing::info!(
        "{} of {} manifest entries need action",
        pending.len(),
        manifest.entries.len()
    );
    if pending.is_empty() {
        return Ok(SyncOutcome::Completed(resolved_assets(manifest, layout)));
    }

    let plan = plan::build_plan(&pending, layout, game_dir, transport, progress)?;

    // Everything pending was satisfied in place by local-only recording.
    if plan.is_empty() {
        return Ok(SyncOutcome::Completed(resolved_assets(manifest, layout)));
    }

    let proceed = confirm.confirm_transfer(&plan.summary);
    if plan.summary.blocked {
        tracing::warn!("update blocked: required files have no usable download source");
        return Ok(SyncOutcome::Blocked);
    }
    if !proceed {
        tracing::info!("update declined before any transfer");
        return Ok(SyncOutcome::Declined);
    }

    transport.run_queued().map_err(UpdateError::Transfer)?;

    // Queued copies and direct downloads now sit at their checksum-addressed
    // cache paths; record them so later runs skip the hash pass.
    let queued: Vec<Sha1Digest> = plan.queued_entries.iter().map(|e| e.checksum).collect();
    ledger::append_records(&layout.ledger_path(), &queued)?;

    extract::process_worklist(plan.archive_worklist, layout, archives, |batch| {
        let checksums: Vec<Sha1Digest> = batch.iter().map(|e| e.checksum).collect();
        ledger::append_records(&layout.ledger_path(), &checksums)
    })
    .map_err(UpdateError::Extraction)?;

    Ok(SyncOutcome::Completed(resolved_assets(manifest, layout)))
}

/// Canonical asset name → cache path for every manifest entry whose cache
/// file exists on disk; reserved-namespace entries appear under their
/// friendly alias.
pub fn resolved_assets(manifest: &Manifest, layout: &CacheLayout) -> BTreeMap<String, PathBuf> {
    let mut assets = BTreeMap::new();
    for entry in &manifest.entries {
        let cache = layout.entry_cache_path(entry);
        if cache.exists() {
            assets.insert(layout.canonical_name(entry), cache);
        }
    }
    assets
}
