//! Download coordination: choosing the cheapest valid source per entry.
//!
//! For every unsatisfied entry the coordinator hashes the installed file
//! (the only hashing pass at runtime), then either records it straight into
//! the ledger, queues a same-machine copy, or queues a remote fetch
//! deduplicated by source. Archive members additionally land on the
//! extraction worklist whether or not their download was newly queued.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use url::Url;

use crate::checksum::{self, HashProgress};
use crate::layout::CacheLayout;
use crate::ledger;
use crate::manifest::{ManifestEntry, RemoteSource};
use crate::transport::{TransferRequest, Transport};

/// Totals reported to the confirmation step before any transfer runs.
#[derive(Debug, Clone, Default)]
pub struct TransferSummary {
    pub local_bytes: u64,
    pub remote_bytes: u64,
    /// Set when an entry requires a fetch it cannot perform (local-only
    /// source or unknown remote size). A blocked plan always aborts.
    pub blocked: bool,
    /// One human-readable line per planned transfer or blocked entry.
    pub lines: Vec<String>,
}

/// Pre-transfer confirmation hook.
pub trait ConfirmTransfer {
    fn confirm_transfer(&self, summary: &TransferSummary) -> bool;
}

/// Result of classifying all unsatisfied entries.
#[derive(Debug, Default)]
pub struct DownloadPlan {
    pub summary: TransferSummary,
    /// Entries whose transfer was queued (local copy or direct download);
    /// recorded into the ledger once the queued transfers succeed.
    pub queued_entries: Vec<ManifestEntry>,
    /// Archive members awaiting extraction after their download completes.
    pub archive_worklist: Vec<ManifestEntry>,
}

impl DownloadPlan {
    /// True when classification produced nothing to confirm or transfer.
    pub fn is_empty(&self) -> bool {
        self.summary.lines.is_empty() && !self.summary.blocked
    }
}

/// Classifies `pending` entries, queues transfers on `transport`
/// (deduplicated by remote source) and records local-only entries that
/// hashed clean directly into the ledger.
pub fn build_plan(
    pending: &[ManifestEntry],
    layout: &CacheLayout,
    game_dir: &Path,
    transport: &mut dyn Transport,
    progress: &dyn HashProgress,
) -> Result<DownloadPlan> {
    let mut referenced: HashSet<&str> = HashSet::new();
    let mut plan = DownloadPlan::default();

    for entry in pending {
        let install = entry.install_path(game_dir);
        let up_to_date = checksum::file_matches(&install, &entry.checksum, progress)?;

        if up_to_date {
            match &entry.source {
                RemoteSource::LocalOnly => {
                    // The ledger substitutes for a cache copy of an already
                    // valid installed file.
                    ledger::append_records(&layout.ledger_path(), &[entry.checksum])?;
                    tracing::debug!("{} verified in place", entry.path);
                }
                RemoteSource::Fetchable(_) => {
                    queue_local_copy(&mut plan, entry, &install, layout, transport)?;
                }
            }
            continue;
        }

        // Outdated or missing: needs a remote fetch.
        match &entry.source {
            RemoteSource::LocalOnly => {
                plan.summary.blocked = true;
                plan.summary
                    .lines
                    .push(format!("{} (missing, no download source)", entry.path));
            }
            RemoteSource::Fetchable(url) => {
                if !referenced.contains(url.as_str()) {
                    queue_remote_fetch(&mut plan, entry, url, layout, transport)?;
                    referenced.insert(url.as_str());
                }
                if entry.archive_member.is_some() {
                    plan.archive_worklist.push(entry.clone());
                }
            }
        }
    }

    Ok(plan)
}

fn queue_local_copy(
    plan: &mut DownloadPlan,
    entry: &ManifestEntry,
    install: &Path,
    layout: &CacheLayout,
    transport: &mut dyn Transport,
) -> Result<()> {
    let install = std::fs::canonicalize(install)
        .with_context(|| format!("canonicalize {}", install.display()))?;
    let source = Url::from_file_path(&install)
        .map_err(|_| anyhow::anyhow!("unrepresentable path {}", install.display()))?
        .to_string();
    transport.enqueue(TransferRequest {
        source,
        destination: layout.entry_cache_path(entry),
        expected_size: Some(entry.local_size),
    })?;
    plan.summary.local_bytes += entry.local_size;
    plan.summary
        .lines
        .push(format!("{} (local, {:.2} MB)", entry.path, mb(entry.local_size)));
    plan.queued_entries.push(entry.clone());
    Ok(())
}

fn queue_remote_fetch(
    plan: &mut DownloadPlan,
    entry: &ManifestEntry,
    url: &str,
    layout: &CacheLayout,
    transport: &mut dyn Transport,
) -> Result<()> {
    let Some(size) = entry.remote_size else {
        // Nothing sane to fetch; the plan hard-blocks before any transfer
        // would run, so the queue is left alone.
        plan.summary.blocked = true;
        plan.summary
            .lines
            .push(format!("{} (download, unknown size)", url));
        return Ok(());
    };

    let destination = if entry.archive_member.is_some() {
        layout.archive_download_path(url)
    } else {
        layout.entry_cache_path(entry)
    };
    transport.enqueue(TransferRequest {
        source: url.to_string(),
        destination,
        expected_size: Some(size),
    })?;
    plan.summary.remote_bytes += size;
    plan.summary
        .lines
        .push(format!("{} (download, {:.2} MB)", url, mb(size)));
    if entry.archive_member.is_none() {
        plan.queued_entries.push(entry.clone());
    }
    Ok(())
}

fn mb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::{NoProgress, Sha1Digest};
    use crate::ledger::Ledger;
    use crate::manifest::Manifest;
    use std::fs;

    /// Transport that records requests and never moves bytes.
    #[derive(Default)]
    struct RecordingTransport {
        requests: Vec<TransferRequest>,
        runs: usize,
    }

    impl Transport for RecordingTransport {
        fn enqueue(&mut self, request: TransferRequest) -> Result<()> {
            self.requests.push(request);
            Ok(())
        }

        fn run_queued(&mut self) -> Result<()> {
            self.runs += 1;
            Ok(())
        }
    }

    fn digest(hex: &str) -> Sha1Digest {
        Sha1Digest::from_hex(hex).unwrap()
    }

    fn direct(path: &str, checksum: &str, url: &str, size: u64) -> ManifestEntry {
        ManifestEntry {
            path: path.to_string(),
            checksum: digest(checksum),
            source: RemoteSource::Fetchable(url.to_string()),
            archive_member: None,
            local_size: size,
            remote_size: Some(size),
        }
    }

    fn archived(path: &str, checksum: &str, url: &str, member: &str) -> ManifestEntry {
        ManifestEntry {
            path: path.to_string(),
            checksum: digest(checksum),
            source: RemoteSource::Fetchable(url.to_string()),
            archive_member: Some(member.to_string()),
            local_size: 10,
            remote_size: Some(1000),
        }
    }

    fn layout_for(cache: &Path) -> CacheLayout {
        let manifest = Manifest {
            reserved_prefix: String::new(),
            reserved_alias: String::new(),
            entries: Vec::new(),
        };
        CacheLayout::new(cache, &manifest)
    }

    #[test]
    fn shared_remote_source_is_enqueued_once() {
        let cache = tempfile::tempdir().unwrap();
        let game = tempfile::tempdir().unwrap();
        let layout = layout_for(cache.path());
        let url = "https://patches.example.net/pak.exe";
        let pending = vec![
            archived("a.rpf", "1111111111111111111111111111111111111111", url, "$/a.rpf"),
            archived("b.rpf", "2222222222222222222222222222222222222222", url, "$/b.rpf"),
            archived("c.rpf", "3333333333333333333333333333333333333333", url, "$/c.rpf"),
        ];

        let mut transport = RecordingTransport::default();
        let plan =
            build_plan(&pending, &layout, game.path(), &mut transport, &NoProgress).unwrap();

        assert_eq!(transport.requests.len(), 1);
        assert_eq!(transport.requests[0].source, url);
        assert_eq!(
            transport.requests[0].destination,
            layout.archive_download_path(url)
        );
        // Every member still lands on the worklist.
        assert_eq!(plan.archive_worklist.len(), 3);
        assert_eq!(plan.summary.remote_bytes, 1000);
        assert!(!plan.summary.blocked);
    }

    #[test]
    fn matching_installed_file_becomes_local_copy() {
        let cache = tempfile::tempdir().unwrap();
        let game = tempfile::tempdir().unwrap();
        let layout = layout_for(cache.path());
        fs::write(game.path().join("a.bin"), b"hello\n").unwrap();
        let pending = vec![direct(
            "a.bin",
            "f572d396fae9206628714fb2ce00f72e94f2258f",
            "https://x/a.bin",
            6,
        )];

        let mut transport = RecordingTransport::default();
        let plan =
            build_plan(&pending, &layout, game.path(), &mut transport, &NoProgress).unwrap();

        assert_eq!(transport.requests.len(), 1);
        assert!(transport.requests[0].source.starts_with("file://"));
        assert_eq!(plan.summary.local_bytes, 6);
        assert_eq!(plan.summary.remote_bytes, 0);
        assert_eq!(plan.queued_entries.len(), 1);
        assert!(plan.archive_worklist.is_empty());
    }

    #[test]
    fn matching_local_only_entry_is_recorded_not_queued() {
        let cache = tempfile::tempdir().unwrap();
        let game = tempfile::tempdir().unwrap();
        let layout = layout_for(cache.path());
        fs::write(game.path().join("dlc.rpf"), b"hello\n").unwrap();
        let pending = vec![ManifestEntry {
            path: "dlc.rpf".to_string(),
            checksum: digest("f572d396fae9206628714fb2ce00f72e94f2258f"),
            source: RemoteSource::LocalOnly,
            archive_member: None,
            local_size: 6,
            remote_size: None,
        }];

        let mut transport = RecordingTransport::default();
        let plan =
            build_plan(&pending, &layout, game.path(), &mut transport, &NoProgress).unwrap();

        assert!(transport.requests.is_empty());
        assert!(plan.is_empty());
        let ledger = Ledger::load(cache.path()).unwrap();
        assert!(ledger.contains(&pending[0].checksum));
    }

    #[test]
    fn outdated_local_only_entry_blocks_the_plan() {
        let cache = tempfile::tempdir().unwrap();
        let game = tempfile::tempdir().unwrap();
        let layout = layout_for(cache.path());
        let pending = vec![ManifestEntry {
            path: "dlc.rpf".to_string(),
            checksum: digest("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"),
            source: RemoteSource::LocalOnly,
            archive_member: None,
            local_size: 6,
            remote_size: None,
        }];

        let mut transport = RecordingTransport::default();
        let plan =
            build_plan(&pending, &layout, game.path(), &mut transport, &NoProgress).unwrap();

        assert!(plan.summary.blocked);
        assert!(transport.requests.is_empty());
    }

    #[test]
    fn unknown_remote_size_blocks_the_plan() {
        let cache = tempfile::tempdir().unwrap();
        let game = tempfile::tempdir().unwrap();
        let layout = layout_for(cache.path());
        let mut entry = archived(
            "a.rpf",
            "1111111111111111111111111111111111111111",
            "https://x/pak.exe",
            "$/a.rpf",
        );
        entry.remote_size = None;

        let mut transport = RecordingTransport::default();
        let plan = build_plan(
            &[entry],
            &layout,
            game.path(),
            &mut transport,
            &NoProgress,
        )
        .unwrap();

        assert!(plan.summary.blocked);
        assert!(transport.requests.is_empty());
    }

    #[test]
    fn duplicate_direct_source_is_a_no_op_after_the_first() {
        let cache = tempfile::tempdir().unwrap();
        let game = tempfile::tempdir().unwrap();
        let layout = layout_for(cache.path());
        let url = "https://x/shared.bin";
        let pending = vec![
            direct("one.bin", "1111111111111111111111111111111111111111", url, 5),
            direct("two.bin", "2222222222222222222222222222222222222222", url, 5),
        ];

        let mut transport = RecordingTransport::default();
        let plan =
            build_plan(&pending, &layout, game.path(), &mut transport, &NoProgress).unwrap();

        assert_eq!(transport.requests.len(), 1);
        assert_eq!(plan.queued_entries.len(), 1);
        assert_eq!(plan.summary.remote_bytes, 5);
    }
}
