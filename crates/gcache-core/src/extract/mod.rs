//! Archive batching and extraction driving.
//!
//! Worklist entries are sorted by remote source so all members of one
//! archive are contiguous, then each archive is opened and walked exactly
//! once per run regardless of how many members it contributes.

mod archive;
mod walk;

pub use archive::{ArchiveOpener, InstallerArchive, Instruction, InstructionVisitor, Opcode, Section};

use anyhow::{Context, Result};

use crate::layout::CacheLayout;
use crate::manifest::ManifestEntry;

/// Processes the archive-extraction worklist batch by batch.
///
/// `on_batch_done` runs after each successfully extracted batch (the caller
/// records its ledger entries there); when a later batch fails, batches
/// already processed keep their side effects.
pub fn process_worklist(
    mut worklist: Vec<ManifestEntry>,
    layout: &CacheLayout,
    opener: &dyn ArchiveOpener,
    mut on_batch_done: impl FnMut(&[ManifestEntry]) -> Result<()>,
) -> Result<()> {
    worklist.sort_by(|a, b| source_key(a).cmp(source_key(b)));

    for batch in worklist.chunk_by(|a, b| source_key(a) == source_key(b)) {
        let url = source_key(&batch[0]);
        let archive_file = layout.archive_download_path(url);
        tracing::info!(
            "extracting {} member(s) from {}",
            batch.len(),
            archive_file.display()
        );

        let archive = opener
            .open(&archive_file)
            .with_context(|| format!("open archive {}", archive_file.display()))?;
        walk::extract_batch(archive.as_ref(), batch, layout)
            .with_context(|| format!("extract from {}", archive_file.display()))?;
        on_batch_done(batch)?;
    }
    Ok(())
}

/// Worklist entries always come from the fetchable branch of classification;
/// an empty key would only appear through a caller bug and simply forms its
/// own batch.
fn source_key(entry: &ManifestEntry) -> &str {
    entry.source.url().unwrap_or("")
}
