//! Append-only ledger log writer.
//!
//! Never rewrites or deduplicates existing records; a record matching an
//! already-present checksum is merely redundant. A crash after some records
//! are written leaves those entries satisfied on the next run while unwritten
//! ones are retried from scratch.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::checksum::Sha1Digest;

use super::record::LedgerRecord;

/// Writer over the append-only binary log.
pub struct LedgerWriter {
    file: File,
}

impl LedgerWriter {
    /// Opens the log in append mode, creating it if missing.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open ledger {}", path.display()))?;
        Ok(Self { file })
    }

    /// Appends one record stamped with the current time.
    pub fn append(&mut self, checksum: &Sha1Digest) -> Result<()> {
        let record = LedgerRecord::now(*checksum);
        self.file
            .write_all(&record.encode())
            .context("append ledger record")?;
        Ok(())
    }

    /// Flush written records to disk.
    pub fn sync(&self) -> Result<()> {
        self.file.sync_all().context("sync ledger")?;
        Ok(())
    }
}

/// Appends one record per checksum and syncs; opens and closes the log for
/// the duration of the call. A no-op for an empty slice.
pub fn append_records(path: &Path, checksums: &[Sha1Digest]) -> Result<()> {
    if checksums.is_empty() {
        return Ok(());
    }
    let mut writer = LedgerWriter::open(path)?;
    for checksum in checksums {
        writer.append(checksum)?;
    }
    writer.sync()?;
    tracing::debug!("recorded {} ledger entry(ies)", checksums.len());
    Ok(())
}
