//! Persisted ledger of checksums already verified present in the cache.
//!
//! Reconstructed each run from two additive sources of truth: checksum-
//! suffixed cache filenames and the append-only `cache.dat` binary log.
//! Neither source is authoritative alone; they are merged into one set and
//! duplicate records are harmless.

mod record;
mod scan;
mod writer;

pub use record::{LedgerRecord, RECORD_SIZE};
pub use writer::{append_records, LedgerWriter};

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::checksum::Sha1Digest;

/// Filename of the append-only binary log inside the cache directory.
pub const LEDGER_FILE: &str = "cache.dat";

/// In-memory set of verified checksums for one reconciliation run.
#[derive(Debug, Default)]
pub struct Ledger {
    checksums: HashSet<Sha1Digest>,
}

impl Ledger {
    /// Loads the ledger for a cache directory, creating the directory if it
    /// does not exist yet.
    pub fn load(cache_dir: &Path) -> Result<Self> {
        fs::create_dir_all(cache_dir)
            .with_context(|| format!("create cache dir {}", cache_dir.display()))?;

        let mut checksums = HashSet::new();

        // Source one: cache filenames that embed their own checksum.
        let dir = fs::read_dir(cache_dir)
            .with_context(|| format!("scan cache dir {}", cache_dir.display()))?;
        for dir_entry in dir {
            let dir_entry = dir_entry?;
            let name = dir_entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some((_, digest)) = scan::parse_cache_file_name(name) {
                checksums.insert(digest);
            }
        }
        let from_names = checksums.len();

        // Source two: the binary log.
        let log_path = cache_dir.join(LEDGER_FILE);
        match fs::read(&log_path) {
            Ok(data) => {
                let remainder = data.len() % RECORD_SIZE;
                if remainder != 0 {
                    // A partially written trailing record from an interrupted
                    // run; full records before it are still valid.
                    tracing::warn!(
                        "{}: ignoring {} trailing byte(s) (truncated record)",
                        log_path.display(),
                        remainder
                    );
                }
                for chunk in data.chunks_exact(RECORD_SIZE) {
                    let bytes: &[u8; RECORD_SIZE] = chunk.try_into().expect("exact chunk");
                    checksums.insert(LedgerRecord::decode(bytes).checksum);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("read {}", log_path.display()));
            }
        }

        tracing::debug!(
            "ledger loaded: {} checksum(s) ({} from filenames)",
            checksums.len(),
            from_names
        );
        Ok(Self { checksums })
    }

    pub fn contains(&self, checksum: &Sha1Digest) -> bool {
        self.checksums.contains(checksum)
    }

    pub fn len(&self) -> usize {
        self.checksums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checksums.is_empty()
    }
}
