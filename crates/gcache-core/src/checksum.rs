//! SHA-1 digests and file hashing with progress reporting.
//!
//! The manifest identifies every required file by a 20-byte SHA-1 digest.
//! Hashing the installed file is the only expensive verification step at
//! runtime, so the file pass reports progress and can be cancelled.

use anyhow::{Context, Result};
use sha1::{Digest, Sha1};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// 20-byte SHA-1 digest used for manifest checksums, ledger records and
/// cache-file naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sha1Digest([u8; 20]);

impl Sha1Digest {
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Parses a 40-character hex string (case-insensitive).
    pub fn from_hex(s: &str) -> Result<Self> {
        let raw = hex::decode(s).with_context(|| format!("invalid checksum hex: {s:?}"))?;
        let bytes: [u8; 20] = raw
            .as_slice()
            .try_into()
            .map_err(|_| anyhow::anyhow!("checksum must be 20 bytes, got {}", raw.len()))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Sha1Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Progress hook for the hashing pass. Return `false` to cancel; a cancelled
/// pass is reported as "does not match" so the entry is treated as outdated.
pub trait HashProgress {
    fn report(&self, hashed: u64, total: u64) -> bool;
}

/// Progress sink that never cancels.
pub struct NoProgress;

impl HashProgress for NoProgress {
    fn report(&self, _hashed: u64, _total: u64) -> bool {
        true
    }
}

/// Compute SHA-1 of a file and return the digest.
/// Reads in chunks to keep memory use bounded; suitable for large files.
pub fn sha1_path(path: &Path) -> Result<Sha1Digest> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha1::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(Sha1Digest(hasher.finalize().into()))
}

/// Checks whether the file at `path` hashes to `expected`.
///
/// A missing file counts as a mismatch (the caller treats the entry as
/// outdated), as does a cancelled progress hook. Other I/O errors propagate.
pub fn file_matches(
    path: &Path,
    expected: &Sha1Digest,
    progress: &dyn HashProgress,
) -> Result<bool> {
    let mut f = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e).with_context(|| format!("open {}", path.display())),
    };
    let total = f
        .metadata()
        .with_context(|| format!("stat {}", path.display()))?
        .len();

    let mut hasher = Sha1::new();
    let mut buf = [0u8; BUF_SIZE];
    let mut hashed = 0u64;
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        hashed += n as u64;
        if !progress.report(hashed, total) {
            tracing::debug!("hashing of {} cancelled", path.display());
            return Ok(false);
        }
    }
    let digest = Sha1Digest(hasher.finalize().into());
    Ok(digest == *expected)
}
