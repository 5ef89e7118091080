//! On-disk manifest format (raw serde structures and resolution).

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::checksum::Sha1Digest;

use super::{Manifest, ManifestEntry, RemoteSource};

/// Raw manifest file as written on disk.
#[derive(Debug, Deserialize)]
pub(super) struct ManifestFile {
    #[serde(default)]
    reserved_prefix: Option<String>,
    #[serde(default)]
    reserved_alias: Option<String>,
    #[serde(default, rename = "entry")]
    entries: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    path: String,
    checksum: String,
    /// Absent URL means local-only: never auto-fetched.
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    member: Option<String>,
    local_size: u64,
    #[serde(default)]
    remote_size: Option<u64>,
}

/// Turns the raw file into validated entries.
pub(super) fn resolve(raw: ManifestFile) -> Result<Manifest> {
    let mut entries = Vec::with_capacity(raw.entries.len());
    for entry in raw.entries {
        entries.push(resolve_entry(entry)?);
    }
    Ok(Manifest {
        reserved_prefix: raw.reserved_prefix.unwrap_or_default(),
        reserved_alias: raw.reserved_alias.unwrap_or_default(),
        entries,
    })
}

fn resolve_entry(raw: RawEntry) -> Result<ManifestEntry> {
    let checksum = Sha1Digest::from_hex(&raw.checksum)
        .with_context(|| format!("entry {}", raw.path))?;

    if raw.member.is_some() && raw.url.is_none() {
        anyhow::bail!("entry {}: archive member requires a url", raw.path);
    }

    // A direct download with no declared remote size transfers the file as-is,
    // so the local size doubles as the remote size. Archive downloads must
    // declare the archive size or stay unknown.
    let remote_size = raw
        .remote_size
        .or(if raw.member.is_none() { Some(raw.local_size) } else { None });

    let source = match raw.url {
        Some(url) => RemoteSource::Fetchable(url),
        None => RemoteSource::LocalOnly,
    };

    Ok(ManifestEntry {
        path: raw.path,
        checksum,
        source,
        archive_member: raw.member,
        local_size: raw.local_size,
        remote_size,
    })
}
