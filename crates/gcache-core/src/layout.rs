//! Content-addressed cache layout.
//!
//! A cache path is a pure function of (logical path, checksum): entries under
//! the reserved namespace keep their nested path, everything else flattens to
//! `<path with / replaced by +>_<40-hex-checksum>`. Because the checksum is
//! part of the name, presence of the derived path is equivalent to "already
//! verified", and a changed checksum yields a different path instead of a
//! corrupted file.

use std::path::{Path, PathBuf};

use crate::ledger::LEDGER_FILE;
use crate::manifest::{Manifest, ManifestEntry};

/// Fallback archive filename when a source URL has no usable path segment.
const DEFAULT_ARCHIVE_NAME: &str = "download.bin";

/// Derives every on-disk path inside one cache directory.
#[derive(Debug, Clone)]
pub struct CacheLayout {
    cache_dir: PathBuf,
    reserved_prefix: String,
    reserved_alias: String,
}

impl CacheLayout {
    pub fn new(cache_dir: impl Into<PathBuf>, manifest: &Manifest) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            reserved_prefix: manifest.reserved_prefix.clone(),
            reserved_alias: manifest.reserved_alias.clone(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of the append-only binary ledger log.
    pub fn ledger_path(&self) -> PathBuf {
        self.cache_dir.join(LEDGER_FILE)
    }

    /// Cache address of an entry.
    pub fn entry_cache_path(&self, entry: &ManifestEntry) -> PathBuf {
        if !self.reserved_prefix.is_empty() && entry.path.starts_with(&self.reserved_prefix) {
            return self.cache_dir.join(&entry.path);
        }
        let flat = entry.path.replace('/', "+");
        self.cache_dir.join(format!("{}_{}", flat, entry.checksum))
    }

    /// Destination for a downloaded installer archive: the last path segment
    /// of its source URL, inside the cache directory.
    pub fn archive_download_path(&self, url: &str) -> PathBuf {
        let name = filename_from_url_path(url)
            .map(|n| sanitize_filename(&n))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_ARCHIVE_NAME.to_string());
        self.cache_dir.join(name)
    }

    /// Canonical asset name used in the resolved map: reserved-namespace
    /// entries are renamed to the friendly alias.
    pub fn canonical_name(&self, entry: &ManifestEntry) -> String {
        if !self.reserved_prefix.is_empty() {
            if let Some(rest) = entry.path.strip_prefix(&self.reserved_prefix) {
                return format!("{}{}", self.reserved_alias, rest);
            }
        }
        entry.path.clone()
    }
}

/// Extracts the last path segment from a URL for use as a filename hint.
fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().split('/').filter(|s| !s.is_empty()).next_back()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}

/// Sanitizes an archive filename: path separators, NUL and control characters
/// become `_`, leading/trailing dots and spaces are trimmed.
fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c == '\0' || c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    replaced
        .trim_matches(|c| c == ' ' || c == '.')
        .to_string()
}
