//! Manifest data model: the fixed, ordered list of required files.
//!
//! The manifest is configuration data, not code: it is loaded from a TOML
//! file at startup and never mutated. Each entry names a logical path in the
//! game installation, the checksum its content must have, and where the bytes
//! come from when the cache has to be (re)filled.

mod file;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::checksum::Sha1Digest;

/// Where an entry's bytes come from when the cache misses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteSource {
    /// Direct or archive download from this URL.
    Fetchable(String),
    /// Never auto-fetched; satisfied only from the local installation.
    LocalOnly,
}

impl RemoteSource {
    pub fn url(&self) -> Option<&str> {
        match self {
            RemoteSource::Fetchable(url) => Some(url),
            RemoteSource::LocalOnly => None,
        }
    }

    pub fn is_local_only(&self) -> bool {
        matches!(self, RemoteSource::LocalOnly)
    }
}

/// One required file.
#[derive(Debug, Clone)]
pub struct ManifestEntry {
    /// Logical path relative to the game installation, with `/` separators
    /// (e.g. `update/update.rpf`).
    pub path: String,
    /// Expected content checksum.
    pub checksum: Sha1Digest,
    /// Remote source descriptor.
    pub source: RemoteSource,
    /// Path inside the installer archive, present iff the file must be
    /// extracted rather than fetched directly (e.g. `$/update/update.rpf`).
    pub archive_member: Option<String>,
    /// Expected size of the local file in bytes.
    pub local_size: u64,
    /// Expected size of the remote download. `None` means unknown, which
    /// hard-blocks any fetch that would need it. Entries extracted from the
    /// same archive share this value.
    pub remote_size: Option<u64>,
}

impl ManifestEntry {
    /// Absolute path of this entry inside the game installation.
    pub fn install_path(&self, game_dir: &Path) -> PathBuf {
        game_dir.join(&self.path)
    }
}

/// Immutable, ordered list of required entries plus the reserved-namespace
/// naming rules (see [`crate::layout`]).
#[derive(Debug, Clone)]
pub struct Manifest {
    /// Logical-path prefix whose entries keep a nested cache path. Empty
    /// means no reserved namespace.
    pub reserved_prefix: String,
    /// Friendly prefix the reserved namespace is renamed to in the resolved
    /// asset map.
    pub reserved_alias: String,
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Loads and validates a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("read manifest {}", path.display()))?;
        Self::from_toml_str(&data)
            .with_context(|| format!("parse manifest {}", path.display()))
    }

    pub fn from_toml_str(data: &str) -> Result<Self> {
        let raw: file::ManifestFile = toml::from_str(data).context("invalid manifest TOML")?;
        file::resolve(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_direct_local_only_and_archived_entries() {
        let manifest = Manifest::from_toml_str(
            r#"
            reserved_prefix = "sc_1219/"
            reserved_alias = "Social Club/"

            [[entry]]
            path = "game.exe"
            checksum = "debf7c0e7e6434907f3623f4bea3c4e125734b0f"
            url = "https://patches.example.net/game_patch.exe"
            member = "$/game.exe"
            local_size = 60378008
            remote_size = 775766328

            [[entry]]
            path = "update/dlc1/dlc.rpf"
            checksum = "124c908d82724258a5721535c87f1b8e5c6d8e57"
            local_size = 312438784

            [[entry]]
            path = "launcher.exe"
            checksum = "0b05db1cb238c239771947693e830e85f585c08c"
            url = "https://patches.example.net/launcher.exe"
            local_size = 21544344
            "#,
        )
        .unwrap();

        assert_eq!(manifest.reserved_prefix, "sc_1219/");
        assert_eq!(manifest.reserved_alias, "Social Club/");
        assert_eq!(manifest.entries.len(), 3);

        let archived = &manifest.entries[0];
        assert_eq!(
            archived.source.url(),
            Some("https://patches.example.net/game_patch.exe")
        );
        assert_eq!(archived.archive_member.as_deref(), Some("$/game.exe"));
        assert_eq!(archived.remote_size, Some(775766328));

        let local_only = &manifest.entries[1];
        assert!(local_only.source.is_local_only());
        assert!(local_only.archive_member.is_none());

        // Direct downloads default their remote size to the local size.
        let direct = &manifest.entries[2];
        assert_eq!(direct.remote_size, Some(21544344));
    }

    #[test]
    fn archived_entry_without_declared_remote_size_is_unknown() {
        let manifest = Manifest::from_toml_str(
            r#"
            [[entry]]
            path = "a.rpf"
            checksum = "124c908d82724258a5721535c87f1b8e5c6d8e57"
            url = "https://patches.example.net/pak.exe"
            member = "$/a.rpf"
            local_size = 10
            "#,
        )
        .unwrap();
        assert_eq!(manifest.entries[0].remote_size, None);
    }

    #[test]
    fn rejects_member_without_url() {
        let err = Manifest::from_toml_str(
            r#"
            [[entry]]
            path = "a.rpf"
            checksum = "124c908d82724258a5721535c87f1b8e5c6d8e57"
            member = "$/a.rpf"
            local_size = 10
            "#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("archive member"));
    }

    #[test]
    fn rejects_bad_checksum() {
        assert!(Manifest::from_toml_str(
            r#"
            [[entry]]
            path = "a.bin"
            checksum = "not-hex"
            local_size = 1
            "#,
        )
        .is_err());
    }

    #[test]
    fn install_path_joins_game_dir() {
        let entry = ManifestEntry {
            path: "update/update.rpf".to_string(),
            checksum: Sha1Digest::from_hex("a568f68b14a8a9b91d5d26d1882e54c081e196ef")
                .unwrap(),
            source: RemoteSource::LocalOnly,
            archive_member: None,
            local_size: 1,
            remote_size: None,
        };
        assert_eq!(
            entry.install_path(Path::new("/opt/game")),
            PathBuf::from("/opt/game/update/update.rpf")
        );
    }
}
