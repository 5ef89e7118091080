//! Recovering ledger facts from checksum-suffixed cache filenames.

use crate::checksum::Sha1Digest;

/// Parses a cache filename of the form `<flattened name>_<40-hex-checksum>`.
///
/// The name must carry a file extension and be long enough for the checksum
/// suffix; anything else (archives, the ledger log itself, stray files) is
/// not a ledger fact.
pub(super) fn parse_cache_file_name(name: &str) -> Option<(String, Sha1Digest)> {
    // Shortest valid form: one-character name, a dot, an extension character,
    // the underscore, 40 hex characters.
    if name.len() < 44 {
        return None;
    }
    if !name.contains('.') {
        return None;
    }
    let suffix = name.get(name.len() - 41..)?;
    let hash = suffix.strip_prefix('_')?;
    let digest = Sha1Digest::from_hex(hash).ok()?;
    let base = &name[..name.len() - 41];
    Some((base.to_string(), digest))
}
