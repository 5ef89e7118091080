//! `gcache checksum` – compute the SHA-1 of a file.

use anyhow::Result;
use std::path::Path;

use gcache_core::checksum::sha1_path;

pub fn run_checksum(path: &Path) -> Result<()> {
    let digest = sha1_path(path)?;
    println!("{digest}  {}", path.display());
    Ok(())
}
