//! Per-archive visitor walk: directory tracking, member matching, recursion.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;

use crate::checksum::Sha1Digest;
use crate::layout::CacheLayout;
use crate::manifest::ManifestEntry;

use super::archive::{InstallerArchive, Instruction, Opcode, Section};

/// Synthetic size for nested instruction blocks reached through a call;
/// spans the remainder of the code.
const NESTED_CODE_SIZE: u32 = u32::MAX;

/// Drives one archive through the capability, materializing every batch
/// member at its cache address.
///
/// Fails when the archive has no section carrying extraction logic, or when
/// the walk finishes without producing a required member.
pub(super) fn extract_batch(
    archive: &dyn InstallerArchive,
    batch: &[ManifestEntry],
    layout: &CacheLayout,
) -> Result<()> {
    let driver = archive
        .sections()
        .into_iter()
        .find(|s| s.code_size > 0)
        .ok_or_else(|| anyhow::anyhow!("archive has no section with executable code"))?;

    let mut walker = SectionWalker {
        archive,
        layout,
        batch,
        current_dir: String::new(),
        extracted: HashSet::new(),
    };
    walker.walk(driver)?;

    for entry in batch {
        if !walker.extracted.contains(&entry.checksum)
            && !layout.entry_cache_path(entry).exists()
        {
            anyhow::bail!(
                "member {} for {} not found in archive",
                entry.archive_member.as_deref().unwrap_or("?"),
                entry.path
            );
        }
    }
    Ok(())
}

struct SectionWalker<'a> {
    archive: &'a dyn InstallerArchive,
    layout: &'a CacheLayout,
    batch: &'a [ManifestEntry],
    /// Directory subsequent extractions land in, `/`-separated.
    current_dir: String,
    /// Checksums already materialized in this batch; two entries referencing
    /// the same member are extracted once.
    extracted: HashSet<Sha1Digest>,
}

impl SectionWalker<'_> {
    fn walk(&mut self, section: Section) -> Result<()> {
        let archive = self.archive;
        archive.process_section(section, &mut |instruction| self.handle(instruction))
    }

    fn handle(&mut self, instruction: &Instruction) -> Result<()> {
        match instruction.opcode {
            Opcode::CreateDir => {
                if instruction.offsets[1] != 0 {
                    self.current_dir = self
                        .archive
                        .get_string(instruction.offsets[0])
                        .replace('\\', "/");
                }
            }
            Opcode::ExtractFile => self.extract_file(instruction)?,
            Opcode::Call => {
                let nested = Section {
                    code: instruction.offsets[0] as u32,
                    code_size: NESTED_CODE_SIZE,
                };
                self.walk(nested)?;
            }
            Opcode::Other => {}
        }
        Ok(())
    }

    fn extract_file(&mut self, instruction: &Instruction) -> Result<()> {
        let name = self.archive.get_string(instruction.offsets[1]);
        let candidate = member_path(&self.current_dir, &name);

        for entry in self.batch {
            let Some(declared) = entry.archive_member.as_deref() else {
                continue;
            };
            if !declared.eq_ignore_ascii_case(&candidate) {
                continue;
            }
            if self.extracted.contains(&entry.checksum) {
                continue;
            }

            let destination = self.layout.entry_cache_path(entry);
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
            self.archive
                .add_file(instruction, &destination)
                .with_context(|| format!("extract {} -> {}", candidate, entry.path))?;
            self.extracted.insert(entry.checksum);
        }
        Ok(())
    }
}

/// Candidate member path: current directory joined with the declared name,
/// consecutive separators collapsed, and the installer's root variable (the
/// first path segment) replaced by `$`.
pub(super) fn member_path(current_dir: &str, name: &str) -> String {
    let joined = format!("{current_dir}/{name}");
    let mut collapsed = String::with_capacity(joined.len());
    let mut was_slash = false;
    for c in joined.chars() {
        if c == '/' {
            if !was_slash {
                collapsed.push(c);
            }
            was_slash = true;
        } else {
            collapsed.push(c);
            was_slash = false;
        }
    }
    match collapsed.find('/') {
        Some(i) => format!("$/{}", &collapsed[i + 1..]),
        None => format!("$/{collapsed}"),
    }
}
