//! Installer-archive capability boundary.
//!
//! The byte-level container parser lives outside the engine. Extraction only
//! needs section enumeration, string-table lookups, an instruction visitor
//! and member materialization; everything format-specific stays behind these
//! traits.

use anyhow::Result;
use std::path::Path;

/// A block of installer instructions. `code_size` > 0 marks a section that
/// actually carries extraction logic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Section {
    /// Instruction-stream offset of the section's code.
    pub code: u32,
    pub code_size: u32,
}

/// Instruction kinds the walk cares about; everything else is opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// Declares the directory subsequent extractions land in.
    CreateDir,
    /// Extracts one file into the current directory.
    ExtractFile,
    /// Invokes a nested instruction block.
    Call,
    Other,
}

/// One decoded instruction with its raw operand slots.
#[derive(Debug, Clone, Copy)]
pub struct Instruction {
    pub opcode: Opcode,
    /// Raw operands; their meaning depends on the opcode (string-table
    /// offsets, code offsets, flags).
    pub offsets: [i32; 6],
}

/// Visitor over a section's instruction stream; an error aborts the walk.
pub type InstructionVisitor<'a> = dyn FnMut(&Instruction) -> Result<()> + 'a;

/// Iteration/extraction capability over one downloaded installer archive.
pub trait InstallerArchive {
    /// Archive layout, section by section.
    fn sections(&self) -> Vec<Section>;

    /// Looks up a string-table entry (directory or file name).
    fn get_string(&self, offset: i32) -> String;

    /// Walks a section's instruction stream. Must be reentrant in the
    /// sequential sense: a visitor may call back into `process_section` for
    /// a nested block before the outer walk resumes.
    fn process_section(&self, section: Section, visit: &mut InstructionVisitor<'_>)
        -> Result<()>;

    /// Materializes the file referenced by an extract instruction at
    /// `destination`.
    fn add_file(&self, instruction: &Instruction, destination: &Path) -> Result<()>;
}

/// Opens downloaded archive files for extraction.
pub trait ArchiveOpener {
    fn open(&self, archive: &Path) -> Result<Box<dyn InstallerArchive>>;
}
