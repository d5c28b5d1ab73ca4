// src/source/mod.rs
//! Page-level text access.
//!
//! The analysis pipeline never looks at a file container directly. It opens a
//! document through a [`DocumentSource`], asks the returned handle for the
//! text runs of a page, and drops the handle when the pass is over.

pub mod pdf;

#[cfg(test)]
pub mod memory;

use std::path::{Path, PathBuf};

use bitflags::bitflags;

use crate::utils::error::DocumentError;

pub use pdf::PdfSource;

bitflags! {
    /// Style flags attached to a text run.
    ///
    /// Bit layout follows the usual span-flag convention so that bold is bit 4.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StyleFlags: u32 {
        const SUPERSCRIPT = 1 << 0;
        const ITALIC = 1 << 1;
        const SERIFED = 1 << 2;
        const MONOSPACED = 1 << 3;
        const BOLD = 1 << 4;
    }
}

/// A contiguous piece of text drawn with one font at one size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    /// Effective font size in points
    pub font_size: f32,
    pub flags: StyleFlags,
    /// Text-space origin of the run's first glyph
    pub origin: (f32, f32),
}

/// Identity of a source document: display name plus the path used to re-open it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    pub name: String,
    pub path: PathBuf,
}

impl DocumentRef {
    /// Uses the file name as the display name.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }
}

/// An open document. Dropping the handle releases it.
pub trait DocumentHandle {
    fn page_count(&self) -> u32;

    /// Text runs of a 1-based page, in block/line/span traversal order.
    fn page_runs(&self, page_number: u32) -> Result<Vec<TextRun>, DocumentError>;
}

/// Opens documents by path.
pub trait DocumentSource {
    type Handle: DocumentHandle;

    fn open(&self, path: &Path) -> Result<Self::Handle, DocumentError>;
}
