// src/source/memory.rs
//! In-memory document source used by the pipeline tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{DocumentHandle, DocumentSource, StyleFlags, TextRun};
use crate::utils::error::DocumentError;

#[derive(Debug, Default)]
pub struct MemorySource {
    // None marks a document that fails to open
    documents: HashMap<PathBuf, Option<Vec<Vec<TextRun>>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, path: impl Into<PathBuf>, pages: Vec<Vec<TextRun>>) -> Self {
        self.documents.insert(path.into(), Some(pages));
        self
    }

    pub fn with_corrupt(mut self, path: impl Into<PathBuf>) -> Self {
        self.documents.insert(path.into(), None);
        self
    }
}

pub struct MemoryHandle {
    pages: Vec<Vec<TextRun>>,
}

impl DocumentHandle for MemoryHandle {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_runs(&self, page_number: u32) -> Result<Vec<TextRun>, DocumentError> {
        page_number
            .checked_sub(1)
            .and_then(|idx| self.pages.get(idx as usize))
            .cloned()
            .ok_or(DocumentError::PageOutOfRange {
                page: page_number,
                count: self.page_count(),
            })
    }
}

impl DocumentSource for MemorySource {
    type Handle = MemoryHandle;

    fn open(&self, path: &Path) -> Result<MemoryHandle, DocumentError> {
        match self.documents.get(path) {
            Some(Some(pages)) => Ok(MemoryHandle { pages: pages.clone() }),
            Some(None) => Err(DocumentError::Open {
                path: path.to_path_buf(),
                reason: "corrupt document".to_string(),
            }),
            None => Err(DocumentError::Open {
                path: path.to_path_buf(),
                reason: "no such document".to_string(),
            }),
        }
    }
}

fn run(text: &str, font_size: f32, flags: StyleFlags) -> TextRun {
    TextRun {
        text: text.to_string(),
        font_size,
        flags,
        origin: (0.0, 0.0),
    }
}

/// Bold 16pt run.
pub fn heading(text: &str) -> TextRun {
    run(text, 16.0, StyleFlags::BOLD)
}

/// Regular 10pt run.
pub fn body(text: &str) -> TextRun {
    run(text, 10.0, StyleFlags::empty())
}
