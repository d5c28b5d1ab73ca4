// src/collection/mod.rs
//! Discovery of `Collection_*` folders and their inputs.

pub mod models;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::source::DocumentRef;
use crate::utils::error::CollectionError;
use models::{ChallengeInput, Query};

pub const COLLECTION_PREFIX: &str = "Collection_";
pub const PDF_DIR: &str = "PDFs";
pub const INPUT_FILE: &str = "challenge1b_input.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub name: String,
    pub dir: PathBuf,
}

/// Lists `Collection_*` sub-directories of `base_dir`, sorted by name.
pub fn discover_collections(base_dir: &Path) -> Result<Vec<Collection>, CollectionError> {
    let mut collections = Vec::new();
    for entry in fs::read_dir(base_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(COLLECTION_PREFIX) {
            collections.push(Collection { name, dir: entry.path() });
        }
    }
    collections.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::debug!("Discovered {} collections under {}", collections.len(), base_dir.display());
    Ok(collections)
}

impl Collection {
    #[cfg(test)]
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, dir }
    }

    /// PDF files in the collection's `PDFs/` folder, sorted by file name.
    pub fn pdf_files(&self) -> Result<Vec<PathBuf>, CollectionError> {
        let pdf_dir = self.dir.join(PDF_DIR);
        if !pdf_dir.is_dir() {
            return Err(CollectionError::MissingPdfDir(self.name.clone()));
        }
        let mut files: Vec<PathBuf> = fs::read_dir(&pdf_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
            })
            .collect();
        files.sort();
        Ok(files)
    }

    /// Source documents, provided there are at least `min_documents` of them.
    pub fn documents(&self, min_documents: usize) -> Result<Vec<Arc<DocumentRef>>, CollectionError> {
        let files = self.pdf_files()?;
        if files.len() < min_documents {
            return Err(CollectionError::NotEnoughDocuments {
                collection: self.name.clone(),
                found: files.len(),
                required: min_documents,
            });
        }
        Ok(files
            .into_iter()
            .map(|path| Arc::new(DocumentRef::from_path(path)))
            .collect())
    }

    /// Persona and task for the collection. Falls back to the defaults when
    /// the input file is absent or unreadable.
    pub fn load_query(&self) -> Query {
        let input_path = self.dir.join(INPUT_FILE);
        if !input_path.exists() {
            tracing::debug!("No {} in {}, using default persona/job", INPUT_FILE, self.name);
            return Query::default();
        }
        let parsed = fs::read_to_string(&input_path)
            .map_err(|e| e.to_string())
            .and_then(|raw| serde_json::from_str::<ChallengeInput>(&raw).map_err(|e| e.to_string()));
        match parsed {
            Ok(input) => Query::from(input),
            Err(e) => {
                tracing::warn!("Could not read {}: {}; using default persona/job", input_path.display(), e);
                Query::default()
            }
        }
    }
}
