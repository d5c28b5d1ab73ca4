// src/utils/error.rs
use std::path::PathBuf;
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Could not open document {path}: {reason}")]
    Open { path: PathBuf, reason: String },

    #[error("Page {page} out of range (document has {count} pages)")]
    PageOutOfRange { page: u32, count: u32 },

    #[error("Failed to decode page {page} content: {reason}")]
    Content { page: u32, reason: String },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RankError {
    #[error("Empty vocabulary; the corpus only contains stop words or symbols")]
    EmptyVocabulary,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No PDFs folder in {0}")]
    MissingPdfDir(String),

    #[error("Found only {found} PDFs in {collection}. Minimum {required} required")]
    NotEnoughDocuments {
        collection: String,
        found: usize,
        required: usize,
    },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Collection processing failed: {0}")]
    Collection(#[from] CollectionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
