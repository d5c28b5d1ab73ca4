// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};
use serde::Serialize;
use crate::collection::models::{AnalysisOutput, InputEcho};
use crate::utils::error::StorageError;

#[derive(Debug, Clone)]
pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified output directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the output directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    #[cfg(test)]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Saves the ranked sections and excerpts as `output_<collection>.json`
    pub fn save_analysis(&self, collection: &str, output: &AnalysisOutput) -> Result<PathBuf, StorageError> {
        self.write_json(&format!("output_{}.json", collection), output)
    }

    /// Saves the normalized collection input as `input_<collection>.json`
    pub fn save_input_echo(&self, collection: &str, echo: &InputEcho) -> Result<PathBuf, StorageError> {
        self.write_json(&format!("input_{}.json", collection), echo)
    }

    fn write_json<T: Serialize>(&self, filename: &str, value: &T) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(filename);

        // Pretty-printed, non-ASCII kept as-is
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, json)
            .map_err(StorageError::IoError)?;

        tracing::debug!("Wrote {}", file_path.display());

        Ok(file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::models::{JobEcho, Metadata, PersonaEcho, DocumentEntry};

    #[test]
    fn test_creates_output_dir_and_writes_utf8() {
        let base = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(base.path().join("nested/output")).unwrap();
        assert!(storage.base_dir().is_dir());

        let output = AnalysisOutput {
            metadata: Metadata {
                input_documents: vec!["Déjeuner.pdf".to_string()],
                persona: "Chef".to_string(),
                job_to_be_done: "Menu".to_string(),
            },
            extracted_sections: vec![],
            subsection_analysis: vec![],
        };
        let path = storage.save_analysis("Collection_1", &output).unwrap();
        assert_eq!(path.file_name().unwrap(), "output_Collection_1.json");

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Déjeuner.pdf"));
        assert!(raw.contains("\n  \"metadata\""));
        let back: AnalysisOutput = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, output);
    }

    #[test]
    fn test_input_echo_file_name() {
        let base = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(base.path()).unwrap();
        let echo = InputEcho {
            documents: vec![DocumentEntry {
                filename: "a.pdf".to_string(),
                title: "a".to_string(),
            }],
            persona: PersonaEcho { role: "R".to_string() },
            job_to_be_done: JobEcho { task: "T".to_string() },
        };
        let path = storage.save_input_echo("Collection_2", &echo).unwrap();
        assert_eq!(path, base.path().join("input_Collection_2.json"));
    }
}
