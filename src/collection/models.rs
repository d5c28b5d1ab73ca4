// src/collection/models.rs
use serde::{Deserialize, Serialize};

use crate::extractors::RefinedExcerpt;
use crate::pipeline::CollectionAnalysis;
use crate::ranking::RankedCandidate;

pub const DEFAULT_PERSONA: &str = "Default Persona";
pub const DEFAULT_JOB: &str = "Default Job";

/// `challenge1b_input.json` as supplied with a collection. Only the persona
/// role and job task are read; everything else is ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChallengeInput {
    pub persona: PersonaInput,
    pub job_to_be_done: JobInput,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PersonaInput {
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct JobInput {
    pub task: Option<String>,
}

/// Persona role and task driving relevance ranking for one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub role: String,
    pub task: String,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            role: DEFAULT_PERSONA.to_string(),
            task: DEFAULT_JOB.to_string(),
        }
    }
}

impl From<ChallengeInput> for Query {
    fn from(input: ChallengeInput) -> Self {
        Self {
            role: input.persona.role.unwrap_or_else(|| DEFAULT_PERSONA.to_string()),
            task: input.job_to_be_done.task.unwrap_or_else(|| DEFAULT_JOB.to_string()),
        }
    }
}

// --- Output ---

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalysisOutput {
    pub metadata: Metadata,
    pub extracted_sections: Vec<ExtractedSection>,
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Metadata {
    pub input_documents: Vec<String>,
    pub persona: String,
    pub job_to_be_done: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ExtractedSection {
    pub document: String,
    pub section_title: String,
    pub page_number: u32,
    pub importance_rank: u8,
    /// Text the ranker scored for this section
    pub content: String,
    pub full_path: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SubsectionAnalysis {
    pub document: String,
    pub refined_text: String,
    pub page_number: u32,
}

impl From<&RankedCandidate> for ExtractedSection {
    fn from(ranked: &RankedCandidate) -> Self {
        Self {
            document: ranked.candidate.document.name.clone(),
            section_title: ranked.candidate.text.clone(),
            page_number: ranked.candidate.page_number,
            importance_rank: ranked.relevance_score,
            content: ranked.candidate.content.clone(),
            full_path: ranked.candidate.document.path.display().to_string(),
        }
    }
}

impl From<&RefinedExcerpt> for SubsectionAnalysis {
    fn from(excerpt: &RefinedExcerpt) -> Self {
        Self {
            document: excerpt.document.clone(),
            refined_text: excerpt.excerpt_text.clone(),
            page_number: excerpt.page_number,
        }
    }
}

impl From<&CollectionAnalysis> for AnalysisOutput {
    fn from(analysis: &CollectionAnalysis) -> Self {
        Self {
            metadata: Metadata {
                input_documents: analysis.documents.iter().map(|d| d.name.clone()).collect(),
                persona: analysis.query.role.clone(),
                job_to_be_done: analysis.query.task.clone(),
            },
            extracted_sections: analysis.ranked.iter().map(ExtractedSection::from).collect(),
            subsection_analysis: analysis.excerpts.iter().map(SubsectionAnalysis::from).collect(),
        }
    }
}

// --- Input echo ---

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct InputEcho {
    pub documents: Vec<DocumentEntry>,
    pub persona: PersonaEcho,
    pub job_to_be_done: JobEcho,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DocumentEntry {
    pub filename: String,
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PersonaEcho {
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct JobEcho {
    pub task: String,
}

impl From<&CollectionAnalysis> for InputEcho {
    fn from(analysis: &CollectionAnalysis) -> Self {
        Self {
            documents: analysis
                .documents
                .iter()
                .map(|d| DocumentEntry {
                    filename: d.name.clone(),
                    title: d
                        .path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_else(|| d.name.clone()),
                })
                .collect(),
            persona: PersonaEcho {
                role: analysis.query.role.clone(),
            },
            job_to_be_done: JobEcho {
                task: analysis.query.task.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_input_defaults() {
        let input: ChallengeInput = serde_json::from_str(
            r#"{"challenge_info": {"id": "x"}, "persona": {"role": "Travel Planner"}}"#,
        )
        .unwrap();
        assert_eq!(
            Query::from(input),
            Query {
                role: "Travel Planner".to_string(),
                task: DEFAULT_JOB.to_string(),
            }
        );

        let empty: ChallengeInput = serde_json::from_str("{}").unwrap();
        assert_eq!(Query::from(empty), Query::default());
    }

    #[test]
    fn test_output_field_names() {
        let output = AnalysisOutput {
            metadata: Metadata {
                input_documents: vec!["a.pdf".to_string()],
                persona: "HR".to_string(),
                job_to_be_done: "Forms".to_string(),
            },
            extracted_sections: vec![ExtractedSection {
                document: "a.pdf".to_string(),
                section_title: "Fill Forms".to_string(),
                page_number: 2,
                importance_rank: 41,
                content: "Fill Forms".to_string(),
                full_path: "/data/Collection 1/PDFs/a.pdf".to_string(),
            }],
            subsection_analysis: vec![SubsectionAnalysis {
                document: "a.pdf".to_string(),
                refined_text: "Créer des formulaires".to_string(),
                page_number: 2,
            }],
        };
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["metadata"]["job_to_be_done"], "Forms");
        assert_eq!(value["extracted_sections"][0]["section_title"], "Fill Forms");
        assert_eq!(value["extracted_sections"][0]["importance_rank"], 41);
        assert_eq!(value["extracted_sections"][0]["content"], "Fill Forms");
        assert_eq!(value["extracted_sections"][0]["full_path"], "/data/Collection 1/PDFs/a.pdf");
        assert_eq!(value["subsection_analysis"][0]["refined_text"], "Créer des formulaires");
    }
}
