// src/pipeline.rs
//! Detector → Ranker → Refiner for one collection.

use std::sync::Arc;

use crate::collection::models::{AnalysisOutput, InputEcho, Query};
use crate::collection::Collection;
use crate::extractors::{HeadingDetector, RefinedExcerpt, SubsectionRefiner, DEFAULT_TOP_K};
use crate::ranking::{self, RankedCandidate};
use crate::source::{DocumentRef, DocumentSource};
use crate::storage::StorageManager;
use crate::utils::AppError;

pub const DEFAULT_MIN_DOCUMENTS: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub min_documents: usize,
    pub top_k: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            min_documents: DEFAULT_MIN_DOCUMENTS,
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Everything produced for one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionAnalysis {
    pub documents: Vec<Arc<DocumentRef>>,
    pub query: Query,
    pub ranked: Vec<RankedCandidate>,
    pub excerpts: Vec<RefinedExcerpt>,
}

/// Runs the three stages over a batch of documents sharing one query.
pub fn analyze<S: DocumentSource>(
    source: &S,
    documents: Vec<Arc<DocumentRef>>,
    query: Query,
    top_k: usize,
) -> CollectionAnalysis {
    let candidates = HeadingDetector::new(source).detect_all(&documents);
    tracing::debug!("Detected {} candidates across {} documents", candidates.len(), documents.len());

    let ranked = ranking::rank(candidates, &ranking::query_text(&query.role, &query.task));
    let excerpts = SubsectionRefiner::new(source).refine(&ranked, top_k);

    CollectionAnalysis {
        documents,
        query,
        ranked,
        excerpts,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSummary {
    pub name: String,
    pub documents: usize,
    pub sections: usize,
    pub excerpts: usize,
}

/// Processes one collection folder end to end and writes its output files.
///
/// Returns `Ok(None)` when no heading candidates were found; nothing is
/// written in that case.
pub fn run_collection<S: DocumentSource>(
    source: &S,
    collection: &Collection,
    storage: &StorageManager,
    options: PipelineOptions,
) -> Result<Option<CollectionSummary>, AppError> {
    tracing::info!("Processing {}", collection.name);

    let documents = collection.documents(options.min_documents)?;
    let query = collection.load_query();
    let analysis = analyze(source, documents, query, options.top_k);

    if analysis.ranked.is_empty() {
        tracing::warn!("No sections extracted from PDFs in {}.", collection.name);
        return Ok(None);
    }

    let output = AnalysisOutput::from(&analysis);
    let path = storage.save_analysis(&collection.name, &output)?;
    tracing::info!("Saved analysis to {}", path.display());
    let path = storage.save_input_echo(&collection.name, &InputEcho::from(&analysis))?;
    tracing::debug!("Saved input echo to {}", path.display());

    let summary = CollectionSummary {
        name: collection.name.clone(),
        documents: analysis.documents.len(),
        sections: analysis.ranked.len(),
        excerpts: analysis.excerpts.len(),
    };
    tracing::info!("Processed {} PDFs in {}", summary.documents, summary.name);
    tracing::info!("Extracted and ranked {} sections in {}", summary.sections, summary.name);
    tracing::info!("Generated {} subsection analyses in {}", summary.excerpts, summary.name);
    Ok(Some(summary))
}
