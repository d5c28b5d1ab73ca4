// src/extractors/refine.rs
use crate::ranking::RankedCandidate;
use crate::source::{DocumentHandle, DocumentSource, TextRun};
use crate::utils::error::DocumentError;

// --- Constants ---
pub const DEFAULT_TOP_K: usize = 5;
/// Runs must be longer than this (trimmed, in characters) to join an excerpt.
const MIN_RUN_CHARS_EXCLUSIVE: usize = 10;
pub const MAX_EXCERPT_CHARS: usize = 500;
pub const TRUNCATION_MARKER: &str = "...";

#[derive(Debug, Clone, PartialEq)]
pub struct RefinedExcerpt {
    pub document: String,
    pub page_number: u32,
    pub excerpt_text: String,
}

/// Joins every run on a page whose trimmed text is longer than 10 characters.
pub fn assemble_page_text(runs: &[TextRun]) -> String {
    runs.iter()
        .map(|run| run.text.trim())
        .filter(|text| text.chars().count() > MIN_RUN_CHARS_EXCLUSIVE)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cuts text to 500 characters, appending "..." only when something was cut.
pub fn truncate_excerpt(text: &str) -> String {
    match text.char_indices().nth(MAX_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

pub struct SubsectionRefiner<'a, S: DocumentSource> {
    source: &'a S,
}

impl<'a, S: DocumentSource> SubsectionRefiner<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Builds excerpts for the first `top_k` ranked candidates. A candidate
    /// whose page cannot be re-read is skipped.
    pub fn refine(&self, ranked: &[RankedCandidate], top_k: usize) -> Vec<RefinedExcerpt> {
        ranked
            .iter()
            .take(top_k)
            .filter_map(|entry| match self.refine_one(entry) {
                Ok(excerpt) => Some(excerpt),
                Err(e) => {
                    tracing::warn!(
                        "Error extracting subsections from {}: {}",
                        entry.candidate.document.path.display(),
                        e
                    );
                    None
                }
            })
            .collect()
    }

    fn refine_one(&self, entry: &RankedCandidate) -> Result<RefinedExcerpt, DocumentError> {
        let candidate = &entry.candidate;
        let runs = {
            let handle = self.source.open(&candidate.document.path)?;
            handle.page_runs(candidate.page_number)?
        };
        let excerpt_text = truncate_excerpt(&assemble_page_text(&runs));
        tracing::debug!(
            "Refined {} p{} ({} chars)",
            candidate.document.name,
            candidate.page_number,
            excerpt_text.chars().count()
        );
        Ok(RefinedExcerpt {
            document: candidate.document.name.clone(),
            page_number: candidate.page_number,
            excerpt_text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::heading::HeadingCandidate;
    use crate::source::memory::{body, heading, MemorySource};
    use crate::source::DocumentRef;
    use std::sync::Arc;

    fn ranked(path: &str, page_number: u32, score: u8) -> RankedCandidate {
        RankedCandidate {
            candidate: HeadingCandidate {
                document: Arc::new(DocumentRef::from_path(path)),
                page_number,
                text: "Heading".to_string(),
                content: "Heading".to_string(),
            },
            relevance_score: score,
        }
    }

    #[test]
    fn test_assemble_skips_short_runs() {
        let runs = vec![
            heading("Short Head"), // exactly 10 chars
            body("  Comprehensive Guide  "),
            body("tiny"),
            body("Second long enough run"),
        ];
        assert_eq!(
            assemble_page_text(&runs),
            "Comprehensive Guide Second long enough run"
        );
    }

    #[test]
    fn test_truncation_law() {
        let exact = "x".repeat(500);
        assert_eq!(truncate_excerpt(&exact), exact);

        let long = "y".repeat(501);
        let cut = truncate_excerpt(&long);
        assert_eq!(cut.chars().count(), 503);
        assert!(cut.ends_with("..."));
        assert_eq!(&cut[..500], &long[..500]);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let long = "é".repeat(600);
        let cut = truncate_excerpt(&long);
        assert_eq!(cut.chars().count(), 503);
        assert!(cut.starts_with("ééé"));
    }

    #[test]
    fn test_refine_top_k_bound_and_order() {
        let source = MemorySource::new().with_document(
            "a.pdf",
            vec![
                vec![body("Page one body text here")],
                vec![body("Page two body text here")],
            ],
        );
        let refiner = SubsectionRefiner::new(&source);

        let input: Vec<RankedCandidate> = (0..7).map(|i| ranked("a.pdf", 1 + i % 2, 50)).collect();
        let excerpts = refiner.refine(&input, DEFAULT_TOP_K);
        assert_eq!(excerpts.len(), 5);
        assert_eq!(excerpts[0].excerpt_text, "Page one body text here");
        assert_eq!(excerpts[1].excerpt_text, "Page two body text here");
        assert_eq!(excerpts[1].page_number, 2);
        assert_eq!(excerpts[0].document, "a.pdf");

        assert!(refiner.refine(&[], DEFAULT_TOP_K).is_empty());
        assert_eq!(refiner.refine(&input[..2], DEFAULT_TOP_K).len(), 2);
    }

    #[test]
    fn test_refine_skips_unreadable_candidates() {
        let source = MemorySource::new()
            .with_corrupt("bad.pdf")
            .with_document("good.pdf", vec![vec![body("Readable paragraph text")]]);
        let refiner = SubsectionRefiner::new(&source);

        let input = vec![
            ranked("bad.pdf", 1, 90),
            ranked("good.pdf", 4, 80), // page missing
            ranked("good.pdf", 1, 70),
        ];
        let excerpts = refiner.refine(&input, DEFAULT_TOP_K);
        assert_eq!(excerpts.len(), 1);
        assert_eq!(excerpts[0].document, "good.pdf");
    }

    #[test]
    fn test_refining_same_page_twice_is_idempotent() {
        let long_run = "Lorem ipsum dolor sit amet ".repeat(30);
        let source = MemorySource::new().with_document("a.pdf", vec![vec![body(&long_run)]]);
        let refiner = SubsectionRefiner::new(&source);
        let input = vec![ranked("a.pdf", 1, 10), ranked("a.pdf", 1, 10)];

        let excerpts = refiner.refine(&input, DEFAULT_TOP_K);
        assert_eq!(excerpts[0], excerpts[1]);
        assert!(excerpts[0].excerpt_text.ends_with("..."));
    }
}
