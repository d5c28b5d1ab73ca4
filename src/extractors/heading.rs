// src/extractors/heading.rs

// --- Imports ---
use std::sync::Arc;

use crate::source::{DocumentHandle, DocumentRef, DocumentSource, StyleFlags, TextRun};
use crate::utils::error::DocumentError;

// --- Constants ---
/// Runs must be strictly larger than this (in points) unless bold.
pub const HEADING_MIN_FONT_SIZE: f32 = 12.0;
/// Exclusive bounds on trimmed heading length, in characters.
const HEADING_MIN_CHARS_EXCLUSIVE: usize = 3;
const HEADING_MAX_CHARS_EXCLUSIVE: usize = 200;

// --- Data Structures ---
/// A run hypothesized to be a section heading.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingCandidate {
    /// Source document, shared by every candidate it produced
    pub document: Arc<DocumentRef>,
    pub page_number: u32, // 1-based
    pub text: String,
    /// Unit scored by the ranker; currently the heading text itself
    pub content: String,
}

impl HeadingCandidate {
    fn new(document: Arc<DocumentRef>, page_number: u32, text: &str) -> Self {
        Self {
            document,
            page_number,
            text: text.to_string(),
            content: text.to_string(),
        }
    }
}

/// Layout predicate deciding whether a trimmed run reads like a heading.
pub fn is_heading_candidate(text: &str, font_size: f32, flags: StyleFlags) -> bool {
    let len = text.chars().count();
    if len <= HEADING_MIN_CHARS_EXCLUSIVE || len >= HEADING_MAX_CHARS_EXCLUSIVE {
        return false;
    }
    if !(font_size > HEADING_MIN_FONT_SIZE || flags.contains(StyleFlags::BOLD)) {
        return false;
    }
    if text.ends_with('.') {
        return false;
    }
    is_all_upper(text) || text.chars().next().is_some_and(char::is_uppercase)
}

/// True when the text has at least one cased character and none in lower case.
fn is_all_upper(text: &str) -> bool {
    let mut has_cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}

/// Emits heading candidates for one page, in run order.
pub fn detect(runs: &[TextRun], document: &Arc<DocumentRef>, page_number: u32) -> Vec<HeadingCandidate> {
    runs.iter()
        .filter_map(|run| {
            let text = run.text.trim();
            if is_heading_candidate(text, run.font_size, run.flags) {
                tracing::trace!("Heading candidate on {} p{}: '{}'", document.name, page_number, text);
                Some(HeadingCandidate::new(Arc::clone(document), page_number, text))
            } else {
                None
            }
        })
        .collect()
}

// --- Detector ---
pub struct HeadingDetector<'a, S: DocumentSource> {
    source: &'a S,
}

impl<'a, S: DocumentSource> HeadingDetector<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Scans every page of a document. A document that cannot be read
    /// contributes no candidates; the failure is logged and swallowed.
    pub fn detect_document(&self, document: &Arc<DocumentRef>) -> Vec<HeadingCandidate> {
        match self.try_detect_document(document) {
            Ok(candidates) => {
                tracing::debug!("{}: {} heading candidates", document.name, candidates.len());
                candidates
            }
            Err(e) => {
                tracing::warn!("Error processing {}: {}", document.path.display(), e);
                Vec::new()
            }
        }
    }

    fn try_detect_document(&self, document: &Arc<DocumentRef>) -> Result<Vec<HeadingCandidate>, DocumentError> {
        let handle = self.source.open(&document.path)?;
        let mut candidates = Vec::new();
        for page_number in 1..=handle.page_count() {
            let runs = handle.page_runs(page_number)?;
            candidates.extend(detect(&runs, document, page_number));
        }
        Ok(candidates)
    }

    /// Candidates for a batch of documents, in document order.
    pub fn detect_all(&self, documents: &[Arc<DocumentRef>]) -> Vec<HeadingCandidate> {
        documents
            .iter()
            .flat_map(|document| self.detect_document(document))
            .collect()
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::memory::{body, heading, MemorySource};

    fn doc(name: &str) -> Arc<DocumentRef> {
        Arc::new(DocumentRef::from_path(name))
    }

    #[test]
    fn test_predicate_length_bounds() {
        assert!(!is_heading_candidate("Abc", 16.0, StyleFlags::empty()));
        assert!(is_heading_candidate("Abcd", 16.0, StyleFlags::empty()));
        let longest = format!("A{}", "b".repeat(198));
        assert!(is_heading_candidate(&longest, 16.0, StyleFlags::empty()));
        let too_long = format!("A{}", "b".repeat(199));
        assert!(!is_heading_candidate(&too_long, 16.0, StyleFlags::empty()));
    }

    #[test]
    fn test_predicate_counts_characters_not_bytes() {
        // four characters, eight bytes
        assert!(is_heading_candidate("Éécé", 16.0, StyleFlags::empty()));
        assert!(!is_heading_candidate("Ééé", 16.0, StyleFlags::empty()));
    }

    #[test]
    fn test_predicate_size_or_bold() {
        assert!(!is_heading_candidate("Overview", 12.0, StyleFlags::empty()));
        assert!(is_heading_candidate("Overview", 12.5, StyleFlags::empty()));
        assert!(is_heading_candidate("Overview", 9.0, StyleFlags::BOLD));
        assert!(!is_heading_candidate("Overview", 9.0, StyleFlags::ITALIC));
    }

    #[test]
    fn test_predicate_case_and_period() {
        assert!(!is_heading_candidate("This is a sentence.", 16.0, StyleFlags::BOLD));
        assert!(!is_heading_candidate("lowercase heading", 16.0, StyleFlags::BOLD));
        assert!(is_heading_candidate("HISTORY OF NICE", 16.0, StyleFlags::empty()));
        assert!(is_heading_candidate("Things to Do", 16.0, StyleFlags::empty()));
        assert!(!is_heading_candidate("1234 5678", 16.0, StyleFlags::BOLD));
        assert!(is_heading_candidate("2. METHODS", 16.0, StyleFlags::BOLD));
    }

    #[test]
    fn test_detect_trims_and_keeps_order() {
        let runs = vec![
            heading("  Introduction  "),
            body("Some body text that is long enough."),
            heading("Conclusion"),
        ];
        let document = doc("a.pdf");
        let candidates = detect(&runs, &document, 3);

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].text, "Introduction");
        assert_eq!(candidates[0].content, "Introduction");
        assert_eq!(candidates[0].page_number, 3);
        assert_eq!(candidates[0].document.name, "a.pdf");
        assert_eq!(candidates[1].text, "Conclusion");
    }

    #[test]
    fn test_document_pages_are_numbered_from_one() {
        let source = MemorySource::new().with_document(
            "guide.pdf",
            vec![vec![heading("Cover Page")], vec![], vec![heading("Local Cuisine")]],
        );
        let detector = HeadingDetector::new(&source);
        let candidates = detector.detect_document(&doc("guide.pdf"));

        let pages: Vec<u32> = candidates.iter().map(|c| c.page_number).collect();
        assert_eq!(pages, vec![1, 3]);
    }

    #[test]
    fn test_zero_page_and_body_only_documents_yield_nothing() {
        let source = MemorySource::new()
            .with_document("empty.pdf", vec![])
            .with_document("body.pdf", vec![vec![body("all lowercase body text.")]])
            .with_document("ok.pdf", vec![vec![heading("Packing List")]]);
        let detector = HeadingDetector::new(&source);

        let candidates = detector.detect_all(&[doc("empty.pdf"), doc("body.pdf"), doc("ok.pdf")]);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].document.name, "ok.pdf");
    }

    #[test]
    fn test_corrupt_document_is_isolated() {
        let mut source = MemorySource::new().with_corrupt("broken.pdf");
        let mut documents = vec![doc("broken.pdf")];
        for i in 0..4 {
            let name = format!("doc{}.pdf", i);
            source = source.with_document(name.as_str(), vec![vec![heading("Section Heading")]]);
            documents.push(doc(&name));
        }
        let detector = HeadingDetector::new(&source);

        let candidates = detector.detect_all(&documents);
        assert_eq!(candidates.len(), 4);
        assert!(candidates.iter().all(|c| c.document.name != "broken.pdf"));
    }
}
