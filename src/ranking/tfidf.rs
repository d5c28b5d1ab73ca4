// src/ranking/tfidf.rs
//! Term-frequency × inverse-document-frequency vector space.
//!
//! Tokens are lower-cased runs of two or more word characters; stop words are
//! dropped. The vocabulary keeps the `max_features` terms with the highest
//! corpus-wide count (ties broken alphabetically). IDF is smoothed,
//! `ln((1 + n) / (1 + df)) + 1`, and every row is L2-normalized.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;

use super::stop_words::is_stop_word;
use crate::utils::error::RankError;

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("Failed to compile TOKEN_RE"));

/// Lower-cased, stop-word-filtered tokens in text order.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|t| !is_stop_word(t))
        .map(str::to_string)
        .collect()
}

/// Sparse row of the fitted matrix, entries sorted by term index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    #[cfg(test)]
    pub fn is_zero(&self) -> bool {
        self.entries.iter().all(|&(_, w)| w == 0.0)
    }

    #[cfg(test)]
    pub fn weight(&self, term: usize) -> f64 {
        self.entries
            .binary_search_by_key(&term, |&(t, _)| t)
            .map(|i| self.entries[i].1)
            .unwrap_or(0.0)
    }

    fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j, mut sum) = (0, 0, 0.0);
        while i < self.entries.len() && j < other.entries.len() {
            let (a, wa) = self.entries[i];
            let (b, wb) = other.entries[j];
            match a.cmp(&b) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += wa * wb;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Cosine similarity in [0, 1]; zero when either vector is zero.
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            return 0.0;
        }
        (self.dot(other) / denom).clamp(0.0, 1.0)
    }
}

/// Vector space fitted to a single corpus. Not reused across corpora.
#[derive(Debug)]
pub struct TfidfSpace {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    rows: Vec<SparseVector>,
}

impl TfidfSpace {
    pub fn rows(&self) -> &[SparseVector] {
        &self.rows
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// IDF weight of a vocabulary term.
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.term_index(term).map(|i| self.idf[i])
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TfidfVectorizer {
    max_features: usize,
}

impl TfidfVectorizer {
    pub fn new(max_features: usize) -> Self {
        Self { max_features }
    }

    pub fn fit_transform(&self, corpus: &[&str]) -> Result<TfidfSpace, RankError> {
        let tokenized: Vec<Vec<String>> = corpus.iter().map(|doc| tokenize(doc)).collect();

        // Corpus-wide term counts, alphabetical
        let mut totals: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in &tokenized {
            for token in tokens {
                *totals.entry(token.as_str()).or_insert(0) += 1;
            }
        }
        if totals.is_empty() {
            return Err(RankError::EmptyVocabulary);
        }

        let mut by_count: Vec<(&str, usize)> = totals.into_iter().collect();
        by_count.sort_by(|a, b| b.1.cmp(&a.1)); // stable: ties stay alphabetical
        by_count.truncate(self.max_features);
        let mut kept: Vec<&str> = by_count.into_iter().map(|(t, _)| t).collect();
        kept.sort_unstable();

        let vocabulary: HashMap<String, usize> = kept
            .iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i))
            .collect();

        // Raw term counts per document, restricted to the vocabulary
        let counts: Vec<BTreeMap<usize, usize>> = tokenized
            .iter()
            .map(|tokens| {
                let mut row = BTreeMap::new();
                for token in tokens {
                    if let Some(&idx) = vocabulary.get(token) {
                        *row.entry(idx).or_insert(0) += 1;
                    }
                }
                row
            })
            .collect();

        let mut df = vec![0usize; vocabulary.len()];
        for row in &counts {
            for &idx in row.keys() {
                df[idx] += 1;
            }
        }
        let n = corpus.len() as f64;
        let idf: Vec<f64> = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        let rows = counts
            .into_iter()
            .map(|row| {
                let weighted: Vec<(usize, f64)> = row
                    .into_iter()
                    .map(|(idx, tf)| (idx, tf as f64 * idf[idx]))
                    .collect();
                let norm = weighted.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt();
                let entries = if norm > 0.0 {
                    weighted.into_iter().map(|(i, w)| (i, w / norm)).collect()
                } else {
                    weighted
                };
                SparseVector { entries }
            })
            .collect();

        let space = TfidfSpace { vocabulary, idf, rows };
        tracing::debug!(
            "Fitted TF-IDF space: {} documents, {} terms",
            corpus.len(),
            space.vocabulary_len()
        );
        Ok(space)
    }
}
