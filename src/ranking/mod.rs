// src/ranking/mod.rs
//! Relevance ranking of heading candidates against a persona/task query.

pub mod stop_words;
pub mod tfidf;

use crate::extractors::heading::HeadingCandidate;
use crate::utils::error::RankError;
use tfidf::TfidfVectorizer;

/// Vocabulary cap for the per-batch vector space.
pub const MAX_VOCABULARY: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub candidate: HeadingCandidate,
    /// floor(cosine similarity * 100)
    pub relevance_score: u8,
}

/// Query text fed to the ranker: role, then task, space-separated.
pub fn query_text(role: &str, task: &str) -> String {
    format!("{} {}", role, task)
}

/// Scores each content string against the query. The vector space is fitted
/// jointly over `contents` plus the query and discarded afterwards.
pub fn relevance_scores(contents: &[&str], query: &str) -> Result<Vec<u8>, RankError> {
    let mut corpus = contents.to_vec();
    corpus.push(query);

    let space = TfidfVectorizer::new(MAX_VOCABULARY).fit_transform(&corpus)?;
    if tracing::enabled!(tracing::Level::TRACE) {
        for term in tfidf::tokenize(query) {
            match space.idf(&term) {
                Some(idf) => tracing::trace!("Query term '{}': idf {:.3}", term, idf),
                None => tracing::trace!("Query term '{}' is outside the vocabulary", term),
            }
        }
    }
    let (query_vector, rows) = space
        .rows()
        .split_last()
        .ok_or(RankError::EmptyVocabulary)?;

    Ok(rows
        .iter()
        .map(|row| (row.cosine(query_vector) * 100.0).floor().clamp(0.0, 100.0) as u8)
        .collect())
}

/// Ranks candidates by descending relevance. Equal scores keep input order.
///
/// If the batch has no usable vocabulary every candidate scores 0 and the
/// input order is kept.
pub fn rank(candidates: Vec<HeadingCandidate>, query: &str) -> Vec<RankedCandidate> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let contents: Vec<&str> = candidates.iter().map(|c| c.content.as_str()).collect();
    let scores = match relevance_scores(&contents, query) {
        Ok(scores) => scores,
        Err(e) => {
            tracing::warn!("No relevance signal for this batch ({}); keeping input order", e);
            vec![0; candidates.len()]
        }
    };

    let mut ranked: Vec<RankedCandidate> = candidates
        .into_iter()
        .zip(scores)
        .map(|(candidate, relevance_score)| RankedCandidate {
            candidate,
            relevance_score,
        })
        .collect();
    ranked.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
    ranked
}
