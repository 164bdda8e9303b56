//! Two-stage retrieval: dot-product candidate selection and pairwise
//! re-ranking.

use std::cmp::Ordering;

use crate::corpus::Corpus;
use crate::embedding::PairScorer;
use crate::error::{LibraryError, Result};

/// A first-stage candidate: corpus row index and dot-product similarity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Row index into the corpus.
    pub index: usize,
    /// Dot product of the query vector with this row's vector.
    pub score: f32,
}

/// A re-ranked result.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedHit {
    /// 1-based final rank.
    pub rank: usize,
    /// Row index into the corpus.
    pub index: usize,
    /// First-stage dot-product similarity.
    pub similarity: f32,
    /// Second-stage pairwise relevance score.
    pub relevance: f32,
}

/// Select the top candidates for a query vector by dot-product similarity.
///
/// The effective count is `min(k_req, corpus len)`. Results come back in
/// descending score order; ties break toward the lower row index.
///
/// # Errors
///
/// Returns [`LibraryError::InvalidQuery`] when the corpus is empty or any
/// corpus vector's dimensionality differs from the query's.
pub fn top_k(query: &[f32], corpus: &Corpus, k_req: usize) -> Result<Vec<Hit>> {
    if corpus.is_empty() {
        return Err(LibraryError::InvalidQuery("corpus is empty".to_string()));
    }
    for (index, vector) in corpus.vectors.iter().enumerate() {
        if vector.len() != query.len() {
            return Err(LibraryError::InvalidQuery(format!(
                "dimension mismatch: query has {} dimensions, corpus row {index} has {}",
                query.len(),
                vector.len()
            )));
        }
    }

    let mut hits: Vec<Hit> = corpus
        .vectors
        .iter()
        .enumerate()
        .map(|(index, vector)| Hit { index, score: dot(query, vector) })
        .collect();
    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.index.cmp(&b.index))
    });
    hits.truncate(k_req.min(corpus.len()));
    Ok(hits)
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Re-score first-stage candidates with the pairwise scorer and produce the
/// final ordering.
///
/// The sort is stable and descending on the second-stage score, so equal
/// scores keep their first-stage relative order. Ranks are assigned
/// 1-based after the sort.
///
/// # Errors
///
/// Returns [`LibraryError::Scoring`] when the scorer returns the wrong
/// number of scores; scorer failures propagate as-is.
pub async fn rerank(
    scorer: &dyn PairScorer,
    query: &str,
    corpus: &Corpus,
    hits: &[Hit],
) -> Result<Vec<RankedHit>> {
    if hits.is_empty() {
        return Ok(Vec::new());
    }

    let passages: Vec<&str> =
        hits.iter().map(|hit| corpus.chunks[hit.index].content.as_str()).collect();
    let scores = scorer.score_batch(query, &passages).await?;
    if scores.len() != hits.len() {
        return Err(LibraryError::Scoring(format!(
            "scorer returned {} scores for {} pairs",
            scores.len(),
            hits.len()
        )));
    }

    let mut ranked: Vec<RankedHit> = hits
        .iter()
        .zip(scores)
        .map(|(hit, relevance)| RankedHit {
            rank: 0,
            index: hit.index,
            similarity: hit.score,
            relevance,
        })
        .collect();
    ranked.sort_by(|a, b| b.relevance.partial_cmp(&a.relevance).unwrap_or(Ordering::Equal));
    for (position, hit) in ranked.iter_mut().enumerate() {
        hit.rank = position + 1;
    }
    Ok(ranked)
}
