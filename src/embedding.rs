//! Injected ML capabilities: embedding and pairwise scoring.
//!
//! The library has no dependency on any model family. The two stages of
//! retrieval are supplied as opaque async capabilities: text to a
//! fixed-length vector, and (query, passage) to a scalar. Calls are
//! treated as potentially slow external work; the library never retries
//! them, failures simply propagate.

use async_trait::async_trait;

use crate::error::Result;

/// Generates fixed-dimension embedding vectors from text.
///
/// The default [`embed_batch`](Embedder::embed_batch) calls
/// [`embed`](Embedder::embed) sequentially; backends with native batching
/// should override it.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text into a vector of [`dimensions`](Embedder::dimensions) length.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts, one vector per input, in order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Dimensionality of the vectors this embedder produces.
    fn dimensions(&self) -> usize;
}

/// Scores (query, passage) pairs for second-stage re-ranking.
///
/// Scores are only required to be comparable: monotonically higher means
/// more relevant. A sigmoid-activated cross-encoder lands in `[0, 1]`,
/// which is what the default relevance threshold assumes, but no fixed
/// range is imposed here.
#[async_trait]
pub trait PairScorer: Send + Sync {
    /// Score one (query, passage) pair.
    async fn score(&self, query: &str, passage: &str) -> Result<f32>;

    /// Score a batch of passages against one query, one scalar per passage,
    /// in order.
    async fn score_batch(&self, query: &str, passages: &[&str]) -> Result<Vec<f32>> {
        let mut scores = Vec::with_capacity(passages.len());
        for passage in passages {
            scores.push(self.score(query, passage).await?);
        }
        Ok(scores)
    }
}
