//! The committed corpus: a chunk table plus its row-aligned vector array.

use serde::{Deserialize, Serialize};

use crate::document::Chunk;
use crate::error::{LibraryError, Result};

/// An ordered chunk table paired with a row-aligned embedding array.
///
/// Invariant: `chunks.len() == vectors.len()` and `vectors[i]` embeds
/// `chunks[i].content`. Row position is the retrieval index space, so any
/// reordering must permute both arrays together. A corpus is read-only
/// during retrieval; incremental merge produces a fresh corpus rather than
/// mutating in place, so replacing a loaded corpus is a single assignment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Corpus {
    /// The ordered chunk table.
    pub chunks: Vec<Chunk>,
    /// One embedding vector per chunk, in row order.
    pub vectors: Vec<Vec<f32>>,
}

impl Corpus {
    /// Pair a chunk table with its vectors, validating alignment.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::CorpusMisaligned`] when the lengths differ.
    pub fn new(chunks: Vec<Chunk>, vectors: Vec<Vec<f32>>) -> Result<Self> {
        let corpus = Self { chunks, vectors };
        corpus.validate_alignment()?;
        Ok(corpus)
    }

    /// Re-check the alignment invariant, e.g. after deserializing.
    pub fn validate_alignment(&self) -> Result<()> {
        if self.chunks.len() != self.vectors.len() {
            return Err(LibraryError::CorpusMisaligned {
                chunks: self.chunks.len(),
                vectors: self.vectors.len(),
            });
        }
        Ok(())
    }

    /// Number of chunks (and vectors).
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// `true` when the corpus holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Embedding dimensionality, taken from the first vector.
    pub fn dimensions(&self) -> Option<usize> {
        self.vectors.first().map(Vec::len)
    }

    /// Number of distinct source documents in the table.
    pub fn document_count(&self) -> usize {
        let mut paths: Vec<&str> = self.chunks.iter().map(|c| c.file_path.as_str()).collect();
        paths.sort_unstable();
        paths.dedup();
        paths.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(path: &str, content: &str) -> Chunk {
        Chunk {
            file_name: path.rsplit('/').next().unwrap_or(path).to_string(),
            file_path: path.to_string(),
            title: None,
            author: None,
            subject: None,
            keywords: None,
            page_label: "1".to_string(),
            content: content.to_string(),
            split_origin: false,
        }
    }

    #[test]
    fn rejects_misaligned_parts() {
        let err = Corpus::new(vec![chunk("/a.pdf", "text")], vec![]).unwrap_err();
        assert!(matches!(err, LibraryError::CorpusMisaligned { chunks: 1, vectors: 0 }));
    }

    #[test]
    fn counts_distinct_documents() {
        let corpus = Corpus::new(
            vec![chunk("/a.pdf", "one"), chunk("/a.pdf", "two"), chunk("/b.pdf", "three")],
            vec![vec![0.0]; 3],
        )
        .unwrap();
        assert_eq!(corpus.document_count(), 2);
    }
}
