//! Error types for the `semdex` crate.

use thiserror::Error;

/// Errors that can occur while building or querying a document library.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Text extraction failed for a single document.
    ///
    /// Recoverable: the document is skipped, counted in the ingest report,
    /// and the rest of the batch continues.
    #[error("extraction failed for {path}: {message}")]
    Extraction {
        /// Path of the document that failed to extract.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// No chunks survived assembly and filtering.
    ///
    /// Either no machine-readable text was found in any input document, or
    /// (in merge mode) nothing new remained after deduplication upstream.
    #[error("chunk table cannot be blank: no machine-readable text survived assembly")]
    EmptyCorpus,

    /// An incremental merge found the candidate batch entirely duplicate of
    /// the existing library.
    #[error("no new documents found: candidate batch duplicates the existing library")]
    NoNewContent,

    /// A merge commit was aborted because the combined lengths did not match
    /// expectations. No files are written or deleted when this is raised.
    #[error(
        "merge integrity check failed: expected {expected_chunks} chunks / {expected_vectors} vectors, found {actual_chunks} / {actual_vectors}"
    )]
    MergeIntegrity {
        /// Sum of the two input chunk table lengths.
        expected_chunks: usize,
        /// Combined chunk table length actually produced.
        actual_chunks: usize,
        /// Sum of the two input vector array lengths.
        expected_vectors: usize,
        /// Combined vector array length actually produced.
        actual_vectors: usize,
    },

    /// A chunk table and its vector array disagree in length.
    #[error("corpus misaligned: {chunks} chunks vs {vectors} vectors")]
    CorpusMisaligned {
        /// Chunk table length.
        chunks: usize,
        /// Vector array length.
        vectors: usize,
    },

    /// A query cannot be answered: empty corpus or vector dimension mismatch.
    ///
    /// Scoped to the single query; corpus state is unaffected.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The injected embedding capability failed or misbehaved.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// The injected pairwise scoring capability failed or misbehaved.
    #[error("scoring error: {0}")]
    Scoring(String),

    /// A configuration validation error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O failure while reading or writing library artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot could not be serialized or deserialized.
    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A convenience result type for library operations.
pub type Result<T> = std::result::Result<T, LibraryError>;
