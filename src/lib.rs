//! Semantic document library: bounded-size chunking, incremental corpus
//! merging, and two-stage retrieval.
//!
//! This crate turns raw per-page extracted text into a deduplicated,
//! size-bounded chunk table with row-aligned embedding vectors, and
//! answers queries with dot-product candidate selection followed by
//! pairwise re-ranking. It provides:
//!
//! - page text normalization (dehyphenation, line-break collapsing with
//!   linguistic exceptions)
//! - chunk length enforcement: sentence-boundary splitting above a maximum
//!   length, neighbor merging below a minimum length
//! - corpus assembly with metadata+content deduplication and an
//!   [`EmptyCorpus`](LibraryError::EmptyCorpus) signal
//! - timestamped `.semdex` snapshot persistence
//! - incremental merge of a new batch into an existing corpus with an
//!   integrity check and a write-new-then-delete-old commit protocol
//! - two-stage retrieval over injected [`Embedder`] / [`PairScorer`]
//!   capabilities, with markdown-safe result formatting and a one-shot
//!   low-relevance warning
//!
//! The embedding model and cross-scorer are supplied by the caller; the
//! crate depends on no model family. Queries borrow a loaded [`Corpus`]
//! immutably, so concurrent searches need no locking, and a merge commit
//! hands back a fresh corpus to swap in with a single assignment.

pub mod assemble;
pub mod chunking;
pub mod config;
pub mod corpus;
pub mod document;
pub mod embedding;
pub mod error;
pub mod format;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod retrieve;
pub mod snapshot;

pub use assemble::{Assembly, assemble};
pub use chunking::{merge_undersized, split_oversized};
pub use config::{LibraryConfig, LibraryConfigBuilder};
pub use corpus::Corpus;
pub use document::{Chunk, DedupKey, ExtractedDocument, ExtractionOutcome, Page};
pub use embedding::{Embedder, PairScorer};
pub use error::{LibraryError, Result};
pub use format::{FormattedResult, MISSING_FILE_LOCATOR, escape_markup, render_markdown};
pub use merge::{DeltaSelection, MergeOutcome};
pub use normalize::{normalize_page_label, normalize_page_text};
pub use pipeline::{Ingestion, Library, LibraryBuilder};
pub use report::IngestReport;
pub use retrieve::{Hit, RankedHit, top_k};
pub use snapshot::{SNAPSHOT_EXTENSION, SnapshotKind};
