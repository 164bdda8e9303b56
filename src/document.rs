//! Data types for extracted documents, pages, and chunks.

use serde::{Deserialize, Serialize};

/// One page of extracted text, as supplied by the extraction collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    /// Printed page label, or a 1-based index fallback when the document
    /// carries no labels.
    pub label: String,
    /// Raw extracted text for this page.
    pub text: String,
}

/// A source document with its metadata and extracted pages.
///
/// Exists only during ingestion; its fields are denormalized onto each
/// [`Chunk`] before persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractedDocument {
    /// Full path of the source file. Also the document's identity.
    pub file_path: String,
    /// Display name (usually the file name component of `file_path`).
    pub file_name: String,
    /// Title from document metadata, if available.
    pub title: Option<String>,
    /// Author from document metadata, if available.
    pub author: Option<String>,
    /// Subject from document metadata, if available.
    pub subject: Option<String>,
    /// Keywords from document metadata, if available.
    pub keywords: Option<String>,
    /// The document's pages in order.
    pub pages: Vec<Page>,
}

/// The per-document result of the extraction collaborator.
///
/// Extraction failures are data, not control flow: a failed document is
/// recorded in the ingest report and never aborts the batch.
#[derive(Debug, Clone)]
pub enum ExtractionOutcome {
    /// The document was extracted successfully.
    Document(ExtractedDocument),
    /// Extraction failed; the document is skipped.
    Failed {
        /// Path of the document that could not be read.
        path: String,
        /// A description of the failure.
        message: String,
    },
}

/// The unit of retrieval: a bounded-length block of document text with
/// denormalized provenance metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Display name of the source file.
    pub file_name: String,
    /// Full path of the source file.
    pub file_path: String,
    /// Title from document metadata, if available.
    pub title: Option<String>,
    /// Author from document metadata, if available.
    pub author: Option<String>,
    /// Subject from document metadata, if available.
    pub subject: Option<String>,
    /// Keywords from document metadata, if available.
    pub keywords: Option<String>,
    /// Label of the page this chunk came from.
    pub page_label: String,
    /// The chunk's text content. Never empty once persisted.
    pub content: String,
    /// Marks a chunk produced by forced length-splitting that has not yet
    /// been reconciled by the undersized-chunk merge pass. Transient:
    /// cleared before a chunk table is finalized, never persisted.
    #[serde(skip, default)]
    pub split_origin: bool,
}

impl Chunk {
    /// The tuple used to detect duplicate chunks within and across
    /// ingestion runs. Missing metadata values are distinct from any
    /// present value, not wildcards. File name and path are deliberately
    /// excluded so the same document stored under two paths dedups to one.
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            title: self.title.clone(),
            author: self.author.clone(),
            subject: self.subject.clone(),
            keywords: self.keywords.clone(),
            page_label: self.page_label.clone(),
            content: self.content.clone(),
        }
    }

    /// Content length in characters (the unit all chunk-size contracts use).
    pub fn content_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// Owned duplicate-detection key for a [`Chunk`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    title: Option<String>,
    author: Option<String>,
    subject: Option<String>,
    keywords: Option<String>,
    page_label: String,
    content: String,
}
