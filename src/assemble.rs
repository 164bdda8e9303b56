//! Corpus assembly: from extracted documents to a final chunk table.

use std::collections::HashSet;

use tracing::warn;

use crate::chunking::{merge_undersized, split_oversized};
use crate::config::LibraryConfig;
use crate::document::{Chunk, ExtractedDocument};
use crate::error::{LibraryError, Result};
use crate::normalize::{normalize_page_label, normalize_page_text};

/// The assembled chunk table plus per-document warnings.
#[derive(Debug, Clone)]
pub struct Assembly {
    /// Ordered, deduplicated, size-bounded chunk table.
    pub table: Vec<Chunk>,
    /// File paths of documents that yielded no text at all.
    pub no_text: Vec<String>,
}

/// Build the final chunk table from a batch of extracted documents.
///
/// Per document: pages are normalized, split into paragraph candidates on
/// line breaks, paragraphs over the maximum length are force-split on
/// sentence boundaries, and the document's candidate list is run through
/// the undersized-chunk merge pass. Neighbor lookups for that pass use the
/// per-document list, before any global reordering.
///
/// Across documents: empty rows are dropped, exact duplicates by the dedup
/// key keep their first occurrence in table order, and the final table is
/// stable-sorted by file name ascending with a dense 0-based index (row
/// position). Split-origin flags never survive assembly.
///
/// # Errors
///
/// Returns [`LibraryError::EmptyCorpus`] when no chunks survive filtering.
pub fn assemble(documents: &[ExtractedDocument], config: &LibraryConfig) -> Result<Assembly> {
    let mut table = Vec::new();
    let mut no_text = Vec::new();

    for document in documents {
        let mut doc_chunks = collect_document_chunks(document, config.max_chunk_len);
        merge_undersized(&mut doc_chunks, config.min_chunk_len);

        if doc_chunks.is_empty() {
            warn!(path = %document.file_path, "no text found in document; is it machine-readable?");
            no_text.push(document.file_path.clone());
        } else {
            table.extend(doc_chunks);
        }
    }

    // Merge reconciliation is done; the flag is meaningless from here on.
    for chunk in &mut table {
        chunk.split_origin = false;
    }

    let mut seen = HashSet::new();
    table.retain(|chunk| seen.insert(chunk.dedup_key()));

    table.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    if table.is_empty() {
        return Err(LibraryError::EmptyCorpus);
    }

    Ok(Assembly { table, no_text })
}

/// One document's paragraph candidates, normalized and length-bounded, in
/// page order. Empty candidates are kept here so the merge pass sees the
/// same neighbor structure the raw text had; they are dropped by its
/// post-pass.
fn collect_document_chunks(document: &ExtractedDocument, max_len: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();

    for page in &document.pages {
        let text = normalize_page_text(&page.text);
        let label = normalize_page_label(&page.label);

        for paragraph in text.split('\n') {
            let paragraph = paragraph.trim();
            if paragraph.chars().count() > max_len {
                for piece in split_oversized(paragraph, max_len) {
                    chunks.push(make_chunk(document, &label, piece, true));
                }
            } else {
                chunks.push(make_chunk(document, &label, paragraph.to_string(), false));
            }
        }
    }

    chunks
}

fn make_chunk(
    document: &ExtractedDocument,
    page_label: &str,
    content: String,
    split_origin: bool,
) -> Chunk {
    Chunk {
        file_name: document.file_name.clone(),
        file_path: document.file_path.clone(),
        title: document.title.clone(),
        author: document.author.clone(),
        subject: document.subject.clone(),
        keywords: document.keywords.clone(),
        page_label: page_label.to_string(),
        content,
        split_origin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Page;

    fn doc(name: &str, pages: Vec<Page>) -> ExtractedDocument {
        ExtractedDocument {
            file_path: format!("/docs/{name}"),
            file_name: name.to_string(),
            title: Some("Title".to_string()),
            author: None,
            subject: None,
            keywords: None,
            pages,
        }
    }

    fn page(label: &str, text: &str) -> Page {
        Page { label: label.to_string(), text: text.to_string() }
    }

    fn small_config() -> LibraryConfig {
        LibraryConfig::builder()
            .max_chunk_len(60)
            .min_chunk_len(10)
            .build()
            .unwrap()
    }

    #[test]
    fn assembles_sorted_deduplicated_table() {
        let paragraph = "A paragraph of reasonable length for the test corpus.";
        let docs = vec![
            doc("b.pdf", vec![page("1", paragraph)]),
            doc("a.pdf", vec![page("1", paragraph), page("1", paragraph)]),
        ];
        let assembly = assemble(&docs, &small_config()).unwrap();

        // Page-level duplicate within a.pdf collapses; the b.pdf copy shares
        // the same dedup key (file identity is excluded) so one row survives
        // per distinct key.
        assert_eq!(assembly.table.len(), 1);
        assert!(assembly.no_text.is_empty());
    }

    #[test]
    fn keeps_first_occurrence_in_table_order() {
        let paragraph = "A paragraph of reasonable length for the test corpus.";
        let docs = vec![
            doc("b.pdf", vec![page("1", paragraph)]),
            doc("a.pdf", vec![page("2", paragraph)]),
        ];
        let assembly = assemble(&docs, &small_config()).unwrap();
        assert_eq!(assembly.table.len(), 2);
        // Sorted by file name after dedup.
        assert_eq!(assembly.table[0].file_name, "a.pdf");
        assert_eq!(assembly.table[1].file_name, "b.pdf");
    }

    #[test]
    fn oversized_paragraphs_are_bounded() {
        let long = "A sentence that keeps going. ".repeat(10);
        let docs = vec![doc("a.pdf", vec![page("1", &long)])];
        let assembly = assemble(&docs, &small_config()).unwrap();
        assert!(assembly.table.len() > 1);
        for chunk in &assembly.table {
            assert!(chunk.content_len() <= 60);
            assert!(!chunk.split_origin);
            assert!(!chunk.content.is_empty());
        }
    }

    #[test]
    fn blank_document_is_reported_not_fatal() {
        let paragraph = "A paragraph of reasonable length for the test corpus.";
        let docs = vec![
            doc("a.pdf", vec![page("1", paragraph)]),
            doc("blank.pdf", vec![page("1", "   \n  ")]),
        ];
        let assembly = assemble(&docs, &small_config()).unwrap();
        assert_eq!(assembly.no_text, vec!["/docs/blank.pdf".to_string()]);
        assert_eq!(assembly.table.len(), 1);
    }

    #[test]
    fn all_blank_input_is_an_empty_corpus() {
        let docs = vec![doc("blank.pdf", vec![page("1", " ")])];
        let err = assemble(&docs, &small_config()).unwrap_err();
        assert!(matches!(err, LibraryError::EmptyCorpus));
    }
}
