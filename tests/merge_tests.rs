//! Incremental merge, snapshot round-trips, and the commit protocol.

mod common;

use std::sync::Arc;

use common::{StubEmbedder, StubScorer, document};
use semdex::config::LibraryConfig;
use semdex::corpus::Corpus;
use semdex::document::{Chunk, ExtractionOutcome};
use semdex::error::LibraryError;
use semdex::merge;
use semdex::pipeline::Library;
use semdex::snapshot::{self, SnapshotKind};
use tempfile::TempDir;

const ONE: &str = "Paragraph one talks at length about the restoration of the east wing \
                   after the nineteen twenty fire damaged most of its interior.";
const TWO: &str = "Paragraph two covers the archival photographs recovered from the \
                   basement and their subsequent cataloguing by volunteers.";
const THREE: &str = "Paragraph three is entirely new material describing the garden \
                     terraces added during the most recent restoration campaign.";

fn library(dir: &TempDir) -> Library {
    let config = LibraryConfig::builder()
        .max_chunk_len(400)
        .min_chunk_len(30)
        .top_k(5)
        .build()
        .unwrap();
    Library::builder()
        .config(config)
        .embedder(Arc::new(StubEmbedder::new(16)))
        .scorer(Arc::new(StubScorer::neutral()))
        .library_dir(dir.path().join("encoded"))
        .log_dir(dir.path().join("logs"))
        .build()
        .unwrap()
}

fn doc_batch(name: &str, paragraphs: &[&str]) -> Vec<ExtractionOutcome> {
    paragraphs
        .iter()
        .enumerate()
        .map(|(i, text)| {
            // Fixed metadata so identical paragraphs collide on the dedup
            // key across batches even though file names differ.
            ExtractionOutcome::Document(document(
                &format!("{name}{i}.pdf"),
                Some("Archive"),
                &[("1", text)],
            ))
        })
        .collect()
}

#[tokio::test]
async fn extend_unions_minus_duplicates_and_retires_old_snapshots() {
    let dir = TempDir::new().unwrap();
    let library = library(&dir);

    let first = library.ingest(&doc_batch("first", &[ONE, TWO])).await.unwrap();
    assert_eq!(first.corpus.len(), 2);

    // Second batch: one duplicate paragraph, one genuinely new.
    let second_batch = doc_batch("second", &[TWO, THREE]);
    let merged =
        library.extend(first.corpus, &first.snapshot_path, &second_batch).await.unwrap();

    // existing + candidate - duplicates = 2 + 2 - 1.
    assert_eq!(merged.corpus.len(), 3);
    merged.corpus.validate_alignment().unwrap();
    assert_eq!(merged.report.chunks_indexed, 1);
    // The report counts what this run added, not the combined library.
    assert_eq!(merged.report.documents_indexed, 1);
    let log = std::fs::read_to_string(&merged.log_path).unwrap();
    assert!(log.contains("successfully added to library (duplicates removed): 1"));

    // Write-new-then-delete-old: only the combined snapshot remains.
    assert!(merged.snapshot_path.exists());
    assert!(!first.snapshot_path.exists());
    let remaining = snapshot::list(&dir.path().join("encoded")).unwrap();
    assert_eq!(remaining, vec![merged.snapshot_path.clone()]);

    // The duplicate kept the existing copy's provenance.
    let dup = merged.corpus.chunks.iter().find(|c| c.content.starts_with("Paragraph two")).unwrap();
    assert!(dup.file_name.starts_with("first"));
}

#[tokio::test]
async fn candidate_collision_copy_can_be_preferred() {
    let dir = TempDir::new().unwrap();
    let config = LibraryConfig::builder()
        .max_chunk_len(400)
        .min_chunk_len(30)
        .prefer_existing_on_collision(false)
        .build()
        .unwrap();
    let library = Library::builder()
        .config(config)
        .embedder(Arc::new(StubEmbedder::new(16)))
        .scorer(Arc::new(StubScorer::neutral()))
        .library_dir(dir.path().join("encoded"))
        .build()
        .unwrap();

    let first = library.ingest(&doc_batch("first", &[ONE, TWO])).await.unwrap();
    let merged = library
        .extend(first.corpus, &first.snapshot_path, &doc_batch("second", &[TWO, THREE]))
        .await
        .unwrap();

    assert_eq!(merged.corpus.len(), 3);
    let dup = merged.corpus.chunks.iter().find(|c| c.content.starts_with("Paragraph two")).unwrap();
    assert!(dup.file_name.starts_with("second"));
}

#[tokio::test]
async fn fully_duplicate_batch_is_no_new_content() {
    let dir = TempDir::new().unwrap();
    let library = library(&dir);

    let first = library.ingest(&doc_batch("first", &[ONE, TWO])).await.unwrap();
    let err = library
        .extend(first.corpus.clone(), &first.snapshot_path, &doc_batch("again", &[ONE, TWO]))
        .await
        .unwrap_err();

    assert!(matches!(err, LibraryError::NoNewContent));
    // The existing snapshot is untouched.
    assert!(first.snapshot_path.exists());
}

#[tokio::test]
async fn integrity_failure_aborts_before_any_file_operation() {
    let dir = TempDir::new().unwrap();
    let encoded = dir.path().join("encoded");

    fn chunk(content: &str) -> Chunk {
        Chunk {
            file_name: "doc.pdf".to_string(),
            file_path: "/docs/doc.pdf".to_string(),
            title: None,
            author: None,
            subject: None,
            keywords: None,
            page_label: "1".to_string(),
            content: content.to_string(),
            split_origin: false,
        }
    }

    let existing = Corpus::new(vec![chunk("kept row")], vec![vec![1.0]]).unwrap();
    let existing_path = snapshot::save(&existing, &encoded, SnapshotKind::Library).unwrap();
    // A corrupt delta: two chunks but only one vector.
    let delta = Corpus { chunks: vec![chunk("row a"), chunk("row b")], vectors: vec![vec![2.0]] };
    let delta_path = snapshot::save(&existing, &encoded, SnapshotKind::Library).unwrap();

    let err = merge::commit(existing, &existing_path, delta, &delta_path, &encoded).unwrap_err();
    assert!(matches!(err, LibraryError::MergeIntegrity { .. }));

    // No destructive action was taken: both inputs remain, no combined
    // snapshot was written.
    assert!(existing_path.exists());
    assert!(delta_path.exists());
    let names: Vec<String> = snapshot::list(&encoded)
        .unwrap()
        .into_iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.iter().all(|n| n.starts_with("library-")));
}

#[tokio::test]
async fn snapshots_round_trip() {
    let dir = TempDir::new().unwrap();
    let library = library(&dir);

    let ingestion = library.ingest(&doc_batch("first", &[ONE, TWO])).await.unwrap();
    let reloaded = library.load(&ingestion.snapshot_path).unwrap();

    assert_eq!(reloaded, ingestion.corpus);
    assert_eq!(library.latest_snapshot().unwrap(), Some(ingestion.snapshot_path));
}
