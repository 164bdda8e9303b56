//! Incremental corpus merge with an atomic commit protocol.
//!
//! Adding documents to an existing library works by assembling the new
//! batch into a candidate table, reducing it to the rows the library does
//! not already hold (the delta), embedding only that delta, and then
//! committing the union as a fresh snapshot. The commit order is fixed:
//! write the combined snapshot first, then delete the two prior snapshot
//! files. A crash mid-commit leaves at worst an orphaned new file, never
//! data loss.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::corpus::Corpus;
use crate::document::Chunk;
use crate::error::{LibraryError, Result};
use crate::snapshot::{self, SnapshotKind};

/// The delta between an existing corpus and a candidate chunk table.
#[derive(Debug, Clone)]
pub struct DeltaSelection {
    /// Candidate rows the existing corpus does not already hold, in
    /// candidate table order. These are the rows that still need embedding.
    pub delta: Vec<Chunk>,
    /// Row indices of the existing corpus that survive the union. All of
    /// them unless the collision rule prefers candidate copies.
    pub retained_existing: Vec<usize>,
    /// Number of exact dedup-key collisions between the two tables.
    pub duplicates: usize,
}

/// Split a candidate table into new rows and collision survivors.
///
/// On an exact dedup-key collision, `prefer_existing` keeps the existing
/// corpus's copy and drops the candidate row; otherwise the candidate copy
/// wins and the colliding existing row is dropped from the union. Either
/// way the union ends up with `existing + candidate - duplicates` rows.
pub fn select_delta(
    existing: &Corpus,
    candidate: Vec<Chunk>,
    prefer_existing: bool,
) -> DeltaSelection {
    let existing_keys: HashSet<_> = existing.chunks.iter().map(Chunk::dedup_key).collect();

    if prefer_existing {
        let before = candidate.len();
        let delta: Vec<Chunk> = candidate
            .into_iter()
            .filter(|chunk| !existing_keys.contains(&chunk.dedup_key()))
            .collect();
        let duplicates = before - delta.len();
        DeltaSelection {
            delta,
            retained_existing: (0..existing.len()).collect(),
            duplicates,
        }
    } else {
        let candidate_keys: HashSet<_> = candidate.iter().map(Chunk::dedup_key).collect();
        let retained_existing: Vec<usize> = (0..existing.len())
            .filter(|&i| !candidate_keys.contains(&existing.chunks[i].dedup_key()))
            .collect();
        let duplicates = existing.len() - retained_existing.len();
        DeltaSelection { delta: candidate, retained_existing, duplicates }
    }
}

/// Keep only the selected rows of a corpus, permuting chunks and vectors
/// together.
pub fn retain_rows(corpus: Corpus, rows: &[usize]) -> Corpus {
    if rows.len() == corpus.len() {
        return corpus;
    }
    let Corpus { chunks, vectors } = corpus;
    let mut kept_chunks = Vec::with_capacity(rows.len());
    let mut kept_vectors = Vec::with_capacity(rows.len());
    let mut chunks: Vec<Option<Chunk>> = chunks.into_iter().map(Some).collect();
    let mut vectors: Vec<Option<Vec<f32>>> = vectors.into_iter().map(Some).collect();
    for &row in rows {
        if let (Some(chunk), Some(vector)) = (chunks[row].take(), vectors[row].take()) {
            kept_chunks.push(chunk);
            kept_vectors.push(vector);
        }
    }
    Corpus { chunks: kept_chunks, vectors: kept_vectors }
}

/// The result of a successful merge commit.
#[derive(Debug)]
pub struct MergeOutcome {
    /// The combined corpus, now the library's sole committed state.
    pub corpus: Corpus,
    /// Path of the newly written combined snapshot.
    pub path: PathBuf,
    /// Number of chunks contributed by the candidate batch.
    pub added_chunks: usize,
}

/// Union an existing corpus with an embedded delta and commit the result.
///
/// The integrity check runs before any file operation: the combined chunk
/// and vector counts must equal the arithmetic sums of the two inputs'
/// lengths, and the union must be aligned. On failure nothing is written
/// or deleted. On success the combined snapshot is written first, then the
/// two prior snapshot files are removed.
///
/// # Errors
///
/// Returns [`LibraryError::MergeIntegrity`] when the counts disagree.
pub fn commit(
    existing: Corpus,
    existing_path: &Path,
    delta: Corpus,
    delta_path: &Path,
    dir: &Path,
) -> Result<MergeOutcome> {
    let expected_chunks = existing.chunks.len() + delta.chunks.len();
    let expected_vectors = existing.vectors.len() + delta.vectors.len();
    let added_chunks = delta.chunks.len();

    let mut chunks = existing.chunks;
    let mut vectors = existing.vectors;
    chunks.extend(delta.chunks);
    vectors.extend(delta.vectors);

    if chunks.len() != expected_chunks
        || vectors.len() != expected_vectors
        || chunks.len() != vectors.len()
    {
        return Err(LibraryError::MergeIntegrity {
            expected_chunks,
            actual_chunks: chunks.len(),
            expected_vectors,
            actual_vectors: vectors.len(),
        });
    }
    info!(
        chunks = chunks.len(),
        added = added_chunks,
        "combined corpus lengths match expectations; proceeding with commit"
    );

    let corpus = Corpus { chunks, vectors };
    let path = snapshot::save(&corpus, dir, SnapshotKind::Combined)?;

    // New snapshot is durable; only now retire the inputs.
    for old in [existing_path, delta_path] {
        if old.exists() {
            fs::remove_file(old)?;
            info!(path = %old.display(), "deleted superseded snapshot");
        } else {
            warn!(path = %old.display(), "superseded snapshot already missing");
        }
    }

    Ok(MergeOutcome { corpus, path, added_chunks })
}
