//! Corpus snapshot persistence.
//!
//! A snapshot is a serialized [`Corpus`] written under a library directory
//! with a timestamped name and a dedicated `.semdex` extension, so library
//! artifacts are never confused with any other file type. Loading a
//! snapshot re-validates the chunk/vector alignment invariant.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::Local;
use tracing::info;

use crate::corpus::Corpus;
use crate::error::Result;

/// File extension identifying corpus snapshots.
pub const SNAPSHOT_EXTENSION: &str = "semdex";

/// Names the origin of a snapshot file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    /// A corpus assembled from a fresh ingestion batch.
    Library,
    /// A corpus produced by an incremental merge commit.
    Combined,
}

impl SnapshotKind {
    fn prefix(self) -> &'static str {
        match self {
            SnapshotKind::Library => "library",
            SnapshotKind::Combined => "combined",
        }
    }
}

/// Write `corpus` to a fresh timestamped snapshot file under `dir`.
///
/// Creates `dir` if needed and returns the path written.
pub fn save(corpus: &Corpus, dir: &Path, kind: SnapshotKind) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let stamp = Local::now().format("%Y%m%d%H%M%S").to_string();
    let mut path = dir.join(format!("{}-{stamp}.{SNAPSHOT_EXTENSION}", kind.prefix()));
    // Timestamps have second resolution; never clobber an earlier snapshot.
    let mut attempt = 1;
    while path.exists() {
        attempt += 1;
        path = dir.join(format!("{}-{stamp}-{attempt}.{SNAPSHOT_EXTENSION}", kind.prefix()));
    }

    let file = File::create(&path)?;
    serde_json::to_writer(BufWriter::new(file), corpus)?;

    info!(
        path = %path.display(),
        chunks = corpus.len(),
        documents = corpus.document_count(),
        "saved corpus snapshot"
    );
    Ok(path)
}

/// Load a snapshot, reconstructing the corpus and re-checking alignment.
pub fn load(path: &Path) -> Result<Corpus> {
    let file = File::open(path)?;
    let corpus: Corpus = serde_json::from_reader(BufReader::new(file))?;
    corpus.validate_alignment()?;
    Ok(corpus)
}

/// All snapshot files under `dir`, sorted by file name.
pub fn list(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut snapshots = Vec::new();
    if !dir.exists() {
        return Ok(snapshots);
    }
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == SNAPSHOT_EXTENSION) {
            snapshots.push(path);
        }
    }
    snapshots.sort();
    Ok(snapshots)
}

/// The most recently written snapshot under `dir`, if any.
///
/// Ordered by modification time, not name; a combined snapshot written
/// after a library snapshot sorts behind it alphabetically but is still
/// the latest.
pub fn latest(dir: &Path) -> Result<Option<PathBuf>> {
    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for path in list(dir)? {
        let modified = fs::metadata(&path)?.modified()?;
        if newest.as_ref().is_none_or(|(at, _)| modified >= *at) {
            newest = Some((modified, path));
        }
    }
    Ok(newest.map(|(_, path)| path))
}
