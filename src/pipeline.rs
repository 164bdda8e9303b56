//! The library orchestrator: ingest, incremental extend, and search.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info};

use crate::assemble::{self, Assembly};
use crate::config::LibraryConfig;
use crate::corpus::Corpus;
use crate::document::{Chunk, ExtractedDocument, ExtractionOutcome};
use crate::embedding::{Embedder, PairScorer};
use crate::error::{LibraryError, Result};
use crate::format::{self, FormattedResult};
use crate::merge;
use crate::report::IngestReport;
use crate::retrieve;
use crate::snapshot::{self, SnapshotKind};

/// The result of an ingest or extend run.
#[derive(Debug)]
pub struct Ingestion {
    /// The committed corpus. Replaces any previously loaded corpus
    /// wholesale; swapping it in is a single assignment on the caller's
    /// side.
    pub corpus: Corpus,
    /// Path of the committed snapshot.
    pub snapshot_path: PathBuf,
    /// Per-run summary.
    pub report: IngestReport,
    /// Path of the written log file.
    pub log_path: PathBuf,
}

/// Orchestrates the chunking/merge pipeline and two-stage retrieval.
///
/// Holds the configuration, the two injected ML capabilities, and the
/// directories where snapshots and logs live. Construct one via
/// [`Library::builder()`].
///
/// # Example
///
/// ```rust,ignore
/// use semdex::{Library, LibraryConfig};
///
/// let library = Library::builder()
///     .config(LibraryConfig::default())
///     .embedder(Arc::new(my_embedder))
///     .scorer(Arc::new(my_cross_scorer))
///     .library_dir("encoded-libraries")
///     .build()?;
///
/// let ingestion = library.ingest(&batch).await?;
/// let results = library.search(&ingestion.corpus, "query text").await?;
/// ```
pub struct Library {
    config: LibraryConfig,
    embedder: Arc<dyn Embedder>,
    scorer: Arc<dyn PairScorer>,
    library_dir: PathBuf,
    log_dir: PathBuf,
}

impl Library {
    /// Create a new [`LibraryBuilder`].
    pub fn builder() -> LibraryBuilder {
        LibraryBuilder::default()
    }

    /// Return a reference to the configuration.
    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    /// Directory where corpus snapshots are written.
    pub fn library_dir(&self) -> &Path {
        &self.library_dir
    }

    /// Load a previously committed snapshot.
    pub fn load(&self, path: &Path) -> Result<Corpus> {
        snapshot::load(path)
    }

    /// Path of the most recently committed snapshot, if any.
    pub fn latest_snapshot(&self) -> Result<Option<PathBuf>> {
        snapshot::latest(&self.library_dir)
    }

    /// Ingest a fresh batch: assemble, embed, persist, and log.
    ///
    /// Extraction failures in the batch are isolated and counted; they
    /// never abort the run.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::EmptyCorpus`] when no chunks survive
    /// assembly, and propagates embedding and I/O failures. Nothing is
    /// persisted when assembly or embedding fails; once the snapshot is
    /// written it stays on disk even if the log write then fails.
    pub async fn ingest(&self, batch: &[ExtractionOutcome]) -> Result<Ingestion> {
        let (documents, failures) = partition_batch(batch);
        let mut assembly = assemble::assemble(&documents, &self.config)?;

        let vectors = self.embed_table(&assembly.table).await?;
        let corpus = Corpus::new(std::mem::take(&mut assembly.table), vectors)?;
        let snapshot_path = snapshot::save(&corpus, &self.library_dir, SnapshotKind::Library)?;

        let report = self.build_report(
            batch.len(),
            &assembly,
            failures,
            corpus.document_count(),
            corpus.len(),
            &snapshot_path,
        );
        let log_path = report.write(&self.log_dir)?;
        info!(
            documents = report.documents_indexed,
            chunks = report.chunks_indexed,
            warnings = report.has_warnings(),
            "ingestion complete"
        );

        Ok(Ingestion { corpus, snapshot_path, report, log_path })
    }

    /// Extend an existing library with a new batch.
    ///
    /// Assembles the batch into a candidate table, reduces it to the rows
    /// the existing corpus does not already hold, embeds only that delta,
    /// and commits the union under a fresh snapshot (write new, then
    /// delete both prior snapshot files). The existing corpus is consumed;
    /// the returned corpus replaces it wholesale.
    ///
    /// No query should read the existing corpus while the commit is in
    /// flight; callers keep a single owned corpus value and swap it for
    /// the returned one.
    ///
    /// # Errors
    ///
    /// [`LibraryError::EmptyCorpus`] when the batch yields no chunks at
    /// all, [`LibraryError::NoNewContent`] when every candidate row
    /// duplicates the existing corpus, [`LibraryError::MergeIntegrity`]
    /// when the pre-commit count check fails (in which case no file has
    /// been written or deleted).
    pub async fn extend(
        &self,
        existing: Corpus,
        existing_path: &Path,
        batch: &[ExtractionOutcome],
    ) -> Result<Ingestion> {
        let (documents, failures) = partition_batch(batch);
        let assembly = assemble::assemble(&documents, &self.config)?;

        let selection = merge::select_delta(
            &existing,
            assembly.table.clone(),
            self.config.prefer_existing_on_collision,
        );
        if selection.delta.is_empty() {
            return Err(LibraryError::NoNewContent);
        }
        info!(
            new_chunks = selection.delta.len(),
            duplicates = selection.duplicates,
            "candidate batch reduced to new content"
        );

        let vectors = self.embed_table(&selection.delta).await?;
        let delta = Corpus::new(selection.delta, vectors)?;
        let documents_added = delta.document_count();
        let delta_path = snapshot::save(&delta, &self.library_dir, SnapshotKind::Library)?;

        let existing = merge::retain_rows(existing, &selection.retained_existing);
        let outcome =
            merge::commit(existing, existing_path, delta, &delta_path, &self.library_dir)?;

        // The log line reads "added to library": count the new batch's
        // contribution, not the whole combined table.
        let report = self.build_report(
            batch.len(),
            &assembly,
            failures,
            documents_added,
            outcome.added_chunks,
            &outcome.path,
        );
        let log_path = report.write(&self.log_dir)?;
        info!(
            added_chunks = outcome.added_chunks,
            total_chunks = outcome.corpus.len(),
            "incremental merge committed"
        );

        Ok(Ingestion {
            corpus: outcome.corpus,
            snapshot_path: outcome.path,
            report,
            log_path,
        })
    }

    /// Answer a query against a loaded corpus, retrieving the configured
    /// `top_k` first-stage candidates.
    pub async fn search(&self, corpus: &Corpus, query: &str) -> Result<Vec<FormattedResult>> {
        self.search_with_k(corpus, query, self.config.top_k).await
    }

    /// Answer a query with an explicit first-stage candidate count,
    /// overriding the configured `top_k`.
    ///
    /// Embeds the query, selects `min(k_req, corpus len)` candidates by
    /// dot product, re-scores them with the pairwise scorer, and returns
    /// formatted results in final rank order. Failures are scoped to this
    /// query; the corpus is untouched.
    pub async fn search_with_k(
        &self,
        corpus: &Corpus,
        query: &str,
        k_req: usize,
    ) -> Result<Vec<FormattedResult>> {
        let query_vector = self.embedder.embed(query).await.map_err(|e| {
            error!(error = %e, "query embedding failed");
            e
        })?;
        let hits = retrieve::top_k(&query_vector, corpus, k_req)?;
        let ranked = retrieve::rerank(self.scorer.as_ref(), query, corpus, &hits).await?;
        info!(results = ranked.len(), "query completed");
        Ok(format::format_results(corpus, &ranked))
    }

    /// Render formatted results as a markdown block, with the one-shot
    /// low-relevance banner at the configured threshold.
    pub fn render(&self, results: &[FormattedResult]) -> String {
        format::render_markdown(results, self.config.relevance_threshold)
    }

    async fn embed_table(&self, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>> {
        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let vectors = self.embedder.embed_batch(&texts).await.map_err(|e| {
            error!(error = %e, chunks = texts.len(), "embedding failed during ingestion");
            e
        })?;
        if vectors.len() != texts.len() {
            return Err(LibraryError::Embedding(format!(
                "embedder returned {} vectors for {} texts",
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors)
    }

    fn build_report(
        &self,
        total_documents: usize,
        assembly: &Assembly,
        failures: Vec<(String, String)>,
        documents_indexed: usize,
        chunks_indexed: usize,
        snapshot_path: &Path,
    ) -> IngestReport {
        IngestReport {
            total_documents,
            no_text_documents: assembly.no_text.clone(),
            failed_documents: failures,
            documents_indexed,
            chunks_indexed,
            snapshot_path: snapshot_path.to_path_buf(),
        }
    }
}

fn partition_batch(batch: &[ExtractionOutcome]) -> (Vec<ExtractedDocument>, Vec<(String, String)>) {
    let mut documents = Vec::new();
    let mut failures = Vec::new();
    for outcome in batch {
        match outcome {
            ExtractionOutcome::Document(document) => documents.push(document.clone()),
            ExtractionOutcome::Failed { path, message } => {
                error!(path = %path, message = %message, "could not extract text from document");
                failures.push((path.clone(), message.clone()));
            }
        }
    }
    (documents, failures)
}

/// Builder for constructing a [`Library`].
///
/// The embedder, scorer, and library directory are required; the log
/// directory defaults to `<library_dir>/logs` and the configuration to
/// [`LibraryConfig::default()`].
#[derive(Default)]
pub struct LibraryBuilder {
    config: Option<LibraryConfig>,
    embedder: Option<Arc<dyn Embedder>>,
    scorer: Option<Arc<dyn PairScorer>>,
    library_dir: Option<PathBuf>,
    log_dir: Option<PathBuf>,
}

impl LibraryBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: LibraryConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding capability.
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the pairwise scoring capability.
    pub fn scorer(mut self, scorer: Arc<dyn PairScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    /// Set the directory where corpus snapshots are kept.
    pub fn library_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.library_dir = Some(dir.into());
        self
    }

    /// Set the directory where ingest logs are written.
    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Build the [`Library`], validating that all required parts are set.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Config`] if a required part is missing.
    pub fn build(self) -> Result<Library> {
        let config = self.config.unwrap_or_default();
        let embedder = self
            .embedder
            .ok_or_else(|| LibraryError::Config("embedder is required".to_string()))?;
        let scorer =
            self.scorer.ok_or_else(|| LibraryError::Config("scorer is required".to_string()))?;
        let library_dir = self
            .library_dir
            .ok_or_else(|| LibraryError::Config("library_dir is required".to_string()))?;
        let log_dir = self.log_dir.unwrap_or_else(|| library_dir.join("logs"));

        Ok(Library { config, embedder, scorer, library_dir, log_dir })
    }
}
