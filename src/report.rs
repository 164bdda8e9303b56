//! Per-run ingest summary log.
//!
//! One plain-text, human-readable summary is written per ingestion run:
//! document counts, extraction failures, and where the snapshot landed.
//! Write-once; nothing in the library parses it back.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::Result;

/// Summary of one ingestion run.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Total documents presented by the extraction collaborator.
    pub total_documents: usize,
    /// File paths of documents that yielded no machine-readable text.
    pub no_text_documents: Vec<String>,
    /// (path, message) for documents whose extraction failed outright.
    pub failed_documents: Vec<(String, String)>,
    /// Distinct documents this run added to the library.
    pub documents_indexed: usize,
    /// Chunks this run added to the library.
    pub chunks_indexed: usize,
    /// Where the resulting snapshot was written.
    pub snapshot_path: PathBuf,
}

impl IngestReport {
    /// `true` when any document was blank or failed to extract.
    pub fn has_warnings(&self) -> bool {
        !self.no_text_documents.is_empty() || !self.failed_documents.is_empty()
    }

    /// Render the human-readable summary.
    pub fn render(&self) -> String {
        let mut errors = String::new();
        for (path, message) in &self.failed_documents {
            errors.push_str(&format!("An error occurred while extracting text from {path}: {message}\n"));
        }
        for path in &self.no_text_documents {
            errors.push_str(&format!("Warning: No text was found in {path}. Is it machine-readable?\n"));
        }

        format!(
            "------------------ Summary of Text Extraction ------------------\n\
             Total number of documents located: {}\n\
             Number of documents from which no text could be extracted: {}\n\
             Number of documents which caused unexpected errors: {}\n\
             Total number of documents successfully added to library (duplicates removed): {}\n\
             Total number of chunks indexed: {}\n\
             \n\
             The encoded library is saved here: {}\n\
             \n\
             Errors:\n\
             \n\
             {}",
            self.total_documents,
            self.no_text_documents.len(),
            self.failed_documents.len(),
            self.documents_indexed,
            self.chunks_indexed,
            self.snapshot_path.display(),
            errors,
        )
    }

    /// Write the rendered summary to a timestamped log file under `dir`,
    /// creating the directory if needed. Returns the path written.
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let stamp = Local::now().format("%Y%m%d%H%M%S");
        let path = dir.join(format!("{stamp} - extraction log.txt"));
        fs::write(&path, self.render())?;
        Ok(path)
    }
}
