//! Configuration for library assembly and retrieval.

use serde::{Deserialize, Serialize};

use crate::error::{LibraryError, Result};

/// Configuration parameters shared by the chunking pipeline and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibraryConfig {
    /// Maximum chunk length in characters. Paragraphs longer than this are
    /// force-split on sentence boundaries where possible.
    pub max_chunk_len: usize,
    /// Minimum chunk length in characters. Shorter chunks are merged into a
    /// neighboring chunk during assembly.
    pub min_chunk_len: usize,
    /// Number of first-stage candidates to retrieve per query.
    pub top_k: usize,
    /// Second-stage score below which results carry a low-relevance warning.
    pub relevance_threshold: f32,
    /// On an exact dedup-key collision during an incremental merge, keep the
    /// existing library's copy (`true`) or the candidate batch's (`false`).
    pub prefer_existing_on_collision: bool,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            max_chunk_len: 1500,
            min_chunk_len: 280,
            top_k: 10,
            relevance_threshold: 0.8,
            prefer_existing_on_collision: true,
        }
    }
}

impl LibraryConfig {
    /// Create a new builder for constructing a [`LibraryConfig`].
    pub fn builder() -> LibraryConfigBuilder {
        LibraryConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`LibraryConfig`].
#[derive(Debug, Clone, Default)]
pub struct LibraryConfigBuilder {
    config: LibraryConfig,
}

impl LibraryConfigBuilder {
    /// Set the maximum chunk length in characters.
    pub fn max_chunk_len(mut self, len: usize) -> Self {
        self.config.max_chunk_len = len;
        self
    }

    /// Set the minimum chunk length in characters.
    pub fn min_chunk_len(mut self, len: usize) -> Self {
        self.config.min_chunk_len = len;
        self
    }

    /// Set the number of first-stage candidates to retrieve per query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the low-relevance warning threshold for second-stage scores.
    pub fn relevance_threshold(mut self, threshold: f32) -> Self {
        self.config.relevance_threshold = threshold;
        self
    }

    /// Choose which copy survives a dedup-key collision during merge.
    pub fn prefer_existing_on_collision(mut self, prefer: bool) -> Self {
        self.config.prefer_existing_on_collision = prefer;
        self
    }

    /// Build the [`LibraryConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Config`] if:
    /// - `min_chunk_len >= max_chunk_len`
    /// - `max_chunk_len == 0`
    /// - `top_k == 0`
    pub fn build(self) -> Result<LibraryConfig> {
        if self.config.max_chunk_len == 0 {
            return Err(LibraryError::Config(
                "max_chunk_len must be greater than zero".to_string(),
            ));
        }
        if self.config.min_chunk_len >= self.config.max_chunk_len {
            return Err(LibraryError::Config(format!(
                "min_chunk_len ({}) must be less than max_chunk_len ({})",
                self.config.min_chunk_len, self.config.max_chunk_len
            )));
        }
        if self.config.top_k == 0 {
            return Err(LibraryError::Config("top_k must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_contract_values() {
        let config = LibraryConfig::default();
        assert_eq!(config.max_chunk_len, 1500);
        assert_eq!(config.min_chunk_len, 280);
        assert_eq!(config.top_k, 10);
        assert!((config.relevance_threshold - 0.8).abs() < f32::EPSILON);
        assert!(config.prefer_existing_on_collision);
    }

    #[test]
    fn builder_rejects_inverted_lengths() {
        let err = LibraryConfig::builder()
            .max_chunk_len(100)
            .min_chunk_len(200)
            .build()
            .unwrap_err();
        assert!(matches!(err, LibraryError::Config(_)));
    }

    #[test]
    fn builder_rejects_zero_top_k() {
        let err = LibraryConfig::builder().top_k(0).build().unwrap_err();
        assert!(matches!(err, LibraryError::Config(_)));
    }
}
