//! Deterministic stub capabilities and fixture helpers shared by the
//! integration tests.

use async_trait::async_trait;
use semdex::document::{ExtractedDocument, Page};
use semdex::embedding::{Embedder, PairScorer};
use semdex::error::Result;

/// Embeds text as an L2-normalized bag-of-bytes histogram. Identical texts
/// embed identically, so a query equal to a stored chunk always wins the
/// dot-product stage.
#[derive(Debug, Clone, Copy)]
pub struct StubEmbedder {
    pub dims: usize,
}

impl StubEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }

    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dims];
        for (i, b) in text.bytes().enumerate() {
            v[(b as usize + i) % self.dims] += 1.0;
        }
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vector_for(text))
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

/// Scores a passage by substring lookup: the first `(needle, score)` rule
/// whose needle the passage contains wins, else `fallback`.
#[derive(Debug, Clone)]
pub struct StubScorer {
    pub rules: Vec<(String, f32)>,
    pub fallback: f32,
}

impl StubScorer {
    pub fn new(rules: &[(&str, f32)], fallback: f32) -> Self {
        Self {
            rules: rules.iter().map(|(n, s)| (n.to_string(), *s)).collect(),
            fallback,
        }
    }

    /// Neutral scorer: every passage rates 0.9, above the default
    /// relevance threshold.
    pub fn neutral() -> Self {
        Self { rules: Vec::new(), fallback: 0.9 }
    }
}

#[async_trait]
impl PairScorer for StubScorer {
    async fn score(&self, _query: &str, passage: &str) -> Result<f32> {
        for (needle, score) in &self.rules {
            if passage.contains(needle.as_str()) {
                return Ok(*score);
            }
        }
        Ok(self.fallback)
    }
}

pub fn document(name: &str, title: Option<&str>, pages: &[(&str, &str)]) -> ExtractedDocument {
    ExtractedDocument {
        file_path: format!("/docs/{name}"),
        file_name: name.to_string(),
        title: title.map(str::to_string),
        author: None,
        subject: None,
        keywords: None,
        pages: pages
            .iter()
            .map(|(label, text)| Page { label: label.to_string(), text: text.to_string() })
            .collect(),
    }
}
