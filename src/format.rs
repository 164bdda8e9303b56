//! Result presentation: escaping, provenance locators, and relevance
//! signaling.

use std::path::Path;

use crate::corpus::Corpus;
use crate::retrieve::RankedHit;

/// Literal used when a result's source file is no longer on disk. A
/// per-result condition, never an error.
pub const MISSING_FILE_LOCATOR: &str = "File missing or moved.";

/// Characters that can break markdown rendering; each is prefixed with a
/// backslash in result snippets.
const MARKUP_CHARS: [char; 16] =
    ['`', '*', '_', '[', ']', '(', ')', '#', '>', '-', '~', ':', '=', '^', '|', '<'];

/// One formatted, presentation-ready search result.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedResult {
    /// 1-based final rank.
    pub rank: usize,
    /// Row index into the corpus the chunk came from.
    pub index: usize,
    /// First-stage dot-product similarity.
    pub similarity: f32,
    /// Second-stage relevance score.
    pub relevance: f32,
    /// Display name of the source file.
    pub file_name: String,
    /// Page label of the chunk.
    pub page_label: String,
    /// Deep link to the source page, or [`MISSING_FILE_LOCATOR`].
    pub locator: String,
    /// Markup-escaped chunk content.
    pub snippet: String,
}

/// Prefix every markup-significant character with a backslash.
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if MARKUP_CHARS.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Resolve a deep-link locator for a chunk's source page.
///
/// When the file exists on the accessible filesystem the locator encodes
/// the absolute path and page label; otherwise the missing-file literal is
/// substituted.
pub fn page_locator(file_path: &str, page_label: &str) -> String {
    let path = Path::new(file_path);
    if path.exists() {
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        format!("file:{}#page={page_label}", absolute.display())
    } else {
        MISSING_FILE_LOCATOR.to_string()
    }
}

/// Turn ranked hits into presentation-ready results, in rank order.
pub fn format_results(corpus: &Corpus, ranked: &[RankedHit]) -> Vec<FormattedResult> {
    ranked
        .iter()
        .map(|hit| {
            let chunk = &corpus.chunks[hit.index];
            FormattedResult {
                rank: hit.rank,
                index: hit.index,
                similarity: hit.similarity,
                relevance: hit.relevance,
                file_name: chunk.file_name.clone(),
                page_label: chunk.page_label.clone(),
                locator: page_locator(&chunk.file_path, &chunk.page_label),
                snippet: escape_markup(&chunk.content),
            }
        })
        .collect()
}

/// Render results as a markdown block.
///
/// A single low-relevance banner is emitted immediately before the first
/// result whose relevance score falls below `threshold`. Results arrive
/// sorted descending, so no later result re-triggers the banner.
pub fn render_markdown(results: &[FormattedResult], threshold: f32) -> String {
    let mut out = String::from("------------------------------------------------------<br>");
    let mut warned = false;

    for result in results {
        if !warned && result.relevance < threshold {
            out.push_str(
                "<mark>Warning: The following results do not appear to be very relevant \
                 to your query.</mark><br>",
            );
            warned = true;
        }
        out.push_str(&format!(
            "***Preview {}***<br>**Relevance Score:** {:.4}<br>**File:** {}<br>\
             **Page:** {}<br>**Link:** {}<br>**Paragraph:** {}<br>\
             ------------------------------------------------------<br>",
            result.rank,
            result.relevance,
            result.file_name,
            result.page_label,
            result.locator,
            result.snippet,
        ));
    }
    out
}
