//! Chunk length enforcement.
//!
//! Two passes keep every chunk inside the size window the embedding model
//! can handle: [`split_oversized`] bounds any single paragraph to a maximum
//! character length, cutting on sentence boundaries where possible, and
//! [`merge_undersized`] folds fragments below the minimum length back into
//! a neighboring chunk.

use crate::document::Chunk;

/// Split `text` into pieces of at most `max_len` characters.
///
/// A cursor walks the string taking windows of up to `max_len` characters.
/// Within each window the cut lands on the last `". "` (period + space);
/// failing that, on the last bare `"."`; failing that, hard at exactly
/// `max_len` characters. Pieces are whitespace-trimmed.
///
/// Intended for inputs longer than `max_len`; the caller flags every piece
/// of a split paragraph as split-origin so the merge pass can reconcile
/// fragments, while a paragraph that fit unmodified stays unflagged.
pub fn split_oversized(text: &str, max_len: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut pieces = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let window_end = (start + max_len).min(chars.len());
        let window = &chars[start..window_end];

        let end = match rfind_sentence_end(window).or_else(|| rfind_period(window)) {
            // Cut just after the chosen period.
            Some(split) => start + split + 1,
            // No punctuation anywhere in the window: hard cut.
            None => window_end,
        };

        let piece: String = chars[start..end].iter().collect();
        pieces.push(piece.trim().to_string());
        start = end;
    }

    pieces
}

/// Index of the `'.'` in the last `". "` occurrence, if any.
fn rfind_sentence_end(window: &[char]) -> Option<usize> {
    (0..window.len().saturating_sub(1))
        .rev()
        .find(|&i| window[i] == '.' && window[i + 1] == ' ')
}

/// Index of the last `'.'`, if any.
fn rfind_period(window: &[char]) -> Option<usize> {
    window.iter().rposition(|&c| c == '.')
}

/// Fold chunks shorter than `min_len` characters into a neighbor.
///
/// Operates on one document's chunk list in order, in a single forward
/// pass. Per chunk:
///
/// 1. empty chunks and chunks at or above `min_len` are left alone;
/// 2. a split-origin chunk with a non-empty predecessor is appended onto
///    that predecessor (space-joined) and consumed;
/// 3. otherwise the chunk is prepended onto its successor when the
///    successor belongs to the same document, clearing the successor's
///    split-origin flag;
/// 4. otherwise it is appended onto its predecessor. A sole chunk with no
///    neighbor survives under-length.
///
/// The pass is deliberately not iterated to a fixpoint: a chunk can stay
/// under `min_len` when its forced merge target was emptied earlier in the
/// same pass. Afterwards surviving content is trimmed and emptied chunks
/// are dropped.
pub fn merge_undersized(chunks: &mut Vec<Chunk>, min_len: usize) {
    for i in 0..chunks.len() {
        if chunks[i].content.is_empty() || chunks[i].content_len() >= min_len {
            continue;
        }

        if chunks[i].split_origin && i > 0 && !chunks[i - 1].content.is_empty() {
            let content = std::mem::take(&mut chunks[i].content);
            chunks[i].split_origin = false;
            let prev = &mut chunks[i - 1].content;
            prev.push(' ');
            prev.push_str(&content);
        } else if i + 1 < chunks.len() && chunks[i + 1].file_name == chunks[i].file_name {
            let content = std::mem::take(&mut chunks[i].content);
            let next = &mut chunks[i + 1];
            next.content = format!("{content} {}", next.content);
            next.split_origin = false;
        } else if i > 0 {
            let content = std::mem::take(&mut chunks[i].content);
            let prev = &mut chunks[i - 1].content;
            prev.push(' ');
            prev.push_str(&content);
        }
    }

    for chunk in chunks.iter_mut() {
        chunk.content = chunk.content.trim().to_string();
    }
    chunks.retain(|chunk| !chunk.content.is_empty());
}
