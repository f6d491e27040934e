//! Encode: split oversized text into chunks within the per-block limit.
//!
//! Break points are searched backward from the window boundary in
//! priority order — paragraph break, sentence terminator, plain space —
//! and a candidate is only accepted past the midpoint of the window, so
//! no pathologically short chunk is produced. Delimiters stay with the
//! chunk that precedes them: concatenating all chunks reproduces the
//! input byte for byte.
//!
//! Lengths are measured in characters (the remote service's limit is a
//! character count), and every cut lands on a char boundary.

use promptbook_types::{BlockSpec, MAX_BLOCK_TEXT_LEN};

/// Split `text` into chunks of at most `max_len` characters.
///
/// Text that already fits is returned as a single chunk. Concatenation
/// of the result always equals the input exactly.
pub fn chunk_text(text: &str, max_len: usize) -> Vec<String> {
    assert!(max_len > 0, "chunk size must be positive");

    if text.chars().count() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut rest = text;
    while rest.chars().count() > max_len {
        let window_end = byte_offset_of_char(rest, max_len);
        let window = &rest[..window_end];
        let cut = find_break(window, max_len).unwrap_or(window_end);
        chunks.push(rest[..cut].to_string());
        rest = &rest[cut..];
    }
    if !rest.is_empty() {
        chunks.push(rest.to_string());
    }
    chunks
}

/// Encode text as a sequence of paragraph block specs, each within the
/// service's block size limit.
pub fn encode_text(text: &str) -> Vec<BlockSpec> {
    chunk_text(text, MAX_BLOCK_TEXT_LEN)
        .into_iter()
        .map(BlockSpec::paragraph)
        .collect()
}

/// Byte offset of the `n`-th character (or the string's end).
fn byte_offset_of_char(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(idx, _)| idx)
}

/// Byte offset to cut at, or `None` when no break point qualifies.
///
/// Each candidate's delimiter is included in the preceding chunk, and a
/// candidate qualifies only when the resulting chunk is longer than half
/// the window.
fn find_break(window: &str, max_len: usize) -> Option<usize> {
    let min_chars = max_len / 2;
    let qualifies = |cut: usize| window[..cut].chars().count() > min_chars;

    if let Some(pos) = window.rfind("\n\n") {
        let cut = pos + 2;
        if qualifies(cut) {
            return Some(cut);
        }
    }

    let sentence_end = [". ", "! ", "? "]
        .iter()
        .filter_map(|p| window.rfind(p).map(|pos| pos + p.len()))
        .max();
    if let Some(cut) = sentence_end {
        if qualifies(cut) {
            return Some(cut);
        }
    }

    if let Some(pos) = window.rfind(' ') {
        let cut = pos + 1;
        if qualifies(cut) {
            return Some(cut);
        }
    }

    None
}
