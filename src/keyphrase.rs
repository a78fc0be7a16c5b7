//! Short excerpt for the image overlay.

use crate::extractor::model::truncate_chars;

pub const DEFAULT_MAX_LEN: usize = 130;

/// A delimiter only counts when its first occurrence lies strictly after
/// this char index.
const MIN_INDEX: usize = 40;

/// Checked in this order; the first qualifying delimiter wins even if a
/// later one occurs earlier in the text.
const DELIMITERS: [&str; 5] = [". ", "… ", "\n", "! ", "? "];

/// Cut `text` at the first qualifying sentence boundary, or hard-truncate it
/// to `max_len` chars. The result never exceeds `max_len` chars.
pub fn pick_keyphrase(text: &str, max_len: usize) -> String {
    for delimiter in DELIMITERS {
        let Some(byte_idx) = text.find(delimiter) else {
            continue;
        };

        let char_idx = text[..byte_idx].chars().count();
        if MIN_INDEX < char_idx && char_idx < max_len {
            let end = byte_idx + delimiter.len();
            return text[..end].trim_end().to_string();
        }
    }

    truncate_chars(text, max_len)
}
