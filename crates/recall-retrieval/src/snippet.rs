//! Query-aware snippet extraction for search results.
//!
//! Slides a fixed-width window over the content and keeps the earliest
//! window containing the most distinct query terms. Matching is
//! case-insensitive; the returned snippet preserves the original casing.

/// Extract a snippet of at most `max_len` characters from `content`.
///
/// The window boundary is counted in characters, never bytes, so
/// multi-byte text cannot be split mid-character. Ellipses mark
/// truncation on either side. An empty or matchless query yields the
/// leading window.
pub fn extract_snippet(content: &str, query: &str, max_len: usize) -> String {
    if content.is_empty() || max_len == 0 {
        return String::new();
    }

    // Byte offset of every character boundary, so windows in character
    // space can be sliced without re-walking the string.
    let offsets: Vec<usize> = content
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(content.len()))
        .collect();
    let char_count = offsets.len() - 1;

    if char_count <= max_len {
        return content.to_string();
    }

    let terms: Vec<String> = {
        let mut t: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(|s| s.to_string())
            .collect();
        t.sort();
        t.dedup();
        t
    };

    let mut best_start = 0usize;
    let mut best_score = 0usize;
    if !terms.is_empty() {
        for start in 0..=(char_count - max_len) {
            let window = &content[offsets[start]..offsets[start + max_len]];
            let lowered = window.to_lowercase();
            let score = terms.iter().filter(|t| lowered.contains(t.as_str())).count();
            if score > best_score {
                best_score = score;
                best_start = start;
                if score == terms.len() {
                    break;
                }
            }
        }
    }

    let mut snippet = String::new();
    if best_start > 0 {
        snippet.push_str("...");
    }
    snippet.push_str(&content[offsets[best_start]..offsets[best_start + max_len]]);
    if best_start + max_len < char_count {
        snippet.push_str("...");
    }
    snippet
}
