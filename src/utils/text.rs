/// Truncate a string to at most `max_chars` characters
///
/// Char-based so multi-byte text never splits on a UTF-8 boundary.
pub fn truncate_to_char_boundary(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Strip Markdown code fences some models wrap around JSON replies
pub fn strip_code_fences(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}
