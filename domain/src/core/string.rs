//! String helpers for excerpts carried in prompts, errors and reports.

/// Truncate a string to at most `max_chars` characters with ellipsis
///
/// The ellipsis counts toward `max_chars`. Lengths are counted in
/// characters, not bytes.
pub fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        None => s.to_string(),
        Some(_) => {
            let keep = max_chars.saturating_sub(3);
            let end = s.char_indices().nth(keep).map_or(s.len(), |(i, _)| i);
            format!("{}...", &s[..end])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("batch", 10), "batch");
        assert_eq!(truncate("batch", 5), "batch");
        assert_eq!(truncate("batch record review", 8), "batch...");
    }

    #[test]
    fn test_truncate_counts_characters() {
        // "µ" is two bytes but one character
        assert_eq!(truncate("µµµµ", 4), "µµµµ");
        assert_eq!(truncate("µµµµµµ", 5), "µµ...");
        assert_eq!(truncate("検証仕様書の要件", 6), "検証仕...");
    }

    #[test]
    fn test_truncate_tiny_limit() {
        assert_eq!(truncate("abcdef", 2), "...");
    }
}
