/// Maximum caption length accepted by the platform, in characters.
pub const CAPTION_LIMIT: usize = 2200;

/// Maximum length of a failure message stored in the `error` column.
pub const ERROR_LIMIT: usize = 500;

/// Trim a caption and cut it to [`CAPTION_LIMIT`] characters.
pub fn normalize_caption(text: &str) -> String {
    truncate_chars(text.trim(), CAPTION_LIMIT)
}

/// Flatten a failure message onto one line and cut it to [`ERROR_LIMIT`] characters.
pub fn truncate_error(message: &str) -> String {
    let single_line = message.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(&single_line, ERROR_LIMIT)
}

fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_is_trimmed_and_cut_on_char_boundary() {
        let long = format!("  {}  ", "é".repeat(CAPTION_LIMIT + 10));
        let caption = normalize_caption(&long);
        assert_eq!(caption.chars().count(), CAPTION_LIMIT);
        assert!(caption.starts_with('é'));
        assert_eq!(normalize_caption(" hi "), "hi");
    }

    #[test]
    fn error_is_single_line_and_bounded() {
        assert_eq!(truncate_error("status 400:\n{\"error\"}"), "status 400: {\"error\"}");
        assert_eq!(truncate_error(&"x".repeat(900)).len(), ERROR_LIMIT);
    }
}
