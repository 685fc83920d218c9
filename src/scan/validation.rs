// SPDX-License-Identifier: GPL-3.0-only

/// Decoded content is usable iff it has non-whitespace characters.
pub fn is_valid_content(content: &str) -> bool {
    !content.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_blank_content() {
        assert!(!is_valid_content(""));
        assert!(!is_valid_content("   "));
        assert!(!is_valid_content("\t\r\n"));
    }

    #[test]
    fn test_accepts_padded_content() {
        assert!(is_valid_content("ABC123"));
        assert!(is_valid_content("  https://example.com \n"));
    }
}
