//! Internal helpers for text normalization and amount parsing.
//!
//! These utilities are **not** part of the public API. They centralize
//! normalization so category matching behaves the same everywhere.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Normalize free text for keyword matching: NFKC fold (half-width katakana,
/// full-width digits, etc.) plus lowercasing. Whitespace is preserved.
pub(crate) fn normalize_match_text(input: &str) -> String {
    input.nfkc().flat_map(char::to_lowercase).collect()
}

/// Collapse a user-facing name to a display form: trimmed, inner whitespace
/// runs reduced to single spaces. Returns `None` for blank input.
pub(crate) fn normalize_display(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut out = String::new();
    for token in trimmed.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(token);
    }
    if out.is_empty() { None } else { Some(out) }
}

/// Normalize a name into the key used for uniqueness checks: NFKD without
/// combining marks, alphanumerics lowercased, anything else collapsed to a
/// single space. Returns `None` when nothing survives.
pub(crate) fn normalize_key(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut out = String::new();
    let mut prev_space = false;
    for ch in trimmed.nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    let normalized = out.trim();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized.to_string())
    }
}

/// Extract an integer amount from a free-form string, dropping currency
/// commas (both ASCII and full-width) and any other non-digit noise.
/// Returns 0 when no digits are present.
pub(crate) fn parse_amount_digits(input: &str) -> i64 {
    let digits: String = input
        .nfkc()
        .filter(|ch| ch.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_text_folds_width_and_case() {
        assert_eq!(normalize_match_text("ﾎﾟｲﾝﾄ"), "ポイント");
        assert_eq!(normalize_match_text("WiFi"), "wifi");
    }

    #[test]
    fn display_collapses_whitespace() {
        assert_eq!(normalize_display("  食費  今月 "), Some("食費 今月".to_string()));
        assert_eq!(normalize_display("   "), None);
    }

    #[test]
    fn key_strips_marks_and_punctuation() {
        assert_eq!(normalize_key("Café--Bar"), Some("cafe bar".to_string()));
        assert_eq!(normalize_key("!!"), None);
    }

    #[test]
    fn amount_ignores_commas_and_symbols() {
        assert_eq!(parse_amount_digits("1,280円"), 1280);
        assert_eq!(parse_amount_digits("１，０００"), 1000);
        assert_eq!(parse_amount_digits("n/a"), 0);
    }
}
