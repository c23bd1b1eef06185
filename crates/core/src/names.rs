//! Title normalization and equivalence.
//!
//! Two titles are considered equal when they are identical after removing
//! punctuation, zero-width characters and whitespace, and upper-casing.

/// Punctuation removed before comparing titles (ASCII and full-width forms).
const SPECIAL_CHARS: &[char] = &[
    '、', '.', '。', ',', '，', '·', ':', '：', ';', '；', '!', '！', '\'', '’', '"', '“',
    '”', '(', ')', '（', '）', '[', ']', '【', '】', '「', '」', '-', '—', '+', '|', '\\',
    '_', '/', '&', '#', '～', '~',
];

const ZERO_WIDTH_CHARS: &[char] = &['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}'];

/// Normalize a title for comparison.
pub fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| {
            !SPECIAL_CHARS.contains(c) && !ZERO_WIDTH_CHARS.contains(c) && !c.is_whitespace()
        })
        .flat_map(char::to_uppercase)
        .collect()
}

/// True if `candidate` equals any of `targets` after normalization.
///
/// An empty candidate, or one that normalizes to nothing, never matches.
pub fn names_equal<S: AsRef<str>>(candidate: &str, targets: &[S]) -> bool {
    let candidate = normalize_title(candidate);
    if candidate.is_empty() {
        return false;
    }
    targets
        .iter()
        .any(|t| normalize_title(t.as_ref()) == candidate)
}

/// True if the text contains CJK unified ideographs.
pub fn contains_cjk(text: &str) -> bool {
    text.chars()
        .any(|c| matches!(c, '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation_and_case() {
        assert_eq!(normalize_title("The Last of Us"), "THELASTOFUS");
        assert_eq!(normalize_title("the.last.of.us"), "THELASTOFUS");
        assert_eq!(normalize_title("The-Last_of:Us!"), "THELASTOFUS");
        assert_eq!(normalize_title("【流浪地球】（2019）"), "流浪地球2019");
    }

    #[test]
    fn test_normalize_strips_zero_width() {
        assert_eq!(normalize_title("Incep\u{200B}tion\u{FEFF}"), "INCEPTION");
    }

    #[test]
    fn test_names_equal_matches_any_target() {
        assert!(names_equal("the last of us", &["Last Of Us", "The Last of Us"]));
        assert!(names_equal("Spider-Man: No Way Home", &["Spider Man No Way Home"]));
        assert!(!names_equal("The Last of Us Part II", &["The Last of Us"]));
    }

    #[test]
    fn test_names_equal_empty_inputs() {
        let empty: [&str; 0] = [];
        assert!(!names_equal("Inception", &empty));
        assert!(!names_equal("", &["Inception"]));
        assert!(!names_equal("...", &["..."]));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for title in ["Léon: The Professional", "唐人街探案３", "Fast & Furious 9"] {
            let once = normalize_title(title);
            assert_eq!(normalize_title(&once), once);
        }
    }

    #[test]
    fn test_contains_cjk() {
        assert!(contains_cjk("流浪地球 2019"));
        assert!(!contains_cjk("Inception 2010"));
    }
}
