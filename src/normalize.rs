//! Line-level cleaning of raw Devanagari text before training.
//!
//! Normalization keeps the Devanagari block, whitespace, and a small
//! punctuation set, drops digits in both scripts, rewrites the danda (।) to
//! an ASCII period, and collapses whitespace runs. The rules are applied in
//! that order; each is a no-op when nothing matches, so the function is total
//! and idempotent.

use std::sync::OnceLock;

use regex::Regex;

/// Characters outside the Devanagari block, whitespace, and permitted punctuation.
fn foreign_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\u{0900}-\u{097F}\s।,.!?\-]").expect("valid literal pattern"))
}

/// ASCII and Devanagari digits.
fn digit_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9\u{0966}-\u{096F}]").expect("valid literal pattern"))
}

/// Any run of whitespace.
fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid literal pattern"))
}

/// Cleans one line of raw text.
///
/// The output contains only Devanagari letters and signs, single interior
/// spaces, and the punctuation set `, . ! ? -`; it carries no leading or
/// trailing whitespace.
///
/// ```
/// use dbpe::normalize::normalize_line;
///
/// let cleaned = normalize_line("नमस्ते भारत! यह 123 एक परीक्षण वाक्य है।");
/// assert_eq!(cleaned, "नमस्ते भारत! यह एक परीक्षण वाक्य है.");
/// ```
#[must_use]
pub fn normalize_line(line: &str) -> String {
    let kept = foreign_chars().replace_all(line, "");
    // Devanagari digits survive the block filter above, so both digit ranges
    // are stripped in a second pass.
    let without_digits = digit_chars().replace_all(&kept, "");
    let dotted = without_digits.replace('।', ".");
    let collapsed = whitespace_runs().replace_all(&dotted, " ");
    collapsed.trim().to_string()
}

/// Applies [`normalize_line`] to every line, preserving order and count.
///
/// Lines that normalize to the empty string are kept as empty strings.
#[must_use]
pub fn normalize_lines<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .map(|line| normalize_line(line.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn is_permitted(ch: char) -> bool {
        ('\u{0900}'..='\u{097F}').contains(&ch) || matches!(ch, ' ' | ',' | '.' | '!' | '?' | '-')
    }

    #[test]
    fn cleans_reference_sentence() {
        let cleaned = normalize_line("नमस्ते भारत! यह 123 एक परीक्षण वाक्य है।");
        assert_eq!(cleaned, "नमस्ते भारत! यह एक परीक्षण वाक्य है.");
    }

    #[test]
    fn strips_latin_and_devanagari_digits() {
        assert_eq!(normalize_line("क12ख"), "कख");
        assert_eq!(normalize_line("क१२ख"), "कख");
    }

    #[test]
    fn rewrites_danda_to_period() {
        assert_eq!(normalize_line("यह वाक्य।"), "यह वाक्य.");
    }

    #[test]
    fn collapses_and_trims_whitespace() {
        assert_eq!(normalize_line("  क \t ख \n ग  "), "क ख ग");
    }

    #[test]
    fn empty_and_foreign_only_input_goes_blank() {
        assert_eq!(normalize_line(""), "");
        assert_eq!(normalize_line("hello world 42"), "");
    }

    #[test]
    fn preserves_line_count_and_order() {
        let normalized = normalize_lines(["क", "abc", "ख"]);
        assert_eq!(normalized, vec!["क".to_string(), String::new(), "ख".to_string()]);
    }

    proptest! {
        #[test]
        fn output_alphabet_is_permitted(input in "\\PC*") {
            let cleaned = normalize_line(&input);
            prop_assert!(cleaned.chars().all(is_permitted), "unexpected char in {cleaned:?}");
        }

        #[test]
        fn output_has_no_doubled_or_edge_whitespace(input in "\\PC*") {
            let cleaned = normalize_line(&input);
            prop_assert!(!cleaned.contains("  "));
            prop_assert_eq!(cleaned.trim(), cleaned.as_str());
        }

        #[test]
        fn normalization_is_idempotent(input in "\\PC*") {
            let once = normalize_line(&input);
            prop_assert_eq!(normalize_line(&once), once.clone());
        }
    }
}
