//! Core parsing primitives for text extraction.
//!
//! Tag text and artifact filenames carry structured data in positional
//! form; these helpers turn that into structured results instead of
//! scattering substring arithmetic through the components. The
//! first/last-delimiter semantics are the externally observed contract
//! and must not drift.

use std::cmp::Ordering;

use regex::Regex;

/// ASCII case-insensitive prefix test.
pub fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len() && text[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Slice the text strictly between the first and last occurrence of the
/// delimiter. Returns None when the delimiter appears fewer than twice
/// or the slice is empty.
pub fn slice_between_first_last(text: &str, delimiter: char) -> Option<&str> {
    let first = text.find(delimiter)?;
    let last = text.rfind(delimiter)?;
    if first == last {
        return None;
    }
    let inner = &text[first + delimiter.len_utf8()..last];
    if inner.is_empty() {
        None
    } else {
        Some(inner)
    }
}

/// Split at the first occurrence of the delimiter into (head, tail).
pub fn split_at_first(text: &str, delimiter: char) -> Option<(&str, &str)> {
    text.split_once(delimiter)
}

/// Lenient dotted-numeric version comparison.
///
/// Segments are compared pairwise by their embedded digits only, up to
/// the shorter version's length; "2.7.10" > "2.7.9", "220" == "220",
/// and "1.2rc1" compares as "1.2". Segments without any digit count
/// as zero.
pub fn compare_versions(actual: &str, wanted: &str) -> Ordering {
    let actual_parts: Vec<u64> = actual.split('.').map(numeric_part).collect();
    let wanted_parts: Vec<u64> = wanted.split('.').map(numeric_part).collect();

    let len = actual_parts.len().min(wanted_parts.len());
    for i in 0..len {
        match actual_parts[i].cmp(&wanted_parts[i]) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    Ordering::Equal
}

fn numeric_part(segment: &str) -> u64 {
    let digits: String = segment.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// Extract first match from content using a regex pattern with one
/// capture group. Content is trimmed before matching.
pub fn extract_first(content: &str, pattern: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    re.captures(content.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_match_is_case_insensitive() {
        assert!(starts_with_ignore_case("Deploy_1.2.3", "deploy"));
        assert!(starts_with_ignore_case("DEPLOY_1.2.3", "deploy"));
        assert!(!starts_with_ignore_case("redeploy_1.2.3", "deploy"));
        assert!(!starts_with_ignore_case("dep", "deploy"));
    }

    #[test]
    fn slice_between_first_last_extracts_inner() {
        assert_eq!(
            slice_between_first_last("Nightjar_0.5.1_Setup.exe", '_'),
            Some("0.5.1")
        );
    }

    #[test]
    fn slice_requires_two_delimiters() {
        assert_eq!(slice_between_first_last("Nightjar_Setup.exe", '_'), None);
        assert_eq!(slice_between_first_last("NightjarSetup.exe", '_'), None);
    }

    #[test]
    fn slice_rejects_empty_inner() {
        assert_eq!(slice_between_first_last("Nightjar__Setup.exe", '_'), None);
    }

    #[test]
    fn split_at_first_keeps_rest_intact() {
        assert_eq!(
            split_at_first("deploy_1.2.3_rc1", '_'),
            Some(("deploy", "1.2.3_rc1"))
        );
        assert_eq!(split_at_first("deploy", '_'), None);
    }

    #[test]
    fn compare_versions_is_numeric_not_lexical() {
        assert_eq!(compare_versions("2.7.10", "2.7.9"), Ordering::Greater);
        assert_eq!(compare_versions("220", "220"), Ordering::Equal);
        assert_eq!(compare_versions("1.9", "1.10"), Ordering::Less);
    }

    #[test]
    fn compare_versions_ignores_non_digits_per_segment() {
        assert_eq!(compare_versions("1.2rc1", "1.2"), Ordering::Equal);
        assert_eq!(compare_versions("3.0b2", "3.0"), Ordering::Equal);
    }

    #[test]
    fn compare_versions_only_compares_shared_segments() {
        // Same semantics as the checker this replaces: a longer actual
        // version that matches on shared segments counts as equal.
        assert_eq!(compare_versions("2.7.9.1", "2.7.9"), Ordering::Equal);
    }

    #[test]
    fn extract_first_finds_capture() {
        let content = "Name: widget\nVersion: 1.4.2\n";
        assert_eq!(
            extract_first(content, r"Version:\s*([0-9.]+)"),
            Some("1.4.2".to_string())
        );
    }

    #[test]
    fn extract_first_returns_none_on_no_match() {
        assert_eq!(extract_first("no version here", r"Version:\s*([0-9.]+)"), None);
    }
}
