//! Regex-based citation key extraction.
//!
//! Never fails: anything shaped like `@type{key` counts, including `@string` and `@comment`
//! headers and entries nested in comments.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(\w+)\{([\w\p{Pd}<>^:/.]+)").expect("valid citation key regex")
});

/// Keys of every `@type{key` header in `text`.
pub fn citation_keys(text: &str) -> BTreeSet<String> {
    HEADER
        .captures_iter(text)
        .filter_map(|caps| caps.get(2))
        .map(|key| key.as_str().trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(text: &str) -> Vec<String> {
        citation_keys(text).into_iter().collect()
    }

    #[test]
    fn header_keys() {
        assert_eq!(
            keys("@article{knuth:84/tex.book,\n title={x}}\n@book{lamport–94, }"),
            vec!["knuth:84/tex.book", "lamport–94"]
        );
    }

    #[test]
    fn malformed_input_still_yields_keys() {
        assert_eq!(keys("@misc{a, title = {unclosed\n@misc{b"), vec!["a", "b"]);
    }

    #[test]
    fn space_after_brace_is_not_a_key() {
        assert!(keys("@article{ spaced, }").is_empty());
        assert!(keys("@article(paren,)").is_empty());
    }

    #[test]
    fn repeated_scans_share_one_compiled_pattern() {
        let first: *const Regex = &*HEADER;
        assert_eq!(keys("@misc{a}"), vec!["a"]);
        assert_eq!(keys("@misc{b}"), vec!["b"]);
        assert!(std::ptr::eq(first, &*HEADER));
    }

    #[test]
    fn duplicates_collapse() {
        assert_eq!(keys("@misc{a}@misc{a}"), vec!["a"]);
    }
}
