//! Line-break hyphen handling shared by inline merging, paragraph grouping
//! and cross-page merging.

use super::Vocabulary;
use crate::model::Fragment;

/// Outcome of joining two fragments across a line-end hyphen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HyphenJoin {
    /// No hyphen continuation
    None,
    /// Hyphen removed, word joined ("inter-" + "national")
    Removed,
    /// Hyphen kept, word joined ("self-" + "aware")
    Kept,
}

/// Check if `prev` ends with a line-break hyphen that `curr` continues.
pub fn is_hyphen_continuation(prev: &str, curr: &str, vocab: &Vocabulary) -> bool {
    let prev = prev.trim_end();
    let Some(stem) = prev.strip_suffix('-') else {
        return false;
    };
    if !stem.chars().last().is_some_and(char::is_alphabetic) {
        return false;
    }
    if vocab.starts_with_list_marker(curr) {
        return false;
    }
    curr.trim_start()
        .chars()
        .next()
        .is_some_and(char::is_lowercase)
}

/// Join a hyphenated word split across `prev` and `curr`.
///
/// The second half moves from the start of `curr` to the end of `prev`. The
/// hyphen is dropped unless the stem is an always-hyphenated prefix or an
/// acronym. `curr` may end up empty.
pub fn dehyphenate(prev: &mut Fragment, curr: &mut Fragment, vocab: &Vocabulary) -> HyphenJoin {
    if !is_hyphen_continuation(&prev.text, &curr.text, vocab) {
        return HyphenJoin::None;
    }

    let stem = prev
        .text
        .trim_end()
        .trim_end_matches('-')
        .split_whitespace()
        .last()
        .unwrap_or_default()
        .to_string();
    let keep = vocab.keeps_hyphen(&stem);

    prev.trim_end_matches(char::is_whitespace);
    if !keep {
        prev.pop_suffix('-');
    }
    let word = curr.take_leading_word();
    prev.push_text(&word);
    if !curr.is_blank() {
        prev.push_text(" ");
    }

    if keep {
        HyphenJoin::Kept
    } else {
        HyphenJoin::Removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BBox;

    fn frag(text: &str) -> Fragment {
        Fragment::new(1, 0, text, BBox::new(0.0, 0.0, 50.0, 10.0))
    }

    #[test]
    fn test_continuation_rules() {
        let v = Vocabulary::default();
        assert!(is_hyphen_continuation("inter-", "national", &v));
        assert!(is_hyphen_continuation("inter- ", " national", &v));
        assert!(!is_hyphen_continuation("inter-", "National", &v));
        assert!(!is_hyphen_continuation("1 -", "national", &v));
        assert!(!is_hyphen_continuation("items:", "national", &v));
        assert!(!is_hyphen_continuation("list-", "- item", &v));
    }

    #[test]
    fn test_dehyphenate_removes_hyphen() {
        let v = Vocabulary::default();
        let mut prev = frag("the inter-");
        let mut curr = frag("national trade");
        assert_eq!(dehyphenate(&mut prev, &mut curr, &v), HyphenJoin::Removed);
        assert_eq!(prev.text, "the international ");
        assert_eq!(curr.text, "trade");
    }

    #[test]
    fn test_dehyphenate_whole_fragment() {
        let v = Vocabulary::default();
        let mut prev = frag("inter-");
        let mut curr = frag("national");
        assert_eq!(dehyphenate(&mut prev, &mut curr, &v), HyphenJoin::Removed);
        assert_eq!(prev.text, "international");
        assert!(curr.is_blank());
    }

    #[test]
    fn test_dehyphenate_keeps_prefix_hyphen() {
        let v = Vocabulary::default();
        let mut prev = frag("a self-");
        let mut curr = frag("aware system");
        assert_eq!(dehyphenate(&mut prev, &mut curr, &v), HyphenJoin::Kept);
        assert_eq!(prev.text, "a self-aware ");

        let mut prev = frag("the HTML-");
        let mut curr = frag("based form");
        assert_eq!(dehyphenate(&mut prev, &mut curr, &v), HyphenJoin::Kept);
        assert_eq!(prev.text, "the HTML-based ");
    }
}
