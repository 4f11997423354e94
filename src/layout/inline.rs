//! Same-line fragment merging.
//!
//! Extractors often split one visual line into many pieces (per word, per
//! kerning change, bullet apart from its text). Adjacent pieces of one line
//! are merged into a single fragment before column detection, so that the
//! only horizontal gaps left on a line are the ones between columns.

use super::hyphen::{dehyphenate, HyphenJoin};
use super::lines::{cmp_f32, group_lines};
use super::{Diagnostics, LayoutOptions, Thresholds, Vocabulary};
use crate::model::Fragment;

/// Fraction of the smaller height above which a join gets a space.
const SPACE_GAP_RATIO: f32 = 0.2;

/// Decide whether `next` continues `cur` on the same line.
pub fn should_merge(cur: &Fragment, next: &Fragment, t: &Thresholds, vocab: &Vocabulary) -> bool {
    if cur.table_cell != next.table_cell {
        return false;
    }
    let gap = cur.bbox.gap_to(&next.bbox);
    let min_height = cur.bbox.height.min(next.bbox.height);

    if vocab.is_pure_punctuation(&next.text) && gap <= t.punctuation_gap {
        return true;
    }
    if vocab.is_bullet(&cur.text) && gap <= t.bullet_gap {
        return true;
    }
    if gap.abs() <= t.inline_gap {
        return true;
    }
    if next.text.starts_with(char::is_whitespace) && (gap - t.space_width).abs() <= t.inline_gap {
        return true;
    }
    if gap > 0.0 && gap < t.inline_height_ratio * min_height {
        return true;
    }
    gap > 0.0 && gap <= t.continuation_gap && vocab.ends_with_continuation_word(&cur.text)
}

/// Join `next` onto `cur`, dehyphenating and inserting a space when the gap
/// is visibly a word break.
pub fn join(cur: &mut Fragment, mut next: Fragment, vocab: &Vocabulary) -> HyphenJoin {
    let hyphen = dehyphenate(cur, &mut next, vocab);
    if hyphen == HyphenJoin::None {
        let gap = cur.bbox.gap_to(&next.bbox);
        let min_height = cur.bbox.height.min(next.bbox.height);
        let has_space = cur.text.ends_with(char::is_whitespace)
            || next.text.starts_with(char::is_whitespace);
        if !has_space
            && !vocab.is_pure_punctuation(&next.text)
            && gap >= SPACE_GAP_RATIO * min_height
        {
            cur.push_text(" ");
        }
    }
    cur.absorb(next);
    hyphen
}

/// Merge adjacent fragments on every visual line.
pub fn merge_inline(
    fragments: &mut Vec<Fragment>,
    options: &LayoutOptions,
    diagnostics: &mut Diagnostics,
) {
    let t = &options.thresholds;
    let vocab = &options.vocabulary;
    let lines = group_lines(fragments, t);

    let mut slots: Vec<Option<Fragment>> = fragments.drain(..).map(Some).collect();
    let mut merged = Vec::with_capacity(slots.len());

    for line in lines {
        let mut iter = line.into_iter().filter_map(|i| slots[i].take());
        let Some(mut cur) = iter.next() else {
            continue;
        };
        for next in iter {
            if should_merge(&cur, &next, t, vocab) {
                if join(&mut cur, next, vocab) == HyphenJoin::Removed {
                    diagnostics.dehyphenations += 1;
                }
                diagnostics.inline_merges += 1;
            } else {
                merged.push(std::mem::replace(&mut cur, next));
            }
        }
        merged.push(cur);
    }

    merged.sort_by(|a, b| {
        cmp_f32(a.baseline(), b.baseline())
            .then_with(|| cmp_f32(a.bbox.left, b.bbox.left))
            .then_with(|| a.source.cmp(&b.source))
    });
    *fragments = merged;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BBox;

    fn frag(source: usize, text: &str, left: f32, right: f32, top: f32) -> Fragment {
        Fragment::new(1, source, text, BBox::new(left, top, right - left, 10.0))
    }

    fn run(frags: Vec<Fragment>) -> (Vec<Fragment>, Diagnostics) {
        let mut frags = frags;
        let mut diag = Diagnostics::default();
        merge_inline(&mut frags, &LayoutOptions::default(), &mut diag);
        (frags, diag)
    }

    #[test]
    fn test_hello_world() {
        let (out, diag) = run(vec![
            frag(0, "Hello ", 0.0, 40.0, 100.0),
            frag(1, "World", 42.0, 80.0, 100.0),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "Hello World");
        assert_eq!(out[0].bbox.left, 0.0);
        assert_eq!(out[0].bbox.right(), 80.0);
        assert_eq!(diag.inline_merges, 1);
    }

    #[test]
    fn test_word_gap_inserts_space() {
        let (out, _) = run(vec![
            frag(0, "Hello", 0.0, 40.0, 100.0),
            frag(1, "World", 43.0, 80.0, 100.0),
        ]);
        assert_eq!(out[0].text, "Hello World");

        let (out, _) = run(vec![
            frag(0, "Hel", 0.0, 20.0, 100.0),
            frag(1, "lo", 20.5, 30.0, 100.0),
        ]);
        assert_eq!(out[0].text, "Hello");
    }

    #[test]
    fn test_punctuation_and_bullets() {
        let (out, _) = run(vec![
            frag(0, "end", 0.0, 30.0, 100.0),
            frag(1, ".", 38.0, 40.0, 100.0),
        ]);
        assert_eq!(out[0].text, "end.");

        let (out, _) = run(vec![
            frag(0, "•", 0.0, 5.0, 100.0),
            frag(1, "Item", 20.0, 50.0, 100.0),
        ]);
        assert_eq!(out[0].text, "• Item");
    }

    #[test]
    fn test_continuation_word_gap() {
        let (out, _) = run(vec![
            frag(0, "one of the", 0.0, 60.0, 100.0),
            frag(1, "best", 72.0, 100.0, 100.0),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "one of the best");
    }

    #[test]
    fn test_column_gap_not_merged() {
        let (out, diag) = run(vec![
            frag(0, "left column", 50.0, 280.0, 100.0),
            frag(1, "right column", 310.0, 570.0, 100.0),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(diag.inline_merges, 0);
    }

    #[test]
    fn test_inline_dehyphenation() {
        let (out, diag) = run(vec![
            frag(0, "inter-", 0.0, 30.0, 100.0),
            frag(1, "national", 31.0, 80.0, 100.0),
        ]);
        assert_eq!(out[0].text, "international");
        assert_eq!(diag.dehyphenations, 1);
    }

    #[test]
    fn test_different_lines_untouched() {
        let (out, _) = run(vec![
            frag(0, "line one", 0.0, 40.0, 100.0),
            frag(1, "line two", 0.0, 40.0, 130.0),
        ]);
        assert_eq!(out.len(), 2);
    }
}
