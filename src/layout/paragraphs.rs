//! Paragraph grouping.
//!
//! Fragments arrive with their column and reading block assigned. They are
//! walked in (block, column, baseline) order and each consecutive pair is
//! either merged into the running paragraph or starts a new one.

use std::collections::HashMap;

use super::hyphen::{dehyphenate, is_hyphen_continuation, HyphenJoin};
use super::lines::{cmp_f32, typical_line_height};
use super::{Diagnostics, LayoutOptions, Thresholds, Vocabulary};
use crate::model::{Fragment, Paragraph};

/// Gap threshold used when a page has no measurable line height.
const FALLBACK_GAP_THRESHOLD: f32 = 18.0;

/// Outcome of comparing two consecutive fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Break,
    Merge,
    /// Merge across a column/block boundary; the fragment joins the
    /// previous fragment's block
    MergeAcross,
}

struct GroupContext<'a> {
    thresholds: &'a Thresholds,
    vocab: &'a Vocabulary,
    gap_threshold: f32,
    column_widths: HashMap<u32, f32>,
}

impl GroupContext<'_> {
    fn column_width(&self, col: u32) -> Option<f32> {
        self.column_widths.get(&col).copied().filter(|w| *w > 0.0)
    }

    /// Narrow previous line ending a sentence, followed by a capitalized line.
    fn ends_paragraph(&self, prev: &Fragment, curr: &Fragment) -> bool {
        let narrow = self
            .column_width(prev.column_id())
            .is_some_and(|w| prev.bbox.width / w < self.thresholds.short_line_ratio);
        narrow
            && !is_hyphen_continuation(&prev.text, &curr.text, self.vocab)
            && ends_with_sentence_mark(&prev.text)
            && starts_uppercase(&curr.text)
    }

    fn decide(&self, prev: &Fragment, curr: &Fragment) -> Decision {
        let t = self.thresholds;
        let vertical_gap = curr.bbox.top - prev.bbox.bottom();
        let hyphenated = is_hyphen_continuation(&prev.text, &curr.text, self.vocab);

        if prev.table_cell != curr.table_cell || prev.page != curr.page {
            return Decision::Break;
        }

        if prev.column_id() != curr.column_id() || prev.block_id() != curr.block_id() {
            if hyphenated {
                return Decision::MergeAcross;
            }
            if !self.vocab.ends_sentence(&prev.text)
                && !curr.text.trim().is_empty()
                && vertical_gap < self.gap_threshold
            {
                return Decision::MergeAcross;
            }
            return Decision::Break;
        }

        if self.same_line_continuation(prev, curr) {
            return Decision::Merge;
        }

        if (prev.font_size() - curr.font_size()).abs() >= t.font_size_delta {
            return Decision::Break;
        }
        if prev.is_bold() != curr.is_bold() {
            return Decision::Break;
        }

        if vertical_gap > self.gap_threshold {
            return if hyphenated {
                Decision::Merge
            } else {
                Decision::Break
            };
        }

        if vertical_gap > t.small_gap {
            let back_jump = prev.bbox.right() - curr.bbox.left;
            if back_jump > t.back_jump || self.ends_paragraph(prev, curr) {
                return Decision::Break;
            }
            return if vertical_gap <= curr.font_size() {
                Decision::Merge
            } else {
                Decision::Break
            };
        }

        if self.ends_paragraph(prev, curr) {
            Decision::Break
        } else {
            Decision::Merge
        }
    }

    /// Same visual line with evidence that `curr` continues `prev`.
    fn same_line_continuation(&self, prev: &Fragment, curr: &Fragment) -> bool {
        let t = self.thresholds;
        if (prev.line_baseline() - curr.line_baseline()).abs() > t.same_line_tolerance {
            return false;
        }
        if prev.text.ends_with(char::is_whitespace)
            || curr.text.starts_with(char::is_whitespace)
            || prev.text.trim_end().ends_with('-')
        {
            return true;
        }

        let gap = prev.bbox.gap_to(&curr.bbox);
        let continuation_word = self.vocab.ends_with_continuation_word(&prev.text);
        if gap.abs() <= t.same_line_gap {
            let leading_punct = curr
                .text
                .chars()
                .next()
                .is_some_and(|c| self.vocab.leading_punctuation.contains(&c));
            let open_bracket = prev
                .text
                .chars()
                .last()
                .is_some_and(|c| self.vocab.opening_brackets.contains(&c));
            if leading_punct || open_bracket || continuation_word {
                return true;
            }
        }
        gap > t.same_line_gap && gap <= t.continuation_gap && continuation_word
    }
}

fn ends_with_sentence_mark(text: &str) -> bool {
    text.trim_end()
        .chars()
        .last()
        .is_some_and(|c| matches!(c, '.' | '!' | '?'))
}

fn starts_uppercase(text: &str) -> bool {
    text.trim_start().chars().next().is_some_and(char::is_uppercase)
}

/// Sort fragments into grouping order: block, column, baseline, left.
pub fn sort_for_grouping(fragments: &mut [Fragment]) {
    fragments.sort_by(|a, b| {
        a.block_id()
            .cmp(&b.block_id())
            .then_with(|| a.column_id().cmp(&b.column_id()))
            .then_with(|| cmp_f32(a.line_baseline(), b.line_baseline()))
            .then_with(|| cmp_f32(a.bbox.left, b.bbox.left))
            .then_with(|| a.source.cmp(&b.source))
    });
}

fn column_widths(fragments: &[Fragment]) -> HashMap<u32, f32> {
    let mut bounds: HashMap<u32, (f32, f32)> = HashMap::new();
    for f in fragments {
        let entry = bounds
            .entry(f.column_id())
            .or_insert((f.bbox.left, f.bbox.right()));
        entry.0 = entry.0.min(f.bbox.left);
        entry.1 = entry.1.max(f.bbox.right());
    }
    bounds
        .into_iter()
        .map(|(col, (min, max))| (col, max - min))
        .collect()
}

/// Group a page's fragments into paragraphs.
pub fn group_paragraphs(
    mut fragments: Vec<Fragment>,
    options: &LayoutOptions,
    diagnostics: &mut Diagnostics,
) -> Vec<Paragraph> {
    if fragments.is_empty() {
        return Vec::new();
    }
    let t = &options.thresholds;
    sort_for_grouping(&mut fragments);

    let line_height = typical_line_height(&fragments, t);
    let gap_threshold = if line_height > 0.0 {
        t.paragraph_gap_factor * line_height
    } else {
        FALLBACK_GAP_THRESHOLD
    };
    let ctx = GroupContext {
        thresholds: t,
        vocab: &options.vocabulary,
        gap_threshold,
        column_widths: column_widths(&fragments),
    };

    let mut paragraphs: Vec<Paragraph> = Vec::new();
    for mut curr in fragments {
        let Some(para) = paragraphs.last_mut() else {
            paragraphs.push(Paragraph::new(curr, 0));
            continue;
        };
        match ctx.decide(para.last(), &curr) {
            Decision::Break => {
                let order = paragraphs.len();
                paragraphs.push(Paragraph::new(curr, order));
            }
            decision => {
                let prev = para.last_mut();
                if decision == Decision::MergeAcross {
                    curr.reading_block = prev.reading_block;
                }
                if dehyphenate(prev, &mut curr, ctx.vocab) == HyphenJoin::Removed {
                    diagnostics.dehyphenations += 1;
                }
                para.push(curr);
            }
        }
    }

    log::debug!(
        "grouped {} paragraphs (gap threshold {:.1})",
        paragraphs.len(),
        gap_threshold
    );
    paragraphs
}

/// One paragraph per fragment, in grouping order. Used for reference pages
/// and for pages recovered after a failure.
pub fn paragraph_per_fragment(mut fragments: Vec<Fragment>) -> Vec<Paragraph> {
    sort_for_grouping(&mut fragments);
    fragments
        .into_iter()
        .enumerate()
        .map(|(order, f)| Paragraph::new(f, order))
        .collect()
}
