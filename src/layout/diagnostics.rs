//! Fallback counters.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

/// Counts of every internal fallback taken while laying out a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Fragments or items dropped for zero, negative or non-finite boxes
    pub degenerate_dropped: usize,
    /// Fragments dropped because they duplicate table or media content
    pub duplicates_dropped: usize,
    /// Running headers, footers, page numbers and print artifacts removed
    pub artifacts_dropped: usize,
    /// Scripts absorbed into their parents
    pub scripts_merged: usize,
    /// Same-line fragments merged
    pub inline_merges: usize,
    /// Pages where column detection was inconclusive
    pub ambiguous_columns: usize,
    /// Pages laid out with two or more columns
    pub multi_column_pages: usize,
    /// Line-break hyphens removed
    pub dehyphenations: usize,
    /// Table of contents, index and glossary pages
    pub reference_pages: usize,
    /// Paragraphs joined across a page break
    pub cross_page_merges: usize,
    /// Media or tables placed without a caption anchor
    pub captions_not_found: usize,
    /// Blocks split to make room for media or tables
    pub splits_applied: usize,
    /// Splits skipped for lack of a paragraph boundary
    pub splits_skipped: usize,
    /// Caption paragraphs linked to media or tables
    pub caption_links: usize,
    /// Pages emitted in fallback form after a failure
    pub pages_recovered: usize,
}

impl Diagnostics {
    /// Create empty counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add another set of counters to this one.
    pub fn merge(&mut self, other: &Diagnostics) {
        self.degenerate_dropped += other.degenerate_dropped;
        self.duplicates_dropped += other.duplicates_dropped;
        self.artifacts_dropped += other.artifacts_dropped;
        self.scripts_merged += other.scripts_merged;
        self.inline_merges += other.inline_merges;
        self.ambiguous_columns += other.ambiguous_columns;
        self.multi_column_pages += other.multi_column_pages;
        self.dehyphenations += other.dehyphenations;
        self.reference_pages += other.reference_pages;
        self.cross_page_merges += other.cross_page_merges;
        self.captions_not_found += other.captions_not_found;
        self.splits_applied += other.splits_applied;
        self.splits_skipped += other.splits_skipped;
        self.caption_links += other.caption_links;
        self.pages_recovered += other.pages_recovered;
    }

    /// Counters as (name, value) pairs, in declaration order.
    pub fn entries(&self) -> [(&'static str, usize); 15] {
        [
            ("degenerate_dropped", self.degenerate_dropped),
            ("duplicates_dropped", self.duplicates_dropped),
            ("artifacts_dropped", self.artifacts_dropped),
            ("scripts_merged", self.scripts_merged),
            ("inline_merges", self.inline_merges),
            ("ambiguous_columns", self.ambiguous_columns),
            ("multi_column_pages", self.multi_column_pages),
            ("dehyphenations", self.dehyphenations),
            ("reference_pages", self.reference_pages),
            ("cross_page_merges", self.cross_page_merges),
            ("captions_not_found", self.captions_not_found),
            ("splits_applied", self.splits_applied),
            ("splits_skipped", self.splits_skipped),
            ("caption_links", self.caption_links),
            ("pages_recovered", self.pages_recovered),
        ]
    }
}

impl AddAssign<&Diagnostics> for Diagnostics {
    fn add_assign(&mut self, rhs: &Diagnostics) {
        self.merge(rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge() {
        let mut total = Diagnostics::new();
        let page = Diagnostics {
            scripts_merged: 2,
            splits_skipped: 1,
            ..Default::default()
        };
        total += &page;
        total += &page;
        assert_eq!(total.scripts_merged, 4);
        assert_eq!(total.splits_skipped, 2);
        assert_eq!(total.entries()[3], ("scripts_merged", 4));
    }
}
