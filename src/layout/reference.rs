//! Reference page classification (table of contents, index, glossary).
//!
//! Reference pages are lists of short entries, usually ending in page
//! numbers. Their fragments are kept as independent units and never merged
//! into paragraphs or across pages.

use super::lines::cmp_f32;
use super::Vocabulary;
use crate::model::Fragment;

/// Fragments (top to bottom) scanned for a keyword.
const KEYWORD_SCAN: usize = 10;

/// Entries shorter than this are not counted.
const MIN_ENTRY_CHARS: usize = 3;

/// Minimum counted entries before the trailing-number ratio means anything.
const MIN_ENTRIES: usize = 3;

/// Trailing-number ratio required alongside a keyword.
const KEYWORD_NUMBER_RATIO: f32 = 0.1;

/// Trailing-number ratio that marks a reference page on its own.
const NUMBER_RATIO: f32 = 0.5;

/// Share of entries ending in a page number.
pub fn trailing_number_ratio(fragments: &[Fragment], vocab: &Vocabulary) -> f32 {
    let entries: Vec<&str> = fragments
        .iter()
        .map(|f| f.text.trim())
        .filter(|t| t.chars().count() >= MIN_ENTRY_CHARS)
        .collect();
    if entries.len() < MIN_ENTRIES {
        return 0.0;
    }
    let numbered = entries
        .iter()
        .filter(|t| vocab.trailing_page_number.is_match(t))
        .count();
    numbered as f32 / entries.len() as f32
}

/// Check if the page is a table of contents, index, glossary or similar.
pub fn is_reference_page(fragments: &[Fragment], vocab: &Vocabulary) -> bool {
    if fragments.is_empty() {
        return false;
    }

    let mut by_position: Vec<&Fragment> = fragments.iter().collect();
    by_position.sort_by(|a, b| {
        cmp_f32(a.bbox.top, b.bbox.top)
            .then_with(|| cmp_f32(a.bbox.left, b.bbox.left))
            .then_with(|| a.source.cmp(&b.source))
    });
    let opening = by_position
        .iter()
        .take(KEYWORD_SCAN)
        .map(|f| f.text.trim())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let keyword = vocab
        .reference_keywords
        .iter()
        .any(|k| opening.contains(k.as_str()));
    let strong = vocab
        .strong_reference_keywords
        .iter()
        .any(|k| opening.contains(k.as_str()));
    let ratio = trailing_number_ratio(fragments, vocab);

    (keyword && ratio > KEYWORD_NUMBER_RATIO) || ratio > NUMBER_RATIO || strong
}
