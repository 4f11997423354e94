//! Joining paragraphs split by a page break.
//!
//! Runs after every page has been grouped, strictly in page order: only the
//! last paragraph of page N and the first paragraph of page N+1 are ever
//! compared.

use super::engine::PageLayout;
use super::hyphen::{dehyphenate, HyphenJoin};
use super::{Diagnostics, LayoutOptions};
use crate::model::Paragraph;

/// Check if `next` (first paragraph of page N+1) continues `last` (last
/// paragraph of page N).
pub fn continues_onto(last: &Paragraph, next: &Paragraph, options: &LayoutOptions) -> bool {
    let vocab = &options.vocabulary;
    let tail = last.last();
    let head = next.first();

    if head.page != tail.page + 1 {
        return false;
    }
    if tail.column_id() != head.column_id() || tail.block_id() != head.block_id() {
        return false;
    }
    if (tail.font_size() - head.font_size()).abs() >= options.thresholds.font_size_delta {
        return false;
    }
    if tail.is_bold() != head.is_bold() {
        return false;
    }

    let tail_text = tail.text.trim();
    if vocab.ends_sentence(tail_text) || vocab.is_heading_like(tail_text) {
        return false;
    }

    let head_text = head.text.trim();
    if head_text.is_empty() {
        return false;
    }
    let capitalized = head_text
        .chars()
        .find(|c| c.is_alphabetic())
        .is_some_and(char::is_uppercase);
    if capitalized && !tail_text.ends_with('-') {
        return false;
    }
    !vocab.starts_new_section(head_text)
}

/// Merge paragraphs across consecutive page boundaries.
///
/// The merged paragraph stays on page N; its fragments keep their own page
/// numbers. When page N+1 held nothing but the continuation, the chain stays
/// open and page N+2 is compared against the same paragraph. Reference pages
/// never take part.
pub fn merge_across_pages(
    pages: &mut [PageLayout],
    options: &LayoutOptions,
    diagnostics: &mut Diagnostics,
) {
    // (page index, paragraph index) of a paragraph whose continuation
    // emptied the page after it.
    let mut open: Option<(usize, usize)> = None;

    for i in 1..pages.len() {
        let carried = open.take();
        let (done, rest) = pages.split_at_mut(i);
        let prev = &done[i - 1];
        let next = &mut rest[0];

        if next.number != prev.number + 1 || prev.reference_page || next.reference_page {
            continue;
        }
        let target = match prev.paragraphs.len() {
            0 => carried,
            n => Some((i - 1, n - 1)),
        };
        let Some((page_idx, para_idx)) = target else {
            continue;
        };
        let Some(first) = next.paragraphs.first() else {
            continue;
        };
        let host = &mut done[page_idx];
        let last = &mut host.paragraphs[para_idx];
        if !continues_onto(last, first, options) {
            continue;
        }

        let mut moved = next.paragraphs.remove(0);
        if dehyphenate(last.last_mut(), &mut moved.fragments[0], &options.vocabulary)
            == HyphenJoin::Removed
        {
            diagnostics.dehyphenations += 1;
        }
        last.fragments.append(&mut moved.fragments);
        diagnostics.cross_page_merges += 1;
        log::debug!(
            "paragraph on page {} continues onto page {}",
            host.number,
            next.number
        );

        if next.paragraphs.is_empty() {
            open = Some((page_idx, para_idx));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Fragment};

    fn para(page: u32, text: &str) -> Paragraph {
        let mut f = Fragment::new(page, 0, text, BBox::new(50.0, 100.0, 400.0, 10.0));
        f.column = Some(1);
        f.reading_block = Some(1);
        Paragraph::new(f, 0)
    }

    fn layout(number: u32, paragraphs: Vec<Paragraph>) -> PageLayout {
        let mut page = PageLayout::new(number, 600.0, 800.0);
        page.paragraphs = paragraphs;
        page
    }

    #[test]
    fn test_merges_lowercase_continuation() {
        let options = LayoutOptions::default();
        let mut pages = vec![
            layout(1, vec![para(1, "Intro."), para(1, "continues on the")]),
            layout(2, vec![para(2, "next page."), para(2, "Another one.")]),
        ];
        let mut diag = Diagnostics::default();
        merge_across_pages(&mut pages, &options, &mut diag);

        assert_eq!(diag.cross_page_merges, 1);
        assert_eq!(pages[0].paragraphs[1].text(), "continues on the next page.");
        assert!(pages[0].paragraphs[1].is_continued());
        assert_eq!(pages[1].paragraphs.len(), 1);
    }

    #[test]
    fn test_sentence_end_blocks_merge() {
        let options = LayoutOptions::default();
        assert!(!continues_onto(&para(1, "The end."), &para(2, "more text"), &options));
        assert!(!continues_onto(&para(1, "and so"), &para(2, "More text"), &options));
        assert!(!continues_onto(&para(1, "3. Results"), &para(2, "are shown"), &options));
        assert!(!continues_onto(&para(1, "and so"), &para(3, "on and on"), &options));
        assert!(!continues_onto(&para(1, "and so"), &para(2, "(a) first item"), &options));
    }

    #[test]
    fn test_hyphen_allows_capital() {
        let options = LayoutOptions::default();
        assert!(continues_onto(&para(1, "the pre-"), &para(2, "Columbian era"), &options));
    }

    #[test]
    fn test_cross_page_dehyphenation() {
        let options = LayoutOptions::default();
        let mut pages = vec![
            layout(1, vec![para(1, "the inter-")]),
            layout(2, vec![para(2, "national order")]),
        ];
        let mut diag = Diagnostics::default();
        merge_across_pages(&mut pages, &options, &mut diag);
        assert_eq!(pages[0].paragraphs[0].text(), "the international order");
        assert_eq!(diag.dehyphenations, 1);
        assert!(pages[1].paragraphs.is_empty());
    }

    #[test]
    fn test_reference_pages_skipped() {
        let options = LayoutOptions::default();
        let mut pages = vec![
            layout(1, vec![para(1, "continues on the")]),
            layout(2, vec![para(2, "next page.")]),
        ];
        pages[1].reference_page = true;
        let mut diag = Diagnostics::default();
        merge_across_pages(&mut pages, &options, &mut diag);
        assert_eq!(diag.cross_page_merges, 0);
        assert_eq!(pages[1].paragraphs.len(), 1);
    }

    #[test]
    fn test_chain_across_three_pages() {
        let options = LayoutOptions::default();
        let mut pages = vec![
            layout(1, vec![para(1, "Intro."), para(1, "the argument continues on the")]),
            layout(2, vec![para(2, "second page and still goes on to the")]),
            layout(3, vec![para(3, "third page where it ends."), para(3, "Fresh start.")]),
        ];
        let mut diag = Diagnostics::default();
        merge_across_pages(&mut pages, &options, &mut diag);

        assert_eq!(diag.cross_page_merges, 2);
        let counts: Vec<usize> = pages.iter().map(|p| p.paragraphs.len()).collect();
        assert_eq!(counts, vec![2, 0, 1]);
        let merged = &pages[0].paragraphs[1];
        assert_eq!(
            merged.text(),
            "the argument continues on the second page and still goes on to the \
             third page where it ends."
        );
        let spanned: Vec<u32> = merged.fragments.iter().map(|f| f.page).collect();
        assert_eq!(spanned, vec![1, 2, 3]);
    }

    #[test]
    fn test_chain_stops_at_sentence_end() {
        let options = LayoutOptions::default();
        let mut pages = vec![
            layout(1, vec![para(1, "carried over to the")]),
            layout(2, vec![para(2, "next page, where it ends.")]),
            layout(3, vec![para(3, "and this is unrelated")]),
        ];
        let mut diag = Diagnostics::default();
        merge_across_pages(&mut pages, &options, &mut diag);

        assert_eq!(diag.cross_page_merges, 1);
        assert_eq!(pages[2].paragraphs.len(), 1);
    }
}
