//! The layout pipeline.
//!
//! Per-page passes run independently (on the rayon pool when enabled):
//! intake, script and inline merging, column detection and assignment,
//! reading-order sequencing, reference-page classification and paragraph
//! grouping. Cross-page merging, placement, block splitting, interleave and
//! caption linking then run sequentially in page order.

use std::panic::{self, AssertUnwindSafe};

use crossbeam_channel::Sender;
use rayon::prelude::*;

use super::assign::assign_columns;
use super::columns::{detect_columns, ColumnLayout};
use super::cross_page::merge_across_pages;
use super::inline::merge_inline;
use super::intake::{intake_page, IntakePage, RunningArtifacts};
use super::lines::{assign_norm_baselines, typical_line_height};
use super::paragraphs::{group_paragraphs, paragraph_per_fragment};
use super::placement::{interleave, link_captions, place_items, split_blocks};
use super::reference::is_reference_page;
use super::script::merge_scripts;
use super::sequence::assign_reading_blocks;
use super::{Diagnostics, LayoutOptions, PageSelection};
use crate::error::{Error, Result};
use crate::model::{
    Document, DocumentInput, Fragment, MediaItem, PageInput, Paragraph, TableItem,
};

/// Progress notification sent once per finished page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A page finished its per-page passes
    PageDone {
        /// Page number
        number: u32,
        /// Number of pages being processed
        total: usize,
    },
}

/// A page between the per-page passes and the final interleave.
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    /// Page number
    pub number: u32,
    /// Page width
    pub width: f32,
    /// Page height
    pub height: f32,
    /// Printed page label
    pub label: Option<String>,
    /// Table of contents, index or glossary page
    pub reference_page: bool,
    /// Detected columns
    pub columns: ColumnLayout,
    /// Paragraphs in formation order
    pub paragraphs: Vec<Paragraph>,
    /// Media items
    pub media: Vec<MediaItem>,
    /// Table items
    pub tables: Vec<TableItem>,
    /// Counters for this page
    pub diagnostics: Diagnostics,
}

impl PageLayout {
    /// Create an empty page layout.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            ..Default::default()
        }
    }
}

/// Result of the fragment passes of one page.
struct Analysis {
    columns: ColumnLayout,
    reference_page: bool,
    paragraphs: Vec<Paragraph>,
    diagnostics: Diagnostics,
}

/// Run the fragment passes of one page, from script merging to paragraphs.
fn analyze(
    mut fragments: Vec<Fragment>,
    page_width: f32,
    page_height: f32,
    options: &LayoutOptions,
) -> Analysis {
    let t = &options.thresholds;
    let mut diag = Diagnostics::default();

    assign_norm_baselines(&mut fragments, t);
    merge_scripts(&mut fragments, options, &mut diag);
    merge_inline(&mut fragments, options, &mut diag);
    assign_norm_baselines(&mut fragments, t);

    let columns = detect_columns(&fragments, page_width, t);
    if columns.ambiguous {
        diag.ambiguous_columns += 1;
    }
    if columns.is_multi_column() {
        diag.multi_column_pages += 1;
    }
    let line_height = typical_line_height(&fragments, t);
    assign_columns(
        &mut fragments,
        &columns,
        page_width,
        page_height,
        line_height,
        t,
    );
    assign_reading_blocks(&mut fragments);

    let reference_page = is_reference_page(&fragments, &options.vocabulary);
    let paragraphs = if reference_page {
        diag.reference_pages += 1;
        paragraph_per_fragment(fragments)
    } else {
        group_paragraphs(fragments, options, &mut diag)
    };

    Analysis {
        columns,
        reference_page,
        paragraphs,
        diagnostics: diag,
    }
}

/// Every fragment as its own paragraph, in intake order.
fn recover(fragments: Vec<Fragment>) -> Vec<Paragraph> {
    fragments
        .into_iter()
        .enumerate()
        .map(|(order, mut f)| {
            f.column = Some(0);
            f.reading_block = Some(1);
            Paragraph::new(f, order)
        })
        .collect()
}

/// Reading-order engine.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    options: LayoutOptions,
    progress: Option<Sender<ProgressEvent>>,
}

impl LayoutEngine {
    /// Create an engine with the given options.
    pub fn new(options: LayoutOptions) -> Self {
        Self {
            options,
            progress: None,
        }
    }

    /// Report finished pages over a channel.
    pub fn with_progress(mut self, sender: Sender<ProgressEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Get the options.
    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Order a whole document.
    pub fn process(&self, input: DocumentInput) -> Result<Document> {
        let numbered: Vec<(u32, &PageInput)> = input
            .pages
            .iter()
            .enumerate()
            .map(|(idx, page)| {
                let number = if page.number > 0 {
                    page.number
                } else {
                    idx as u32 + 1
                };
                (number, page)
            })
            .collect();
        self.check_selection(&numbered)?;

        let selected: Vec<(u32, &PageInput)> = numbered
            .into_iter()
            .filter(|(number, _)| self.options.pages.includes(*number))
            .collect();
        let total = selected.len();
        let running = RunningArtifacts::collect(&input.pages, &self.options);
        if !running.is_empty() {
            log::debug!("{} running header/footer texts", running.len());
        }

        let results: Vec<Result<PageLayout>> = if self.options.parallel {
            selected
                .par_iter()
                .map(|(number, page)| self.layout_page(page, *number, total, &running))
                .collect()
        } else {
            selected
                .iter()
                .map(|(number, page)| self.layout_page(page, *number, total, &running))
                .collect()
        };
        let mut layouts = results.into_iter().collect::<Result<Vec<_>>>()?;
        layouts.sort_by_key(|l| l.number);

        let mut sequential = Diagnostics::default();
        if self.options.merge_across_pages {
            merge_across_pages(&mut layouts, &self.options, &mut sequential);
        }

        let mut document = Document::new();
        for mut layout in layouts {
            let mut diag = std::mem::take(&mut layout.diagnostics);
            place_items(&mut layout, &self.options, &mut diag);
            split_blocks(&mut layout, &self.options, &mut diag);
            let mut page = interleave(layout);
            if self.options.link_captions {
                link_captions(&mut page, &self.options, &mut diag);
            }
            document.diagnostics += &diag;
            document.pages.push(page);
        }
        document.diagnostics += &sequential;

        let d = &document.diagnostics;
        log::info!(
            "ordered {} pages: {} multi-column, {} reference, {} cross-page merges, {} recovered",
            document.pages.len(),
            d.multi_column_pages,
            d.reference_pages,
            d.cross_page_merges,
            d.pages_recovered
        );
        Ok(document)
    }

    /// Explicitly selected pages must exist.
    fn check_selection(&self, numbered: &[(u32, &PageInput)]) -> Result<()> {
        let count = numbered.len() as u32;
        let exists = |page: u32| numbered.iter().any(|(n, _)| *n == page);
        match &self.options.pages {
            PageSelection::All => Ok(()),
            PageSelection::Range(range) => {
                if exists(*range.start()) {
                    Ok(())
                } else {
                    Err(Error::PageOutOfRange(*range.start(), count))
                }
            }
            PageSelection::Pages(pages) => match pages.iter().find(|p| !exists(**p)) {
                Some(missing) => Err(Error::PageOutOfRange(*missing, count)),
                None => Ok(()),
            },
        }
    }

    /// Run the per-page passes. Only strict-mode intake errors escape; a
    /// panic in the later passes yields the page in fallback form.
    fn layout_page(
        &self,
        input: &PageInput,
        number: u32,
        total: usize,
        running: &RunningArtifacts,
    ) -> Result<PageLayout> {
        let mut diagnostics = Diagnostics::default();
        let intake = intake_page(input, number, &self.options, running, &mut diagnostics)
            .inspect_err(|e| log::warn!("page {number} rejected: {e}"))?;
        let IntakePage {
            number,
            width,
            height,
            label,
            fragments,
            media,
            tables,
        } = intake;

        let analyzed = panic::catch_unwind(AssertUnwindSafe(|| {
            analyze(fragments.clone(), width, height, &self.options)
        }));
        let mut layout = PageLayout {
            number,
            width,
            height,
            label,
            media,
            tables,
            ..Default::default()
        };
        match analyzed {
            Ok(analysis) => {
                layout.columns = analysis.columns;
                layout.reference_page = analysis.reference_page;
                layout.paragraphs = analysis.paragraphs;
                diagnostics += &analysis.diagnostics;
            }
            Err(_) => {
                log::warn!(
                    "page {number}: layout passes failed, keeping fragments in intake order"
                );
                layout.paragraphs = recover(fragments);
                diagnostics.pages_recovered += 1;
            }
        }
        layout.diagnostics = diagnostics;

        if let Some(progress) = &self.progress {
            let _ = progress.send(ProgressEvent::PageDone { number, total });
        }
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ErrorMode;
    use crate::model::{FragmentInput, MediaInput, MediaKind};

    fn line(text: &str, left: f32, top: f32, width: f32) -> FragmentInput {
        FragmentInput::new(text, left, top, width, 10.0).with_size(10.0)
    }

    fn body_page(number: u32) -> PageInput {
        let mut page = PageInput::new(number, 600.0, 800.0);
        for i in 0..6 {
            let top = 200.0 + i as f32 * 12.0;
            page = page.with_fragment(line("plain body text line goes on", 50.0, top, 500.0));
        }
        page
    }

    #[test]
    fn test_empty_document() {
        let doc = LayoutEngine::default()
            .process(DocumentInput::default())
            .unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.diagnostics, Diagnostics::default());
    }

    #[test]
    fn test_single_page_one_paragraph() {
        let doc = LayoutEngine::default()
            .process(DocumentInput::new(vec![body_page(1)]))
            .unwrap();
        assert_eq!(doc.page_count(), 1);
        let page = &doc.pages[0];
        assert_eq!(page.paragraphs().count(), 1);
        assert!(!page.is_multi_column());
    }

    #[test]
    fn test_page_numbers_default_to_position() {
        let doc = LayoutEngine::default()
            .process(DocumentInput::new(vec![body_page(0), body_page(0)]))
            .unwrap();
        let numbers: Vec<u32> = doc.pages.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn test_page_selection() {
        let input = DocumentInput::new(vec![body_page(1), body_page(2), body_page(3)]);
        let options = LayoutOptions::default().with_pages(PageSelection::Pages(vec![2]));
        let doc = LayoutEngine::new(options).process(input.clone()).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.pages[0].number, 2);

        let options = LayoutOptions::default().with_pages(PageSelection::Pages(vec![7]));
        let err = LayoutEngine::new(options).process(input).unwrap_err();
        assert!(matches!(err, Error::PageOutOfRange(7, 3)));
    }

    #[test]
    fn test_strict_mode_rejects_degenerate() {
        let page = body_page(1).with_fragment(line("broken", 50.0, 400.0, 0.0));
        let input = DocumentInput::new(vec![page]);

        let doc = LayoutEngine::default().process(input.clone()).unwrap();
        assert_eq!(doc.diagnostics.degenerate_dropped, 1);

        let options = LayoutOptions::default().with_error_mode(ErrorMode::Strict);
        let err = LayoutEngine::new(options).process(input).unwrap_err();
        assert!(matches!(err, Error::DegenerateGeometry { page: 1, .. }));
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let input = DocumentInput::new(vec![body_page(1), body_page(2)]);
        let parallel = LayoutEngine::default().process(input.clone()).unwrap();
        let sequential = LayoutEngine::new(LayoutOptions::default().with_parallel(false))
            .process(input)
            .unwrap();
        assert_eq!(
            serde_json::to_string(&parallel).unwrap(),
            serde_json::to_string(&sequential).unwrap()
        );
    }

    #[test]
    fn test_progress_events() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let engine = LayoutEngine::default().with_progress(tx);
        engine
            .process(DocumentInput::new(vec![body_page(1), body_page(2)]))
            .unwrap();
        let mut numbers: Vec<u32> = rx
            .try_iter()
            .map(|ProgressEvent::PageDone { number, total }| {
                assert_eq!(total, 2);
                number
            })
            .collect();
        numbers.sort_unstable();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn test_media_only_page() {
        let page = PageInput::new(1, 600.0, 800.0).with_media(MediaInput::new(
            "img",
            MediaKind::Image,
            crate::model::BBox::new(100.0, 100.0, 200.0, 200.0),
        ));
        let doc = LayoutEngine::default()
            .process(DocumentInput::new(vec![page]))
            .unwrap();
        assert_eq!(doc.pages[0].elements.len(), 1);
        assert!(doc.pages[0].elements[0].is_media());
        assert_eq!(doc.diagnostics.captions_not_found, 1);
    }

    #[test]
    fn test_recover_keeps_every_fragment() {
        use crate::model::BBox;
        let frags = vec![
            Fragment::new(1, 0, "a", BBox::new(0.0, 0.0, 10.0, 10.0)),
            Fragment::new(1, 1, "b", BBox::new(0.0, 20.0, 10.0, 10.0)),
        ];
        let paras = recover(frags);
        assert_eq!(paras.len(), 2);
        assert_eq!(paras[1].text(), "b");
        assert_eq!(paras[1].reading_block, 1);
    }
}
