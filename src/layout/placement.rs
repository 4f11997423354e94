//! Media and table placement, block splitting, interleave and caption links.
//!
//! Items are anchored to text: a matching caption when one is close enough,
//! otherwise the last fragment above the item. An item that lands inside a
//! block's vertical span splits the block at the nearest paragraph gap above
//! it. Finally paragraphs and items are merged into one ordered element list.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use regex::Regex;

use super::engine::PageLayout;
use super::lines::{cmp_f32, median};
use super::{Diagnostics, LayoutOptions, Thresholds, Vocabulary};
use crate::model::{
    BBox, Block, Fragment, MediaItem, Page, Paragraph, ReadingPosition, TableItem,
};

/// Anything that is positioned into the text flow.
trait Placed {
    fn bbox(&self) -> BBox;
    fn position(&self) -> Option<ReadingPosition>;
    fn set_position(&mut self, position: ReadingPosition);
    fn caption_pattern<'a>(&self, vocab: &'a Vocabulary) -> &'a Regex;
}

impl Placed for MediaItem {
    fn bbox(&self) -> BBox {
        self.bbox
    }

    fn position(&self) -> Option<ReadingPosition> {
        self.position
    }

    fn set_position(&mut self, position: ReadingPosition) {
        self.position = Some(position);
    }

    fn caption_pattern<'a>(&self, vocab: &'a Vocabulary) -> &'a Regex {
        &vocab.figure_caption
    }
}

impl Placed for TableItem {
    fn bbox(&self) -> BBox {
        self.bbox
    }

    fn position(&self) -> Option<ReadingPosition> {
        self.position
    }

    fn set_position(&mut self, position: ReadingPosition) {
        self.position = Some(position);
    }

    fn caption_pattern<'a>(&self, vocab: &'a Vocabulary) -> &'a Regex {
        &vocab.table_caption
    }
}

/// Fragments of the page's own paragraphs that physically lie on the page.
fn page_fragments(paragraphs: &[Paragraph], page: u32) -> Vec<&Fragment> {
    paragraphs
        .iter()
        .flat_map(|p| &p.fragments)
        .filter(|f| f.page == page)
        .collect()
}

fn anchored_at(frag: &Fragment, epsilon: f32, caption: bool) -> ReadingPosition {
    ReadingPosition {
        block: frag.block_id(),
        key: frag.line_baseline() + epsilon,
        column: frag.column_id(),
        anchor: Some(frag.source),
        caption_anchored: caption,
    }
}

/// Nearest caption-matching fragment within the search radius.
fn find_caption<'a>(
    item: &impl Placed,
    fragments: &[&'a Fragment],
    vocab: &Vocabulary,
    t: &Thresholds,
) -> Option<&'a Fragment> {
    let pattern = item.caption_pattern(vocab);
    let center = item.bbox().center_y();
    fragments
        .iter()
        .map(|f| ((f.bbox.center_y() - center).abs(), *f))
        .filter(|(d, f)| *d <= t.caption_radius && pattern.is_match(f.text.trim()))
        .min_by(|(da, a), (db, b)| cmp_f32(*da, *db).then_with(|| a.source.cmp(&b.source)))
        .map(|(_, f)| f)
}

/// Last fragment (by baseline) starting above the item.
fn preceding_fragment<'a>(
    item: &impl Placed,
    fragments: &[&'a Fragment],
) -> Option<&'a Fragment> {
    let top = item.bbox().top;
    fragments
        .iter()
        .filter(|f| f.bbox.top < top)
        .max_by(|a, b| {
            cmp_f32(a.line_baseline(), b.line_baseline()).then_with(|| b.source.cmp(&a.source))
        })
        .copied()
}

fn place_one(
    item: &mut impl Placed,
    fragments: &[&Fragment],
    options: &LayoutOptions,
    diagnostics: &mut Diagnostics,
) {
    let t = &options.thresholds;
    let eps = t.position_epsilon;
    let position = match find_caption(item, fragments, &options.vocabulary, t) {
        Some(caption) => anchored_at(caption, eps, true),
        None => {
            diagnostics.captions_not_found += 1;
            preceding_fragment(item, fragments)
                .map(|f| anchored_at(f, eps, false))
                .unwrap_or_else(|| ReadingPosition::page_start(eps))
        }
    };
    item.set_position(position);
}

/// Compute a reading position for every media and table item on the page.
pub fn place_items(page: &mut PageLayout, options: &LayoutOptions, diagnostics: &mut Diagnostics) {
    let PageLayout {
        number,
        paragraphs,
        media,
        tables,
        ..
    } = page;
    let fragments = page_fragments(paragraphs, *number);
    for item in media.iter_mut() {
        place_one(item, &fragments, options, diagnostics);
    }
    for item in tables.iter_mut() {
        place_one(item, &fragments, options, diagnostics);
    }
}

/// Vertical extent and paragraph gaps of one reading block.
#[derive(Debug, Clone, Default)]
struct BlockSpan {
    top: f32,
    bottom: f32,
    boundaries: Vec<f32>,
}

fn block_spans(fragments: &[&Fragment], t: &Thresholds) -> BTreeMap<u32, BlockSpan> {
    let mut by_block: BTreeMap<u32, Vec<&Fragment>> = BTreeMap::new();
    for &f in fragments {
        by_block.entry(f.block_id()).or_default().push(f);
    }

    by_block
        .into_iter()
        .map(|(block, mut frags)| {
            frags.sort_by(|a, b| {
                cmp_f32(a.bbox.top, b.bbox.top).then_with(|| a.source.cmp(&b.source))
            });
            let mut heights: Vec<f32> = frags
                .iter()
                .map(|f| f.bbox.height)
                .filter(|h| *h > 0.0)
                .collect();
            let line_height = median(&mut heights).unwrap_or(t.default_line_height);
            let gap_threshold = t.paragraph_gap_factor * line_height;

            let boundaries = frags
                .windows(2)
                .filter(|w| w[1].bbox.top - w[0].bbox.bottom() > gap_threshold)
                .map(|w| w[0].bbox.bottom())
                .collect();
            let span = BlockSpan {
                top: frags.iter().map(|f| f.bbox.top).fold(f32::INFINITY, f32::min),
                bottom: frags
                    .iter()
                    .map(|f| f.bbox.bottom())
                    .fold(f32::NEG_INFINITY, f32::max),
                boundaries,
            };
            (block, span)
        })
        .collect()
}

/// A split of `block` at height `y`: everything starting below `y` moves to
/// a later block.
#[derive(Debug, Clone, Copy)]
struct Split {
    block: u32,
    y: f32,
}

fn find_split(
    item: &impl Placed,
    spans: &BTreeMap<u32, BlockSpan>,
    t: &Thresholds,
    diagnostics: &mut Diagnostics,
) -> Option<Split> {
    let block = item.position()?.block;
    let span = spans.get(&block)?;
    let top = item.bbox().top;
    let tol = t.split_edge_tolerance;
    if top <= span.top + tol || top >= span.bottom - tol {
        return None;
    }
    let boundary = span
        .boundaries
        .iter()
        .copied()
        .filter(|y| *y < top)
        .max_by(|a, b| cmp_f32(*a, *b));
    match boundary {
        Some(y) => Some(Split { block, y }),
        None => {
            log::debug!("no paragraph gap above item at y={top:.1} in block {block}");
            diagnostics.splits_skipped += 1;
            None
        }
    }
}

fn shifted_block(block: u32, top: f32, splits: &[Split]) -> u32 {
    let earlier = splits.iter().filter(|s| s.block < block).count();
    let above = splits.iter().filter(|s| s.block == block && top > s.y).count();
    block + (earlier + above) as u32
}

/// Split reading blocks around items that sit inside them.
pub fn split_blocks(page: &mut PageLayout, options: &LayoutOptions, diagnostics: &mut Diagnostics) {
    let t = &options.thresholds;
    let mut splits = {
        let fragments = page_fragments(&page.paragraphs, page.number);
        let spans = block_spans(&fragments, t);
        let mut found = Vec::new();
        for item in &page.media {
            found.extend(find_split(item, &spans, t, diagnostics));
        }
        for item in &page.tables {
            found.extend(find_split(item, &spans, t, diagnostics));
        }
        found
    };
    if splits.is_empty() {
        return;
    }
    splits.sort_by(|a, b| a.block.cmp(&b.block).then_with(|| cmp_f32(a.y, b.y)));
    splits.dedup_by(|a, b| a.block == b.block && a.y.total_cmp(&b.y) == Ordering::Equal);
    diagnostics.splits_applied += splits.len();
    log::debug!("page {}: {} block splits", page.number, splits.len());

    let number = page.number;
    for para in &mut page.paragraphs {
        for frag in para.fragments.iter_mut().filter(|f| f.page == number) {
            frag.reading_block = Some(shifted_block(frag.block_id(), frag.bbox.top, &splits));
        }
        para.reading_block = para.current_block();
    }
    for item in &mut page.media {
        shift_item(item, &splits);
    }
    for item in &mut page.tables {
        shift_item(item, &splits);
    }
}

fn shift_item(item: &mut impl Placed, splits: &[Split]) {
    if let Some(mut position) = item.position() {
        position.block = shifted_block(position.block, item.bbox().top, splits);
        item.set_position(position);
    }
}

/// Sort key of one element in the interleave.
///
/// Items sit right after the paragraph holding their anchor when that
/// paragraph is in the same block, otherwise at the start of their block.
#[derive(Debug, Clone, Copy)]
struct InterleaveKey {
    block: u32,
    after: Option<usize>,
    item: bool,
    key: f32,
    index: usize,
}

impl InterleaveKey {
    fn order(&self, other: &Self) -> Ordering {
        self.block
            .cmp(&other.block)
            .then_with(|| self.after.cmp(&other.after))
            .then_with(|| self.item.cmp(&other.item))
            .then_with(|| cmp_f32(self.key, other.key))
            .then_with(|| self.index.cmp(&other.index))
    }
}

fn item_key(
    position: Option<ReadingPosition>,
    paragraphs: &[Paragraph],
    page: u32,
    index: usize,
) -> InterleaveKey {
    let position = position.unwrap_or_else(|| ReadingPosition::page_start(0.0));
    let after = position.anchor.and_then(|anchor| {
        paragraphs.iter().position(|p| {
            p.reading_block == position.block
                && p.fragments.iter().any(|f| f.page == page && f.source == anchor)
        })
    });
    InterleaveKey {
        block: position.block,
        after,
        item: true,
        key: position.key,
        index,
    }
}

/// Build the final page: paragraphs and items in one ordered list.
pub fn interleave(layout: PageLayout) -> Page {
    let PageLayout {
        number,
        width,
        height,
        label,
        reference_page,
        columns,
        mut paragraphs,
        media,
        tables,
        ..
    } = layout;

    for para in &mut paragraphs {
        para.reading_block = para.current_block();
    }

    let mut keyed: Vec<(InterleaveKey, Block)> = Vec::new();
    let media_count = media.len();
    for (i, item) in media.into_iter().enumerate() {
        keyed.push((item_key(item.position, &paragraphs, number, i), Block::Media(item)));
    }
    for (i, item) in tables.into_iter().enumerate() {
        let key = item_key(item.position, &paragraphs, number, media_count + i);
        keyed.push((key, Block::Table(item)));
    }
    for (i, para) in paragraphs.into_iter().enumerate() {
        let key = InterleaveKey {
            block: para.reading_block,
            after: Some(i),
            item: false,
            key: 0.0,
            index: i,
        };
        keyed.push((key, Block::Paragraph(para)));
    }
    keyed.sort_by(|(a, _), (b, _)| a.order(b));

    let mut page = Page::new(number, width, height);
    page.label = label;
    page.reference_page = reference_page;
    page.columns = if columns.is_multi_column() {
        columns.starts
    } else {
        Vec::new()
    };
    page.elements = keyed.into_iter().map(|(_, block)| block).collect();
    page
}

/// Check if the item was placed by a caption inside `para`. A block split
/// can move such an item into the block after its caption.
fn anchored_to(block: &Block, para: &Paragraph) -> bool {
    let position = match block {
        Block::Media(m) => m.position,
        Block::Table(t) => t.position,
        Block::Paragraph(_) => None,
    };
    position
        .filter(|p| p.caption_anchored)
        .and_then(|p| p.anchor)
        .is_some_and(|anchor| {
            para.fragments
                .iter()
                .any(|f| f.page == para.page && f.source == anchor)
        })
}

/// Link caption paragraphs to the nearest item of the same block.
///
/// An item may follow its caption by up to `caption_window_after` elements
/// or precede it by up to `caption_window_before`. Element order is left
/// untouched.
pub fn link_captions(page: &mut Page, options: &LayoutOptions, diagnostics: &mut Diagnostics) {
    let t = &options.thresholds;
    let vocab = &options.vocabulary;

    let mut links: Vec<(usize, usize)> = Vec::new();
    for (pi, block) in page.elements.iter().enumerate() {
        let Block::Paragraph(para) = block else {
            continue;
        };
        let text = para.text();
        if !vocab.figure_label.is_match(&text) && !vocab.table_label.is_match(&text) {
            continue;
        }
        let best = page
            .elements
            .iter()
            .enumerate()
            .filter(|(_, b)| {
                !b.is_paragraph()
                    && (b.reading_block() == para.reading_block || anchored_to(b, para))
            })
            .filter(|(mi, _)| !links.iter().any(|(_, linked)| linked == mi))
            .filter_map(|(mi, _)| {
                let distance = mi.abs_diff(pi);
                let window = if mi > pi {
                    t.caption_window_after
                } else {
                    t.caption_window_before
                };
                (distance <= window).then_some((distance, mi))
            })
            .min();
        if let Some((_, mi)) = best {
            links.push((pi, mi));
        }
    }

    for (pi, mi) in links {
        let id = match &mut page.elements[mi] {
            Block::Media(m) => {
                m.caption = Some(pi);
                m.id.clone()
            }
            Block::Table(table) => {
                table.caption = Some(pi);
                table.id.clone()
            }
            Block::Paragraph(_) => continue,
        };
        if let Block::Paragraph(para) = &mut page.elements[pi] {
            para.caption_for = Some(id);
        }
        diagnostics.caption_links += 1;
    }
}
