//! Fragment intake: validation, normalization, artifact removal and
//! deduplication against table and media boxes.

use std::collections::{HashMap, HashSet};

use super::lines::cmp_f32;
use super::{Diagnostics, ErrorMode, LayoutOptions, TextNormalizer};
use crate::error::{Error, Result};
use crate::model::{
    BBox, Fragment, FragmentInput, MediaItem, PageInput, Table, TableCell, TableItem, TableRow,
    TextRun,
};

/// Relative zone (fraction of page height) searched for running headers and
/// footers when gathering statistics.
const RUNNING_SCAN_ZONE: f32 = 0.12;

/// A page after intake, ready for the layout passes.
#[derive(Debug, Clone)]
pub struct IntakePage {
    /// Page number
    pub number: u32,
    /// Page width
    pub width: f32,
    /// Page height
    pub height: f32,
    /// Printed page label, when one was found
    pub label: Option<String>,
    /// Surviving fragments sorted by (baseline, left, intake index)
    pub fragments: Vec<Fragment>,
    /// Media items
    pub media: Vec<MediaItem>,
    /// Table items
    pub tables: Vec<TableItem>,
}

type RunningKey = (i32, i32, String);

/// Running header/footer texts repeated across the document.
#[derive(Debug, Clone, Default)]
pub struct RunningArtifacts {
    keys: HashSet<RunningKey>,
}

impl RunningArtifacts {
    /// Collect header/footer candidates over all pages.
    pub fn collect(pages: &[PageInput], options: &LayoutOptions) -> Self {
        if !options.filter_artifacts || pages.is_empty() {
            return Self::default();
        }
        let normalizer = TextNormalizer::new(options.normalize);
        let mut seen: HashMap<RunningKey, HashSet<usize>> = HashMap::new();

        for (page_idx, page) in pages.iter().enumerate() {
            if !valid_size(page.width, page.height) {
                continue;
            }
            for frag in &page.fragments {
                let rel_top = frag.top / page.height;
                if rel_top >= RUNNING_SCAN_ZONE && rel_top <= 1.0 - RUNNING_SCAN_ZONE {
                    continue;
                }
                if let Some(key) = running_key(frag, page, &normalizer, options) {
                    seen.entry(key).or_default().insert(page_idx);
                }
            }
        }

        let page_count = pages.len();
        let min_pages = if page_count >= 500 {
            (page_count / 100).max(10)
        } else {
            (page_count / 10).max(3)
        };
        let keys: HashSet<RunningKey> = seen
            .into_iter()
            .filter(|(_, pages)| pages.len() >= min_pages)
            .map(|(key, _)| key)
            .collect();
        log::debug!(
            "running header/footer keys: {} (min {} pages)",
            keys.len(),
            min_pages
        );
        Self { keys }
    }

    /// Number of repeated header/footer texts.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if no header/footer was found.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn matches(
        &self,
        frag: &FragmentInput,
        page: &PageInput,
        normalizer: &TextNormalizer,
        options: &LayoutOptions,
    ) -> bool {
        if self.keys.is_empty() {
            return false;
        }
        let rel_top = frag.top / page.height;
        let t = &options.thresholds;
        if rel_top >= t.header_zone && rel_top <= t.footer_zone {
            return false;
        }
        running_key(frag, page, normalizer, options).is_some_and(|k| self.keys.contains(&k))
    }
}

fn running_key(
    frag: &FragmentInput,
    page: &PageInput,
    normalizer: &TextNormalizer,
    options: &LayoutOptions,
) -> Option<RunningKey> {
    let text = normalizer
        .normalize(&frag.text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let len = text.chars().count();
    if !(5..=100).contains(&len) || options.vocabulary.mentions_caption(&text) {
        return None;
    }
    let top = (frag.top / page.height * 10.0).round() as i32;
    let left = (frag.left / page.width * 10.0).round() as i32;
    Some((top, left, text))
}

fn valid_size(width: f32, height: f32) -> bool {
    width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0
}

/// Validate and convert one page of input.
pub fn intake_page(
    input: &PageInput,
    number: u32,
    options: &LayoutOptions,
    running: &RunningArtifacts,
    diagnostics: &mut Diagnostics,
) -> Result<IntakePage> {
    let strict = options.error_mode == ErrorMode::Strict;
    let (width, height) = page_size(input, number, strict)?;
    let sized = PageInput {
        width,
        height,
        ..PageInput::default()
    };

    let tables = intake_tables(input, number, strict, diagnostics)?;
    let media = intake_media(input, number, strict, diagnostics)?;

    let normalizer = TextNormalizer::new(options.normalize);
    let mut fragments = Vec::with_capacity(input.fragments.len());
    for (idx, raw) in input.fragments.iter().enumerate() {
        let bbox = raw.bbox();
        if bbox.is_degenerate() {
            if strict {
                return Err(Error::DegenerateGeometry {
                    page: number,
                    what: format!("fragment {idx} has box {bbox:?}"),
                });
            }
            diagnostics.degenerate_dropped += 1;
            continue;
        }

        let runs: Vec<TextRun> = raw
            .text_runs()
            .into_iter()
            .map(|run| TextRun::new(normalizer.normalize(&run.text), run.style))
            .collect();
        let mut fragment = Fragment::with_runs(number, idx, runs, bbox);
        if fragment.is_blank() {
            continue;
        }
        fragment.table_cell = raw.table_cell.clone();

        if options.filter_artifacts
            && (is_artifact(raw, &fragment, width, height, options)
                || running.matches(raw, &sized, &normalizer, options))
        {
            diagnostics.artifacts_dropped += 1;
            continue;
        }
        fragments.push(fragment);
    }

    let label = if options.filter_artifacts {
        take_page_label(&mut fragments, height, options)
    } else {
        None
    };
    if label.is_some() {
        diagnostics.artifacts_dropped += 1;
    }

    let before = fragments.len();
    fragments.retain(|f| f.table_cell.is_some() || !is_duplicate(&f.bbox, &tables, &media));
    diagnostics.duplicates_dropped += before - fragments.len();

    fragments.sort_by(|a, b| {
        cmp_f32(a.baseline(), b.baseline())
            .then_with(|| cmp_f32(a.bbox.left, b.bbox.left))
            .then_with(|| a.source.cmp(&b.source))
    });

    Ok(IntakePage {
        number,
        width,
        height,
        label,
        fragments,
        media,
        tables,
    })
}

fn page_size(input: &PageInput, number: u32, strict: bool) -> Result<(f32, f32)> {
    if valid_size(input.width, input.height) {
        return Ok((input.width, input.height));
    }
    if strict {
        return Err(Error::InvalidInput(format!(
            "page {number} has size {}x{}",
            input.width, input.height
        )));
    }
    // Fall back to the extent of the content.
    let extent = input
        .fragments
        .iter()
        .map(FragmentInput::bbox)
        .chain(input.media.iter().map(|m| m.bbox()))
        .chain(input.tables.iter().map(|t| t.bbox()))
        .filter(|b| !b.is_degenerate())
        .fold((1.0f32, 1.0f32), |(w, h), b| (w.max(b.right()), h.max(b.bottom())));
    log::warn!(
        "page {number}: invalid size {}x{}, using content extent {}x{}",
        input.width,
        input.height,
        extent.0,
        extent.1
    );
    Ok(extent)
}

fn intake_tables(
    input: &PageInput,
    number: u32,
    strict: bool,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<TableItem>> {
    let mut tables = Vec::with_capacity(input.tables.len());
    for (idx, raw) in input.tables.iter().enumerate() {
        let bbox = raw.bbox();
        if bbox.is_degenerate() {
            if strict {
                return Err(Error::DegenerateGeometry {
                    page: number,
                    what: format!("table {idx} has box {bbox:?}"),
                });
            }
            diagnostics.degenerate_dropped += 1;
            continue;
        }
        let mut table = Table::new();
        for row in &raw.rows {
            table.add_row(TableRow::new(
                row.iter()
                    .map(|cell| TableCell {
                        text: cell.text.clone(),
                        bbox: cell.bbox.filter(|b| !b.is_degenerate()),
                        rowspan: cell.rowspan.max(1),
                        colspan: cell.colspan.max(1),
                    })
                    .collect(),
            ));
        }
        let id = if raw.id.is_empty() {
            format!("p{number}-table{}", idx + 1)
        } else {
            raw.id.clone()
        };
        tables.push(TableItem::new(id, bbox, table));
    }
    Ok(tables)
}

fn intake_media(
    input: &PageInput,
    number: u32,
    strict: bool,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<MediaItem>> {
    let mut media = Vec::with_capacity(input.media.len());
    for (idx, raw) in input.media.iter().enumerate() {
        let bbox = raw.bbox();
        if bbox.is_degenerate() {
            if strict {
                return Err(Error::DegenerateGeometry {
                    page: number,
                    what: format!("media {idx} has box {bbox:?}"),
                });
            }
            diagnostics.degenerate_dropped += 1;
            continue;
        }
        let id = if raw.id.is_empty() {
            format!("p{number}-media{}", idx + 1)
        } else {
            raw.id.clone()
        };
        media.push(MediaItem::new(id, raw.kind, bbox));
    }
    Ok(media)
}

fn is_artifact(
    raw: &FragmentInput,
    fragment: &Fragment,
    width: f32,
    height: f32,
    options: &LayoutOptions,
) -> bool {
    let bbox = fragment.bbox;
    if bbox.top > height * 1.05 || bbox.top < -20.0 {
        return true;
    }
    if bbox.height < options.thresholds.min_fragment_height {
        return true;
    }
    if options.vocabulary.is_print_artifact(&fragment.text) {
        return true;
    }
    is_spine_text(raw, fragment, width)
}

fn is_spine_text(raw: &FragmentInput, fragment: &Fragment, width: f32) -> bool {
    if fragment.text.trim().chars().count() > 3 || fragment.bbox.left <= width * 0.8 {
        return false;
    }
    let rotation = raw.rotation.rem_euclid(360.0).round() as i32;
    rotation == 90 || rotation == 270 || fragment.bbox.height > fragment.bbox.width * 2.0
}

/// Remove an isolated page number near the top or bottom edge and return it.
/// Bottom candidates win (lowest first), then top candidates (highest first).
fn take_page_label(
    fragments: &mut Vec<Fragment>,
    height: f32,
    options: &LayoutOptions,
) -> Option<String> {
    let margin = options.thresholds.page_number_margin;
    let candidates = fragments
        .iter()
        .enumerate()
        .filter(|(_, f)| options.vocabulary.is_page_number(&f.text));

    let mut bottom: Option<(usize, f32)> = None;
    let mut top: Option<(usize, f32)> = None;
    for (idx, frag) in candidates {
        if frag.bbox.bottom() >= height - margin {
            if bottom.map_or(true, |(_, b)| frag.bbox.bottom() > b) {
                bottom = Some((idx, frag.bbox.bottom()));
            }
        } else if frag.bbox.top <= margin && top.map_or(true, |(_, t)| frag.bbox.top < t) {
            top = Some((idx, frag.bbox.top));
        }
    }

    let (idx, _) = bottom.or(top)?;
    let frag = fragments.remove(idx);
    Some(frag.text.trim().to_string())
}

fn is_duplicate(bbox: &BBox, tables: &[TableItem], media: &[MediaItem]) -> bool {
    let in_table = tables.iter().any(|t| {
        let mut cells = t.cell_boxes().peekable();
        if cells.peek().is_some() {
            cells.any(|c| bbox.center_inside(c))
        } else {
            bbox.center_inside(&t.bbox)
        }
    });
    in_table || media.iter().any(|m| bbox.center_inside(&m.bbox))
}
