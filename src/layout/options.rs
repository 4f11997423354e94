//! Layout options and tuning constants.

use std::ops::RangeInclusive;

use super::Vocabulary;
use crate::error::{Error, Result};

/// How strictly intake treats malformed geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Drop degenerate fragments and items, count them, keep going
    #[default]
    Lenient,
    /// Reject degenerate geometry before layout starts
    Strict,
}

/// Options for laying out a document.
///
/// The options are a read-only context threaded through every pass.
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Intake validation mode
    pub error_mode: ErrorMode,

    /// Run per-page passes on the rayon pool
    pub parallel: bool,

    /// Pages to lay out
    pub pages: PageSelection,

    /// Numeric thresholds
    pub thresholds: Thresholds,

    /// Word lists and caption patterns
    pub vocabulary: Vocabulary,

    /// Text normalization applied at intake
    pub normalize: TextNormalization,

    /// Remove running headers, footers, page numbers and print artifacts
    pub filter_artifacts: bool,

    /// Join paragraphs split across page breaks
    pub merge_across_pages: bool,

    /// Record caption links between paragraphs and media/tables
    pub link_captions: bool,
}

impl LayoutOptions {
    /// Create new layout options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Shorthand for [`ErrorMode::Strict`].
    pub fn strict(self) -> Self {
        self.with_error_mode(ErrorMode::Strict)
    }

    /// Enable or disable parallel per-page processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, selection: PageSelection) -> Self {
        self.pages = selection;
        self
    }

    /// Set specific page range.
    pub fn with_page_range(mut self, range: RangeInclusive<u32>) -> Self {
        self.pages = PageSelection::Range(range);
        self
    }

    /// Set thresholds.
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the vocabulary.
    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    /// Set text normalization.
    pub fn with_normalization(mut self, normalize: TextNormalization) -> Self {
        self.normalize = normalize;
        self
    }

    /// Enable or disable artifact filtering.
    pub fn with_artifact_filter(mut self, enabled: bool) -> Self {
        self.filter_artifacts = enabled;
        self
    }

    /// Enable or disable cross-page merging.
    pub fn with_cross_page_merge(mut self, enabled: bool) -> Self {
        self.merge_across_pages = enabled;
        self
    }

    /// Enable or disable caption linking.
    pub fn with_caption_links(mut self, enabled: bool) -> Self {
        self.link_captions = enabled;
        self
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            parallel: true,
            pages: PageSelection::All,
            thresholds: Thresholds::default(),
            vocabulary: Vocabulary::default(),
            normalize: TextNormalization::default(),
            filter_artifacts: true,
            merge_across_pages: true,
            link_captions: true,
        }
    }
}

/// Text normalization applied to fragment text at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextNormalization {
    /// Apply Unicode NFC
    pub nfc: bool,
    /// Expand typographic ligatures (ﬁ → fi)
    pub expand_ligatures: bool,
    /// Remove U+FFFD replacement characters
    pub remove_replacement_chars: bool,
    /// Remove private-use-area characters
    pub remove_private_use: bool,
}

impl TextNormalization {
    /// No normalization at all.
    pub fn none() -> Self {
        Self {
            nfc: false,
            expand_ligatures: false,
            remove_replacement_chars: false,
            remove_private_use: false,
        }
    }
}

impl Default for TextNormalization {
    fn default() -> Self {
        Self {
            nfc: true,
            expand_ligatures: true,
            remove_replacement_chars: true,
            remove_private_use: true,
        }
    }
}

/// Empirically tuned thresholds.
///
/// Ratios are fractions of the page width unless noted; distances are in
/// page units.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    // Script detection
    /// Maximum script width
    pub script_max_width: f32,
    /// Maximum script height
    pub script_max_height: f32,
    /// Maximum script length in characters
    pub script_max_chars: usize,
    /// Maximum horizontal gap between script and parent
    pub script_max_gap: f32,
    /// Maximum script/parent height ratio
    pub script_height_ratio: f32,
    /// Maximum top offset for a candidate parent
    pub script_max_top_diff: f32,
    /// Lower bound of the superscript top offset
    pub superscript_min_offset: f32,
    /// Lower bound of the subscript top offset (superscript upper bound)
    pub subscript_min_offset: f32,
    /// Upper bound of the subscript top offset
    pub subscript_max_offset: f32,
    /// Baseline band used to accept a parent
    pub script_baseline_band: f32,
    /// Baseline slack used to classify scripts
    pub script_baseline_slack: f32,

    // Lines and inline merge
    /// Minimum baseline tolerance for line grouping
    pub min_line_tolerance: f32,
    /// Fraction of the median baseline gap used as line tolerance
    pub line_tolerance_ratio: f32,
    /// Baseline tolerance for column-gap statistics
    pub column_line_tolerance: f32,
    /// Gap tolerance for adjacent same-line fragments
    pub inline_gap: f32,
    /// Width of a space when a fragment starts with one
    pub space_width: f32,
    /// Gap allowed before trailing punctuation
    pub punctuation_gap: f32,
    /// Gap allowed after a lone bullet
    pub bullet_gap: f32,
    /// Gap allowed after a continuation word
    pub continuation_gap: f32,
    /// Gap below this fraction of the smaller height always merges
    pub inline_height_ratio: f32,
    /// Line height used when a page has no fragments
    pub default_line_height: f32,

    // Column detection
    /// Lines needed to accept a column count
    pub min_consistent_lines: usize,
    /// Maximum number of columns
    pub max_columns: usize,
    /// Minimum distance between merged column starts
    pub min_column_separation: f32,
    /// Column-gap threshold when there are no gaps
    pub column_gap_fallback: f32,
    /// Lower clamp of the column-gap threshold
    pub column_gap_min: f32,
    /// Upper clamp of the column-gap threshold
    pub column_gap_max: f32,
    /// Gaps at least this wide count as "large"
    pub large_gap_ratio: f32,
    /// Left-edge clustering tolerance
    pub cluster_tolerance: f32,
    /// Minimum cluster size (absolute)
    pub cluster_min_size: usize,
    /// Minimum cluster size (fraction of fragments)
    pub cluster_min_share: f32,
    /// Minimum separation between cluster centers
    pub cluster_min_separation: f32,

    // Column assignment
    /// Margin tolerance for full-width fragments
    pub margin_ratio: f32,
    /// Center tolerance for centered headings
    pub center_tolerance: f32,
    /// Tolerance for aligning a left edge with a column start
    pub column_align_tolerance: f32,
    /// Centered fragments at least this wide are full width
    pub centered_min_width: f32,
    /// Fragments at least this wide stay full width
    pub full_width_ratio: f32,
    /// Gap for propagating full width to neighbors
    pub adjacency_gap: f32,
    /// Left-edge tolerance for column territories
    pub territory_tolerance: f32,
    /// Center tolerance for isolated fragments on single-column pages
    pub isolated_center_tolerance: f32,
    /// Width below which an isolated centered fragment is narrow
    pub isolated_narrow_ratio: f32,
    /// Vertical gap factor for grouping full-width runs
    pub full_width_run_factor: f32,
    /// Minimum width for extending a full-width run
    pub full_width_run_min_width: f32,
    /// Share of page height below which rows may be footnotes
    pub footnote_zone: f32,
    /// Row span that makes a footnote row full width
    pub footnote_row_span: f32,
    /// Width that makes a lone footnote fragment full width
    pub footnote_min_width: f32,

    // Paragraph grouping
    /// Paragraph gap as a multiple of the typical line height
    pub paragraph_gap_factor: f32,
    /// Gaps up to this are "small"
    pub small_gap: f32,
    /// Horizontal back-jump that breaks a paragraph
    pub back_jump: f32,
    /// Font size difference that breaks a paragraph
    pub font_size_delta: f32,
    /// Line width ratio below which a line counts as short
    pub short_line_ratio: f32,
    /// Baseline difference for same-line fragments
    pub same_line_tolerance: f32,
    /// Gap for same-line continuation
    pub same_line_gap: f32,

    // Placement
    /// Caption search radius
    pub caption_radius: f32,
    /// Offset added to the anchor baseline
    pub position_epsilon: f32,
    /// Tolerance at block edges for splitting
    pub split_edge_tolerance: f32,
    /// Caption link window after the caption paragraph
    pub caption_window_after: usize,
    /// Caption link window before the caption paragraph
    pub caption_window_before: usize,

    // Artifacts
    /// Top zone for running headers
    pub header_zone: f32,
    /// Bottom zone for running footers
    pub footer_zone: f32,
    /// Distance from the top/bottom edge for page-number labels
    pub page_number_margin: f32,
    /// Fragments shorter than this are print artifacts
    pub min_fragment_height: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            script_max_width: 15.0,
            script_max_height: 14.0,
            script_max_chars: 3,
            script_max_gap: 5.0,
            script_height_ratio: 0.75,
            script_max_top_diff: 10.0,
            superscript_min_offset: -3.0,
            subscript_min_offset: 3.0,
            subscript_max_offset: 10.0,
            script_baseline_band: 3.0,
            script_baseline_slack: 2.0,

            min_line_tolerance: 4.0,
            line_tolerance_ratio: 0.5,
            column_line_tolerance: 3.0,
            inline_gap: 5.0,
            space_width: 1.0,
            punctuation_gap: 10.0,
            bullet_gap: 20.0,
            continuation_gap: 15.0,
            inline_height_ratio: 0.5,
            default_line_height: 12.0,

            min_consistent_lines: 8,
            max_columns: 4,
            min_column_separation: 0.10,
            column_gap_fallback: 0.10,
            column_gap_min: 0.03,
            column_gap_max: 0.25,
            large_gap_ratio: 0.03,
            cluster_tolerance: 0.05,
            cluster_min_size: 15,
            cluster_min_share: 0.10,
            cluster_min_separation: 0.20,

            margin_ratio: 0.05,
            center_tolerance: 0.15,
            column_align_tolerance: 0.05,
            centered_min_width: 0.30,
            full_width_ratio: 0.45,
            adjacency_gap: 50.0,
            territory_tolerance: 10.0,
            isolated_center_tolerance: 0.10,
            isolated_narrow_ratio: 0.30,
            full_width_run_factor: 1.5,
            full_width_run_min_width: 0.40,
            footnote_zone: 0.75,
            footnote_row_span: 0.75,
            footnote_min_width: 0.60,

            paragraph_gap_factor: 1.5,
            small_gap: 3.0,
            back_jump: 50.0,
            font_size_delta: 2.0,
            short_line_ratio: 0.95,
            same_line_tolerance: 3.0,
            same_line_gap: 5.0,

            caption_radius: 600.0,
            position_epsilon: 0.5,
            split_edge_tolerance: 10.0,
            caption_window_after: 3,
            caption_window_before: 2,

            header_zone: 0.12,
            footer_zone: 0.85,
            page_number_margin: 150.0,
            min_fragment_height: 6.0,
        }
    }
}

/// Page selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// All pages
    #[default]
    All,
    /// A range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Specific pages (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }

        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let (start, end) = parse_bounds(start, end, s)?;
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let (start, end) = parse_bounds(start, end, s)?;
                pages.extend(start..=end);
            } else {
                pages.push(parse_page(part, s)?);
            }
        }

        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::Pages(pages))
    }
}

fn parse_page(value: &str, spec: &str) -> Result<u32> {
    match value.trim().parse::<u32>() {
        Ok(0) | Err(_) => Err(Error::InvalidPageRange(spec.to_string())),
        Ok(page) => Ok(page),
    }
}

fn parse_bounds(start: &str, end: &str, spec: &str) -> Result<(u32, u32)> {
    let start = parse_page(start, spec)?;
    let end = parse_page(end, spec)?;
    if start > end {
        return Err(Error::InvalidPageRange(spec.to_string()));
    }
    Ok((start, end))
}
