//! Column detection.
//!
//! Columns are found from lines that contain a wide horizontal gap: the
//! x-position after each such gap is a column start for that line. When
//! enough lines agree on the number of starts, the per-index averages become
//! the page's column starts. Layouts without same-line column pairs fall back
//! to clustering left edges.

use std::collections::HashMap;

use super::lines::{cmp_f32, group_lines_by};
use super::Thresholds;
use crate::model::Fragment;

/// Share of page width below which a mean fragment width is "narrow".
const WIDE_FRAGMENT_RATIO: f32 = 0.25;
/// Gaps needed before the wide-fragment path is considered.
const WIDE_MIN_GAPS: usize = 8;
/// Filtered gaps needed by the wide-fragment path.
const WIDE_MIN_FILTERED: usize = 5;
/// Coefficient of variation below which filtered gaps are uniform.
const WIDE_MAX_CV: f32 = 0.5;
/// Floor of the wide-fragment threshold, as a share of page width.
const WIDE_MIN_RATIO: f32 = 0.02;
/// Floor of the scaled-percentile threshold, as a share of page width.
const SCALED_MIN_RATIO: f32 = 0.05;

/// Column layout of one page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnLayout {
    /// Column start x-positions, ascending (fewer than two means one column)
    pub starts: Vec<f32>,
    /// Gap threshold used to split lines
    pub gap_threshold: f32,
    /// True when some lines suggested columns but none were confirmed
    pub ambiguous: bool,
}

impl ColumnLayout {
    /// Number of detected columns.
    pub fn column_count(&self) -> usize {
        if self.is_multi_column() {
            self.starts.len()
        } else {
            1
        }
    }

    /// Check if the page has two or more columns.
    pub fn is_multi_column(&self) -> bool {
        self.starts.len() >= 2
    }
}

fn column_lines(fragments: &[Fragment], t: &Thresholds) -> Vec<Vec<usize>> {
    group_lines_by(fragments, t.column_line_tolerance, Fragment::line_baseline)
}

fn line_gaps(fragments: &[Fragment], lines: &[Vec<usize>]) -> Vec<f32> {
    lines
        .iter()
        .flat_map(|line| {
            line.windows(2)
                .map(|w| fragments[w[0]].bbox.gap_to(&fragments[w[1]].bbox))
        })
        .filter(|g| *g > 0.0)
        .collect()
}

/// Compute the horizontal gap above which a same-line gap separates columns.
pub fn column_gap_threshold(fragments: &[Fragment], page_width: f32, t: &Thresholds) -> f32 {
    let fallback = t.column_gap_fallback * page_width;
    if fragments.len() < 2 {
        return fallback;
    }
    let lines = column_lines(fragments, t);
    let mut gaps = line_gaps(fragments, &lines);
    if gaps.is_empty() {
        return fallback;
    }
    gaps.sort_by(|a, b| cmp_f32(*a, *b));

    let mean_width =
        fragments.iter().map(|f| f.bbox.width).sum::<f32>() / fragments.len() as f32;
    if mean_width > WIDE_FRAGMENT_RATIO * page_width && gaps.len() >= WIDE_MIN_GAPS {
        if let Some(threshold) = uniform_gap_threshold(&gaps, page_width, t) {
            return threshold;
        }
    }

    let large = t.large_gap_ratio * page_width;
    let (small, big): (Vec<f32>, Vec<f32>) = gaps.iter().partition(|g| **g < large);

    let threshold = if !small.is_empty() && big.len() >= 3 {
        let max_small = small.iter().copied().fold(f32::MIN, f32::max);
        let min_large = big.iter().copied().fold(f32::MAX, f32::min);
        (max_small + min_large) / 2.0
    } else if small.is_empty() {
        0.7 * gaps[0]
    } else {
        let n = gaps.len();
        let q25 = gaps[(n as f32 * 0.25) as usize];
        let q75 = gaps[((n as f32 * 0.75) as usize).min(n - 1)];
        let median = gaps[n / 2];
        let ratio = gaps[n - 1] / gaps[0];
        if ratio > 3.0 && n >= 5 {
            (q25 * 3.0)
                .max((q25 + median) / 2.0)
                .max(SCALED_MIN_RATIO * page_width)
        } else {
            (q75 * 4.0)
                .max(median * 6.0)
                .max(SCALED_MIN_RATIO * page_width)
        }
    };

    threshold.clamp(t.column_gap_min * page_width, t.column_gap_max * page_width)
}

/// IQR-filtered threshold for pages of wide fragments with uniform gaps.
fn uniform_gap_threshold(sorted: &[f32], page_width: f32, t: &Thresholds) -> Option<f32> {
    let n = sorted.len();
    let q1 = sorted[n / 4];
    let q3 = sorted[(3 * n / 4).min(n - 1)];
    let iqr = q3 - q1;
    let (lo, hi) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);
    let filtered: Vec<f32> = sorted
        .iter()
        .copied()
        .filter(|g| *g >= lo && *g <= hi)
        .collect();
    if filtered.len() < WIDE_MIN_FILTERED {
        return None;
    }
    let mean = filtered.iter().sum::<f32>() / filtered.len() as f32;
    let variance =
        filtered.iter().map(|g| (g - mean).powi(2)).sum::<f32>() / filtered.len() as f32;
    if mean <= 0.0 || variance.sqrt() / mean >= WIDE_MAX_CV {
        return None;
    }
    let min = filtered[0];
    Some(
        (0.7 * min)
            .max(WIDE_MIN_RATIO * page_width)
            .min(t.column_gap_max * page_width),
    )
}

/// Detect the column starts of a page.
pub fn detect_columns(fragments: &[Fragment], page_width: f32, t: &Thresholds) -> ColumnLayout {
    let gap_threshold = column_gap_threshold(fragments, page_width, t);
    if fragments.is_empty() {
        return ColumnLayout {
            starts: Vec::new(),
            gap_threshold,
            ambiguous: false,
        };
    }

    let lines = column_lines(fragments, t);
    let line_starts: Vec<Vec<f32>> = lines
        .iter()
        .map(|line| {
            let mut starts = vec![fragments[line[0]].bbox.left];
            for w in line.windows(2) {
                let (cur, next) = (&fragments[w[0]], &fragments[w[1]]);
                if cur.bbox.gap_to(&next.bbox) > gap_threshold {
                    starts.push(next.bbox.left);
                }
            }
            starts
        })
        .filter(|s| s.len() > 1)
        .collect();

    let mut starts = starts_from_lines(&line_starts, page_width, t);
    if starts.len() <= 1 {
        starts = cluster_left_edges(fragments, page_width, t);
    }

    let ambiguous = starts.len() < 2 && !line_starts.is_empty();
    if starts.len() < 2 {
        starts.clear();
    }
    log::debug!(
        "columns: gap threshold {:.1}, {} multi-start lines, starts {:?}",
        gap_threshold,
        line_starts.len(),
        starts
    );
    ColumnLayout {
        starts,
        gap_threshold,
        ambiguous,
    }
}

fn starts_from_lines(line_starts: &[Vec<f32>], page_width: f32, t: &Thresholds) -> Vec<f32> {
    if line_starts.len() < t.min_consistent_lines {
        return Vec::new();
    }

    let mut freq: HashMap<usize, usize> = HashMap::new();
    for starts in line_starts {
        *freq.entry(starts.len()).or_default() += 1;
    }
    let mut by_frequency: Vec<(usize, usize)> = freq.into_iter().collect();
    by_frequency.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let chosen = if by_frequency[0].1 >= t.min_consistent_lines {
        Some(by_frequency[0].0)
    } else {
        by_frequency
            .iter()
            .skip(1)
            .find(|(count, lines)| *lines >= t.min_consistent_lines && *count <= t.max_columns)
            .map(|(count, _)| *count)
    };
    let Some(count) = chosen else {
        return Vec::new();
    };
    let columns = count.min(t.max_columns);

    let consistent: Vec<&Vec<f32>> = line_starts.iter().filter(|s| s.len() == count).collect();
    let averaged: Vec<f32> = (0..columns)
        .map(|i| consistent.iter().map(|s| s[i]).sum::<f32>() / consistent.len() as f32)
        .collect();

    let min_sep = t.min_column_separation * page_width;
    let mut merged: Vec<f32> = Vec::with_capacity(averaged.len());
    for start in averaged {
        match merged.last() {
            Some(last) if start - last < min_sep => {}
            _ => merged.push(start),
        }
    }
    if merged.len() <= 1 {
        return Vec::new();
    }
    merged
}

/// Secondary heuristic: cluster fragment left edges.
fn cluster_left_edges(fragments: &[Fragment], page_width: f32, t: &Thresholds) -> Vec<f32> {
    let mut lefts: Vec<f32> = fragments.iter().map(|f| f.bbox.left).collect();
    lefts.sort_by(|a, b| cmp_f32(*a, *b));

    let tolerance = t.cluster_tolerance * page_width;
    let mut clusters: Vec<Vec<f32>> = Vec::new();
    for left in lefts {
        match clusters.last_mut() {
            Some(cluster) if cluster.last().is_some_and(|l| left - l <= tolerance) => {
                cluster.push(left)
            }
            _ => clusters.push(vec![left]),
        }
    }

    let min_size = t
        .cluster_min_size
        .max((fragments.len() as f32 * t.cluster_min_share) as usize);
    let centers: Vec<f32> = clusters
        .iter()
        .filter(|c| c.len() >= min_size)
        .map(|c| c.iter().sum::<f32>() / c.len() as f32)
        .collect();
    if centers.len() < 2 {
        return Vec::new();
    }

    let min_sep = t.cluster_min_separation * page_width;
    let mut kept: Vec<f32> = Vec::new();
    for center in centers {
        if kept.last().map_or(true, |last| center - last >= min_sep) {
            kept.push(center);
        }
    }
    kept.truncate(t.max_columns);
    if kept.len() < 2 {
        return Vec::new();
    }
    kept
}
