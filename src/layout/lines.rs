//! Visual line grouping and small statistics helpers.

use std::cmp::Ordering;

use super::Thresholds;
use crate::model::Fragment;

/// Total order on `f32` (NaN sorts last).
pub(crate) fn cmp_f32(a: f32, b: f32) -> Ordering {
    a.total_cmp(&b)
}

/// Median of a slice (sorts it in place).
pub(crate) fn median(values: &mut [f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| cmp_f32(*a, *b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Baseline tolerance for line grouping: half the median positive gap
/// between consecutive baselines, never below the configured minimum.
pub fn baseline_tolerance(fragments: &[Fragment], thresholds: &Thresholds) -> f32 {
    let mut baselines: Vec<f32> = fragments.iter().map(Fragment::baseline).collect();
    baselines.sort_by(|a, b| cmp_f32(*a, *b));
    let mut gaps: Vec<f32> = baselines
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|g| *g > 0.0)
        .collect();
    match median(&mut gaps) {
        Some(m) => (m * thresholds.line_tolerance_ratio).max(thresholds.min_line_tolerance),
        None => thresholds.min_line_tolerance,
    }
}

/// Group fragments into lines by a vertical key, using a running average of
/// the key per line. Returns fragment indices, each line sorted left to right.
pub fn group_lines_by(
    fragments: &[Fragment],
    tolerance: f32,
    key: impl Fn(&Fragment) -> f32,
) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = (0..fragments.len()).collect();
    order.sort_by(|&a, &b| {
        cmp_f32(key(&fragments[a]), key(&fragments[b]))
            .then_with(|| cmp_f32(fragments[a].bbox.left, fragments[b].bbox.left))
            .then_with(|| fragments[a].source.cmp(&fragments[b].source))
    });

    let mut lines: Vec<Vec<usize>> = Vec::new();
    let mut sum = 0.0f32;
    for idx in order {
        let value = key(&fragments[idx]);
        if let Some(line) = lines.last_mut() {
            let avg = sum / line.len() as f32;
            if (value - avg).abs() <= tolerance {
                line.push(idx);
                sum += value;
                continue;
            }
        }
        lines.push(vec![idx]);
        sum = value;
    }

    for line in &mut lines {
        line.sort_by(|&a, &b| {
            cmp_f32(fragments[a].bbox.left, fragments[b].bbox.left)
                .then_with(|| fragments[a].source.cmp(&fragments[b].source))
        });
    }
    lines
}

/// Group fragments into visual lines by raw baseline.
pub fn group_lines(fragments: &[Fragment], thresholds: &Thresholds) -> Vec<Vec<usize>> {
    let tolerance = baseline_tolerance(fragments, thresholds);
    group_lines_by(fragments, tolerance, Fragment::baseline)
}

/// Assign each fragment the mean baseline of its visual line, rounded to 0.1.
pub fn assign_norm_baselines(fragments: &mut [Fragment], thresholds: &Thresholds) {
    for line in group_lines(fragments, thresholds) {
        let mean =
            line.iter().map(|&i| fragments[i].baseline()).sum::<f32>() / line.len() as f32;
        let norm = (mean * 10.0).round() / 10.0;
        for i in line {
            fragments[i].norm_baseline = Some(norm);
        }
    }
}

/// Median fragment height, or the configured default for an empty page.
pub fn typical_line_height(fragments: &[Fragment], thresholds: &Thresholds) -> f32 {
    let mut heights: Vec<f32> = fragments.iter().map(|f| f.bbox.height).collect();
    median(&mut heights)
        .filter(|h| *h > 0.0)
        .unwrap_or(thresholds.default_line_height)
}
