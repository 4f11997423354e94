//! Column assignment and its repair passes.

use std::collections::HashMap;

use super::columns::ColumnLayout;
use super::lines::{cmp_f32, group_lines, group_lines_by};
use super::Thresholds;
use crate::model::Fragment;

/// Zones (share of page width) where an isolated fragment's left edge is
/// expected on single-column pages, such as indents and centered blocks.
const ISOLATED_SAFE_ZONES: [(f32, f32); 2] = [(0.10, 0.20), (0.45, 0.60)];

/// Assign a column id to one fragment.
///
/// Column 0 is full width; columns 1..=N follow the detected starts.
pub fn column_for(frag: &Fragment, starts: &[f32], page_width: f32, t: &Thresholds) -> u32 {
    if starts.len() <= 1 {
        return 1;
    }
    let b = &frag.bbox;

    let margin = t.margin_ratio * page_width;
    if b.left <= margin && b.right() >= page_width - margin {
        return 0;
    }

    let centered = (b.center_x() - page_width / 2.0).abs() <= t.center_tolerance * page_width;
    if centered {
        let align = t.column_align_tolerance * page_width;
        let aligned = starts.iter().any(|s| (b.left - s).abs() <= align);
        if !aligned || b.width >= t.centered_min_width * page_width {
            return 0;
        }
    }

    position_column(b.left, starts).unwrap_or(if b.width >= t.full_width_ratio * page_width {
        0
    } else {
        1
    })
}

/// Column whose boundary interval contains `left`. Boundaries are midpoints
/// between consecutive starts.
fn position_column(left: f32, starts: &[f32]) -> Option<u32> {
    let boundaries: Vec<f32> = starts.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();
    let first = boundaries.first()?;
    if left < *first {
        return Some(1);
    }
    let last = boundaries.len() - 1;
    for i in 0..boundaries.len() {
        if i == last || left < boundaries[i + 1] {
            return Some(i as u32 + 2);
        }
    }
    None
}

fn spans_margins(frag: &Fragment, page_width: f32, t: &Thresholds) -> bool {
    let margin = t.margin_ratio * page_width;
    frag.bbox.left <= margin && frag.bbox.right() >= page_width - margin
}

fn is_wide(frag: &Fragment, page_width: f32, t: &Thresholds) -> bool {
    spans_margins(frag, page_width, t) || frag.bbox.width >= t.full_width_ratio * page_width
}

/// Assign columns and run every repair pass in order.
pub fn assign_columns(
    fragments: &mut [Fragment],
    layout: &ColumnLayout,
    page_width: f32,
    page_height: f32,
    line_height: f32,
    t: &Thresholds,
) {
    let starts = &layout.starts;
    for frag in fragments.iter_mut() {
        frag.column = Some(column_for(frag, starts, page_width, t));
    }
    reassign_narrow_full_width(fragments, starts, page_width, t);
    propagate_full_width_neighbors(fragments, t);
    normalize_across_lines(fragments, page_width, t);
    fix_isolated_centered(fragments, starts, page_width, t);
    group_full_width_runs(fragments, page_width, line_height, t);
    if starts.len() > 1 {
        reclassify_footnote_rows(fragments, page_width, page_height, line_height, t);
    }
}

/// (a) Column-0 fragments that are neither margin-spanning nor wide go to
/// the column whose center is nearest to theirs.
pub fn reassign_narrow_full_width(
    fragments: &mut [Fragment],
    starts: &[f32],
    page_width: f32,
    t: &Thresholds,
) {
    if starts.len() <= 1 {
        return;
    }
    let centers: Vec<f32> = starts
        .iter()
        .enumerate()
        .map(|(i, s)| (s + starts.get(i + 1).copied().unwrap_or(page_width)) / 2.0)
        .collect();

    for frag in fragments.iter_mut() {
        if frag.column != Some(0) || is_wide(frag, page_width, t) {
            continue;
        }
        let center = frag.bbox.center_x();
        let nearest = centers
            .iter()
            .enumerate()
            .min_by(|a, b| cmp_f32((a.1 - center).abs(), (b.1 - center).abs()))
            .map(|(i, _)| i as u32 + 1);
        frag.column = nearest.or(frag.column);
    }
}

/// (b) Column 0 spreads to same-line neighbors closer than the adjacency gap.
pub fn propagate_full_width_neighbors(fragments: &mut [Fragment], t: &Thresholds) {
    let lines = group_lines_by(fragments, t.column_line_tolerance, Fragment::line_baseline);
    for line in lines {
        if line.len() < 2 {
            continue;
        }
        let forward: Vec<(usize, usize)> = line.windows(2).map(|w| (w[0], w[1])).collect();
        let backward: Vec<(usize, usize)> = forward.iter().rev().map(|&(a, b)| (b, a)).collect();
        for (from, to) in forward.into_iter().chain(backward) {
            let (left, right) = if fragments[from].bbox.left <= fragments[to].bbox.left {
                (from, to)
            } else {
                (to, from)
            };
            let gap = fragments[left].bbox.gap_to(&fragments[right].bbox);
            if gap <= t.adjacency_gap
                && fragments[from].column == Some(0)
                && fragments[to].column != Some(0)
            {
                fragments[to].column = Some(0);
            }
        }
    }
}

fn territory_key(left: f32, tolerance: f32) -> i64 {
    ((left / tolerance).round() * tolerance) as i64
}

/// (c) Keep a column id stable over lines that start at the same x-position.
pub fn normalize_across_lines(fragments: &mut [Fragment], page_width: f32, t: &Thresholds) {
    let tol = t.territory_tolerance;
    let lines = group_lines(fragments, t);
    if lines.len() < 2 {
        return;
    }
    let line_left =
        |line: &[usize], frags: &[Fragment]| -> f32 {
            line.iter()
                .map(|&i| frags[i].bbox.left)
                .fold(f32::MAX, f32::min)
        };

    // Pass 1, in baseline order: narrow column-0 fragments adopt the last
    // non-zero column seen in their left-edge territory. Full-width lines in
    // between leave the territory untouched.
    let tol_key = tol as i64;
    let adoptable = |f: &Fragment| f.column == Some(0) && !is_wide(f, page_width, t);
    let mut territory: HashMap<i64, u32> = HashMap::new();
    for line in &lines {
        let key = territory_key(line_left(line, fragments), tol);
        let seen = [key, key - tol_key, key + tol_key]
            .iter()
            .find_map(|k| territory.get(k).copied());
        if let Some(col) = seen {
            for &i in line {
                if adoptable(&fragments[i]) {
                    fragments[i].column = Some(col);
                }
            }
        }
        if let Some(col) = line
            .iter()
            .map(|&i| fragments[i].column_id())
            .find(|c| *c > 0)
        {
            territory.insert(key, col);
        }
    }

    // Pass 2: adjacent lines with matching left edges share their column.
    for pair in lines.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if (line_left(a, fragments) - line_left(b, fragments)).abs() > tol {
            continue;
        }
        let cols = |line: &[usize], frags: &[Fragment]| -> Vec<u32> {
            let mut c: Vec<u32> = line.iter().map(|&i| frags[i].column_id()).collect();
            c.sort_unstable();
            c.dedup();
            c
        };
        let (cols_a, cols_b) = (cols(a, fragments), cols(b, fragments));
        if cols_a == cols_b {
            continue;
        }
        for (source, target, target_line) in [(&cols_a, &cols_b, b), (&cols_b, &cols_a, a)] {
            let Some(&col) = source.iter().find(|c| **c > 0) else {
                continue;
            };
            if !target.contains(&0) {
                continue;
            }
            for &i in target_line {
                if adoptable(&fragments[i]) {
                    fragments[i].column = Some(col);
                }
            }
        }
    }
}

/// (d) On single-column pages, a fragment that landed in a column above 1
/// inherits the column of the fragment before it.
pub fn fix_isolated_centered(
    fragments: &mut [Fragment],
    starts: &[f32],
    page_width: f32,
    t: &Thresholds,
) {
    if starts.len() > 1 || fragments.len() < 2 {
        return;
    }
    let mut order: Vec<usize> = (0..fragments.len()).collect();
    order.sort_by(|&a, &b| {
        cmp_f32(fragments[a].line_baseline(), fragments[b].line_baseline())
            .then_with(|| cmp_f32(fragments[a].bbox.left, fragments[b].bbox.left))
            .then_with(|| fragments[a].source.cmp(&fragments[b].source))
    });

    let mut prev: Option<u32> = None;
    for i in order {
        let frag = &fragments[i];
        let col = frag.column_id();
        let rel_left = frag.bbox.left / page_width;
        let in_zone = ISOLATED_SAFE_ZONES
            .iter()
            .any(|(lo, hi)| rel_left >= *lo && rel_left <= *hi);
        if col > 1 && !in_zone {
            let centered = (frag.bbox.center_x() - page_width / 2.0).abs()
                <= t.isolated_center_tolerance * page_width;
            let narrow = frag.bbox.width < t.isolated_narrow_ratio * page_width;
            let inherited = match prev {
                Some(p) if p <= 1 => p,
                _ => 0,
            };
            if centered && narrow {
                fragments[i].column = Some(inherited);
            } else if prev.is_some_and(|p| p != col) {
                fragments[i].column = Some(inherited);
            }
        }
        prev = fragments[i].column;
    }
}

/// (e) Extend runs of full-width lines over wide, closely spaced lines
/// (multi-line titles), stopping at the first narrow line.
pub fn group_full_width_runs(
    fragments: &mut [Fragment],
    page_width: f32,
    line_height: f32,
    t: &Thresholds,
) {
    let mut order: Vec<usize> = (0..fragments.len()).collect();
    order.sort_by(|&a, &b| {
        cmp_f32(fragments[a].line_baseline(), fragments[b].line_baseline())
            .then_with(|| cmp_f32(fragments[a].bbox.left, fragments[b].bbox.left))
            .then_with(|| fragments[a].source.cmp(&fragments[b].source))
    });
    let max_gap = t.full_width_run_factor * line_height;
    let min_width = t.full_width_run_min_width * page_width;

    let mut pos = 0;
    while pos < order.len() {
        if fragments[order[pos]].column != Some(0) {
            pos += 1;
            continue;
        }
        let mut next = pos + 1;
        while next < order.len() {
            let (cur, cand) = (order[next - 1], order[next]);
            let gap = fragments[cand].bbox.top - fragments[cur].bbox.bottom();
            if gap > max_gap {
                break;
            }
            if fragments[cand].column != Some(0) {
                if fragments[cand].bbox.width >= min_width {
                    fragments[cand].column = Some(0);
                } else {
                    break;
                }
            }
            next += 1;
        }
        pos = next;
    }
}

/// (f) Footnote rows become full width, even when their pieces landed in
/// different columns.
///
/// The footnote area starts at the first row in the bottom zone that sits
/// below a paragraph-sized gap; column text running down to the bottom of the
/// page without such a gap is never touched. Inside the area a row qualifies
/// when it spans most of the page, or when it is a single wide fragment.
pub fn reclassify_footnote_rows(
    fragments: &mut [Fragment],
    page_width: f32,
    page_height: f32,
    line_height: f32,
    t: &Thresholds,
) {
    let zone_top = t.footnote_zone * page_height;
    let min_gap = t.paragraph_gap_factor * line_height;
    let lines = group_lines_by(fragments, t.column_line_tolerance, Fragment::line_baseline);

    let mut prev_bottom: Option<f32> = None;
    let mut in_area = false;
    for line in lines {
        let (mut top, mut bottom) = (f32::MAX, f32::MIN);
        let (mut left, mut right) = (f32::MAX, f32::MIN);
        for &i in &line {
            let b = &fragments[i].bbox;
            top = top.min(b.top);
            bottom = bottom.max(b.bottom());
            left = left.min(b.left);
            right = right.max(b.right());
        }

        if !in_area && top >= zone_top {
            in_area = prev_bottom.map_or(true, |b| top - b > min_gap);
        }
        prev_bottom = Some(prev_bottom.map_or(bottom, |b| b.max(bottom)));
        if !in_area {
            continue;
        }

        if right - left >= t.footnote_row_span * page_width {
            for &i in &line {
                fragments[i].column = Some(0);
            }
        } else if let [only] = line[..] {
            if fragments[only].bbox.width >= t.footnote_min_width * page_width {
                fragments[only].column = Some(0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(source: usize, left: f32, right: f32, top: f32) -> Fragment {
        let mut f = Fragment::new(
            1,
            source,
            "text",
            crate::model::BBox::new(left, top, right - left, 10.0),
        );
        f.norm_baseline = Some(top + 10.0);
        f
    }

    #[test]
    fn test_column_for_examples() {
        let t = Thresholds::default();
        let starts = [50.0, 300.0];
        assert_eq!(column_for(&frag(0, 40.0, 580.0, 0.0), &starts, 600.0, &t), 0);
        assert_eq!(column_for(&frag(0, 55.0, 280.0, 0.0), &starts, 600.0, &t), 1);
        assert_eq!(column_for(&frag(0, 310.0, 570.0, 0.0), &starts, 600.0, &t), 2);
    }

    #[test]
    fn test_single_column_all_one() {
        let t = Thresholds::default();
        assert_eq!(column_for(&frag(0, 0.0, 600.0, 0.0), &[], 600.0, &t), 1);
        assert_eq!(column_for(&frag(0, 0.0, 600.0, 0.0), &[50.0], 600.0, &t), 1);
    }

    #[test]
    fn test_centered_heading_is_full_width() {
        let t = Thresholds::default();
        let starts = [50.0, 310.0];
        // Centered, left edge not on a column start.
        assert_eq!(column_for(&frag(0, 200.0, 400.0, 0.0), &starts, 600.0, &t), 0);
    }

    #[test]
    fn test_three_columns() {
        let t = Thresholds::default();
        let starts = [40.0, 220.0, 400.0];
        assert_eq!(column_for(&frag(0, 45.0, 180.0, 0.0), &starts, 600.0, &t), 1);
        assert_eq!(column_for(&frag(0, 225.0, 360.0, 0.0), &starts, 600.0, &t), 2);
        assert_eq!(column_for(&frag(0, 405.0, 560.0, 0.0), &starts, 600.0, &t), 3);
    }

    #[test]
    fn test_reassign_narrow_full_width() {
        let t = Thresholds::default();
        let mut frags = vec![frag(0, 200.0, 260.0, 0.0), frag(1, 20.0, 590.0, 20.0)];
        frags[0].column = Some(0);
        frags[1].column = Some(0);
        reassign_narrow_full_width(&mut frags, &[50.0, 310.0], 600.0, &t);
        assert_eq!(frags[0].column, Some(1));
        assert_eq!(frags[1].column, Some(0));
    }

    #[test]
    fn test_propagate_full_width_both_directions() {
        let t = Thresholds::default();
        let mut frags = vec![
            frag(0, 50.0, 100.0, 0.0),
            frag(1, 120.0, 200.0, 0.0),
            frag(2, 220.0, 300.0, 0.0),
            frag(3, 400.0, 500.0, 0.0),
        ];
        frags[0].column = Some(1);
        frags[1].column = Some(0);
        frags[2].column = Some(1);
        frags[3].column = Some(2);
        propagate_full_width_neighbors(&mut frags, &t);
        assert_eq!(frags[0].column, Some(0));
        assert_eq!(frags[2].column, Some(0));
        // 100 away: untouched.
        assert_eq!(frags[3].column, Some(2));
    }

    #[test]
    fn test_fix_isolated_centered() {
        let t = Thresholds::default();
        let mut frags = vec![frag(0, 50.0, 550.0, 0.0), frag(1, 230.0, 330.0, 20.0)];
        frags[0].column = Some(1);
        frags[1].column = Some(2);
        fix_isolated_centered(&mut frags, &[], 600.0, &t);
        assert_eq!(frags[1].column, Some(1));
    }

    #[test]
    fn test_full_width_runs_stop_at_narrow_lines() {
        let t = Thresholds::default();
        let mut frags = vec![
            frag(0, 20.0, 590.0, 0.0),
            frag(1, 60.0, 400.0, 12.0),
            frag(2, 60.0, 200.0, 24.0),
            frag(3, 60.0, 500.0, 36.0),
        ];
        frags[0].column = Some(0);
        frags[1].column = Some(1);
        frags[2].column = Some(1);
        frags[3].column = Some(1);
        group_full_width_runs(&mut frags, 600.0, 10.0, &t);
        assert_eq!(frags[1].column, Some(0));
        assert_eq!(frags[2].column, Some(1));
        assert_eq!(frags[3].column, Some(1));
    }

    #[test]
    fn test_assign_columns_in_range() {
        let t = Thresholds::default();
        let layout = ColumnLayout {
            starts: vec![50.0, 310.0],
            gap_threshold: 20.0,
            ambiguous: false,
        };
        let mut frags: Vec<Fragment> = (0..10)
            .flat_map(|i| {
                let top = 100.0 + i as f32 * 14.0;
                vec![frag(2 * i, 50.0, 280.0, top), frag(2 * i + 1, 310.0, 560.0, top)]
            })
            .collect();
        assign_columns(&mut frags, &layout, 600.0, 800.0, 10.0, &t);
        for f in &frags {
            let col = f.column.unwrap();
            assert!(col <= 2);
            assert_eq!(col, if f.bbox.left < 300.0 { 1 } else { 2 });
        }
    }

    #[test]
    fn test_territory_keeps_last_seen_column() {
        let t = Thresholds::default();
        let mut frags = vec![
            frag(0, 50.0, 200.0, 100.0),
            frag(1, 50.0, 200.0, 114.0),
            frag(2, 50.0, 200.0, 128.0),
            frag(3, 50.0, 200.0, 142.0),
            frag(4, 20.0, 590.0, 156.0),
            frag(5, 50.0, 150.0, 170.0),
        ];
        for f in frags.iter_mut().take(3) {
            f.column = Some(1);
        }
        frags[3].column = Some(2);
        frags[4].column = Some(0);
        frags[5].column = Some(0);
        normalize_across_lines(&mut frags, 600.0, &t);
        // The wide line in between stays full width and does not reset the
        // territory; the narrow line takes the latest column, not the commonest.
        assert_eq!(frags[4].column, Some(0));
        assert_eq!(frags[5].column, Some(2));
    }

    #[test]
    fn test_footnote_rows_become_full_width() {
        let t = Thresholds::default();
        let mut frags = vec![
            frag(0, 50.0, 280.0, 100.0),
            frag(1, 310.0, 560.0, 100.0),
            frag(2, 50.0, 280.0, 700.0),
            frag(3, 290.0, 560.0, 700.0),
            frag(4, 60.0, 440.0, 720.0),
            frag(5, 60.0, 200.0, 740.0),
        ];
        for (f, col) in frags.iter_mut().zip([1, 2, 1, 2, 1, 1]) {
            f.column = Some(col);
        }
        reclassify_footnote_rows(&mut frags, 600.0, 800.0, 10.0, &t);
        let cols: Vec<u32> = frags.iter().map(|f| f.column_id()).collect();
        // Body row above the footnote zone keeps its columns; a narrow
        // single fragment in the zone does too.
        assert_eq!(cols, vec![1, 2, 0, 0, 0, 1]);
    }

    #[test]
    fn test_body_rows_reaching_the_bottom_keep_columns() {
        let t = Thresholds::default();
        let mut frags: Vec<Fragment> = (0..10)
            .flat_map(|i| {
                let top = 560.0 + i as f32 * 12.0;
                let mut left = frag(2 * i, 50.0, 280.0, top);
                let mut right = frag(2 * i + 1, 310.0, 560.0, top);
                left.column = Some(1);
                right.column = Some(2);
                vec![left, right]
            })
            .collect();
        reclassify_footnote_rows(&mut frags, 600.0, 800.0, 10.0, &t);
        for f in &frags {
            assert_eq!(f.column_id(), if f.bbox.left < 300.0 { 1 } else { 2 });
        }
    }
}
