//! Reading-order sequencing.
//!
//! Walks the visual lines of a page top to bottom and hands out reading block
//! numbers. A new block starts whenever the layout regime changes (full
//! width, single column, multi column). Inside a multi-column region every
//! column gets its own block, left to right, so that block order is reading
//! order.

use std::collections::BTreeSet;

use super::lines::cmp_f32;
use crate::model::Fragment;

/// Layout regime of one baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    /// Every fragment is full width
    FullWidth,
    /// One column (possibly mixed with full-width fragments)
    SingleColumn,
    /// Two or more distinct columns
    MultiColumn,
}

fn regime_of(fragments: &[Fragment], idxs: &[usize]) -> Regime {
    let cols: BTreeSet<u32> = idxs.iter().map(|&i| fragments[i].column_id()).collect();
    if cols.iter().all(|c| *c == 0) {
        Regime::FullWidth
    } else if cols.iter().filter(|c| **c > 0).count() >= 2 {
        Regime::MultiColumn
    } else {
        Regime::SingleColumn
    }
}

/// Group fragment indices by exact normalized baseline, ascending.
fn baseline_groups(fragments: &[Fragment]) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = (0..fragments.len()).collect();
    order.sort_by(|&a, &b| {
        cmp_f32(fragments[a].line_baseline(), fragments[b].line_baseline())
            .then_with(|| cmp_f32(fragments[a].bbox.left, fragments[b].bbox.left))
            .then_with(|| fragments[a].source.cmp(&fragments[b].source))
    });

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut current: Option<f32> = None;
    for idx in order {
        let baseline = fragments[idx].line_baseline();
        match (current, groups.last_mut()) {
            (Some(b), Some(group)) if b.total_cmp(&baseline).is_eq() => group.push(idx),
            _ => {
                groups.push(vec![idx]);
                current = Some(baseline);
            }
        }
    }
    groups
}

/// Assign reading blocks to every fragment. Returns the highest block number.
pub fn assign_reading_blocks(fragments: &mut [Fragment]) -> u32 {
    if fragments.is_empty() {
        return 0;
    }
    let groups = baseline_groups(fragments);
    let mut assigned = vec![false; fragments.len()];
    let mut block = 1u32;
    let mut prev: Option<Regime> = None;

    let mut i = 0;
    while i < groups.len() {
        let pending: Vec<usize> = groups[i].iter().copied().filter(|&f| !assigned[f]).collect();
        if pending.is_empty() {
            i += 1;
            continue;
        }
        let regime = regime_of(fragments, &pending);
        if prev.is_some_and(|p| p != regime) {
            block += 1;
        }

        match regime {
            Regime::FullWidth | Regime::SingleColumn => {
                for f in pending {
                    fragments[f].reading_block = Some(block);
                    assigned[f] = true;
                }
                i += 1;
            }
            Regime::MultiColumn => {
                let mut end = i;
                while end < groups.len() {
                    let rest: Vec<usize> =
                        groups[end].iter().copied().filter(|&f| !assigned[f]).collect();
                    if rest.is_empty() || regime_of(fragments, &rest) == Regime::FullWidth {
                        break;
                    }
                    end += 1;
                }
                let region: Vec<usize> = groups[i..end]
                    .iter()
                    .flatten()
                    .copied()
                    .filter(|&f| !assigned[f])
                    .collect();
                block = sequence_region(fragments, &region, block);
                for f in region {
                    assigned[f] = true;
                }
                log::debug!("multi-column region over {} baselines", end - i);
                i = end;
            }
        }
        prev = Some(regime);
    }

    let leftovers: Vec<usize> = (0..fragments.len()).filter(|&f| !assigned[f]).collect();
    if !leftovers.is_empty() {
        block += 1;
        for f in leftovers {
            fragments[f].reading_block = Some(block);
        }
    }
    block
}

/// One block per positive column, left to right, then one for any
/// full-width fragments inside the region. Returns the last block used.
fn sequence_region(fragments: &mut [Fragment], region: &[usize], first_block: u32) -> u32 {
    let cols: BTreeSet<u32> = region
        .iter()
        .map(|&f| fragments[f].column_id())
        .filter(|c| *c > 0)
        .collect();

    let mut block = first_block;
    for (n, col) in cols.iter().enumerate() {
        if n > 0 {
            block += 1;
        }
        for &f in region {
            if fragments[f].column_id() == *col {
                fragments[f].reading_block = Some(block);
            }
        }
    }

    let full_width: Vec<usize> = region
        .iter()
        .copied()
        .filter(|&f| fragments[f].column_id() == 0)
        .collect();
    if !full_width.is_empty() {
        block += 1;
        for f in full_width {
            fragments[f].reading_block = Some(block);
        }
    }
    block
}
