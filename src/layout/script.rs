//! Superscript and subscript detection.
//!
//! A script is a tiny fragment (footnote marker, exponent, chemical index)
//! sitting right next to a taller parent fragment. Each script is absorbed
//! into its parent as a run carrying the script kind.

use std::collections::BTreeMap;

use super::{Diagnostics, LayoutOptions, Thresholds, Vocabulary};
use crate::model::{Fragment, ScriptKind};

/// A detected script and the fragment it attaches to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptMatch {
    /// Index of the script fragment
    pub script: usize,
    /// Index of the parent fragment
    pub parent: usize,
    /// Script kind
    pub kind: ScriptKind,
}

/// Check if a fragment could be a script.
pub fn is_script_candidate(frag: &Fragment, thresholds: &Thresholds, vocab: &Vocabulary) -> bool {
    let text = frag.text.trim();
    let chars = text.chars().count();
    frag.bbox.width < thresholds.script_max_width
        && frag.bbox.height < thresholds.script_max_height
        && (1..=thresholds.script_max_chars).contains(&chars)
        && !vocab.script_exclusions.contains(text)
        && text.chars().all(char::is_alphanumeric)
}

/// Classify a script relative to its parent.
pub fn classify(script: &Fragment, parent: &Fragment, t: &Thresholds) -> ScriptKind {
    let offset = script.bbox.top - parent.bbox.top;
    let parent_baseline = parent.baseline();

    let superscript = (offset >= t.superscript_min_offset && offset < t.subscript_min_offset)
        || (offset < t.subscript_min_offset
            && script.bbox.bottom() <= parent_baseline + t.script_baseline_slack);
    if superscript {
        return ScriptKind::Superscript;
    }

    let subscript = (offset >= t.subscript_min_offset && offset <= t.subscript_max_offset)
        || (offset >= t.subscript_min_offset
            && script.bbox.top >= parent_baseline - t.script_baseline_slack);
    if subscript {
        ScriptKind::Subscript
    } else {
        ScriptKind::None
    }
}

fn find_parent(fragments: &[Fragment], script_idx: usize, t: &Thresholds) -> Option<usize> {
    let script = &fragments[script_idx];
    let mut best: Option<(usize, f32, f32)> = None;

    for (idx, other) in fragments.iter().enumerate() {
        if idx == script_idx || other.bbox.height <= script.bbox.height {
            continue;
        }
        if script.bbox.height / other.bbox.height >= t.script_height_ratio {
            continue;
        }

        let right_gap = script.bbox.left - other.bbox.right();
        let left_gap = other.bbox.left - script.bbox.right();
        let gap = if (0.0..=t.script_max_gap).contains(&right_gap) {
            right_gap
        } else if (0.0..=t.script_max_gap).contains(&left_gap) {
            left_gap
        } else {
            continue;
        };

        let top_diff = (script.bbox.top - other.bbox.top).abs();
        let baseline = other.baseline();
        let overlaps_baseline = script.bbox.bottom() >= baseline - t.script_baseline_band
            && script.bbox.top <= baseline + t.script_baseline_band;
        if top_diff > t.script_max_top_diff && !overlaps_baseline {
            continue;
        }

        let better = match best {
            None => true,
            Some((_, g, d)) => gap
                .total_cmp(&g)
                .then_with(|| top_diff.total_cmp(&d))
                .is_lt(),
        };
        if better {
            best = Some((idx, gap, top_diff));
        }
    }

    best.map(|(idx, _, _)| idx)
}

/// Find every script and its parent. Scripts whose parent is itself a script
/// are left alone.
pub fn detect_scripts(fragments: &[Fragment], options: &LayoutOptions) -> Vec<ScriptMatch> {
    let t = &options.thresholds;
    let mut matches: Vec<ScriptMatch> = fragments
        .iter()
        .enumerate()
        .filter(|(_, f)| f.table_cell.is_none())
        .filter(|(_, f)| is_script_candidate(f, t, &options.vocabulary))
        .filter_map(|(idx, _)| {
            let parent = find_parent(fragments, idx, t)?;
            let kind = classify(&fragments[idx], &fragments[parent], t);
            kind.is_script().then_some(ScriptMatch {
                script: idx,
                parent,
                kind,
            })
        })
        .collect();

    let scripts: Vec<usize> = matches.iter().map(|m| m.script).collect();
    matches.retain(|m| !scripts.contains(&m.parent));
    matches
}

/// Detect scripts and absorb them into their parents.
pub fn merge_scripts(
    fragments: &mut Vec<Fragment>,
    options: &LayoutOptions,
    diagnostics: &mut Diagnostics,
) {
    let matches = detect_scripts(fragments, options);
    if matches.is_empty() {
        return;
    }

    let mut by_parent: BTreeMap<usize, Vec<ScriptMatch>> = BTreeMap::new();
    for m in &matches {
        by_parent.entry(m.parent).or_default().push(*m);
    }

    let mut absorbed = vec![false; fragments.len()];
    for (parent_idx, mut scripts) in by_parent {
        scripts.sort_by(|a, b| {
            fragments[a.script]
                .bbox
                .left
                .total_cmp(&fragments[b.script].bbox.left)
        });
        let parent_center = fragments[parent_idx].bbox.center_x();

        let mut merged = fragments[parent_idx].clone();
        let mut leading = Vec::new();
        for m in &scripts {
            let mut script = fragments[m.script].clone();
            script.script = m.kind;
            for run in &mut script.runs {
                run.style.script = m.kind;
            }
            if script.bbox.center_x() < parent_center {
                leading.push(script);
            } else {
                merged.absorb(script);
            }
            absorbed[m.script] = true;
        }
        if !leading.is_empty() {
            let mut head = leading.remove(0);
            for script in leading {
                head.absorb(script);
            }
            prepend(&mut merged, head);
        }
        log::debug!(
            "page {}: {} script(s) merged into {:?}",
            merged.page,
            scripts.len(),
            merged.text
        );
        diagnostics.scripts_merged += scripts.len();
        fragments[parent_idx] = merged;
    }

    let mut idx = 0;
    fragments.retain(|_| {
        let keep = !absorbed[idx];
        idx += 1;
        keep
    });
}

/// Put `head` in front of `frag`, keeping `frag`'s identity.
fn prepend(frag: &mut Fragment, head: Fragment) {
    frag.bbox = frag.bbox.union(&head.bbox);
    let mut runs = head.runs;
    runs.append(&mut frag.runs);
    frag.runs = runs;
    frag.constituents.extend(head.constituents);
    frag.refresh_text();
}
