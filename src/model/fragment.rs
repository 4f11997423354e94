//! Text fragments and their inline style runs.

use serde::{Deserialize, Serialize};

use super::BBox;

/// Vertical script placement of a fragment or run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptKind {
    /// Regular text
    #[default]
    None,
    /// Raised text (exponents, footnote markers)
    Superscript,
    /// Lowered text (chemical formulas, indices)
    Subscript,
}

impl ScriptKind {
    /// Check if this is a super- or subscript.
    pub fn is_script(&self) -> bool {
        !matches!(self, ScriptKind::None)
    }

    /// Inline marker tag name used by [`Fragment::marked_text`].
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            ScriptKind::None => None,
            ScriptKind::Superscript => Some("superscript"),
            ScriptKind::Subscript => Some("subscript"),
        }
    }
}

/// Text styling properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Bold text
    pub bold: bool,

    /// Italic text
    pub italic: bool,

    /// Script placement
    #[serde(default, skip_serializing_if = "is_plain")]
    pub script: ScriptKind,

    /// Font id or name
    pub font_name: Option<String>,

    /// Font size in points
    pub font_size: Option<f32>,

    /// Text color (hex format, e.g., "#FF0000")
    pub color: Option<String>,
}

fn is_plain(kind: &ScriptKind) -> bool {
    !kind.is_script()
}

impl TextStyle {
    /// Check if any emphasis is applied.
    pub fn has_styling(&self) -> bool {
        self.bold || self.italic || self.script.is_script()
    }
}

/// A run of text with consistent styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub text: String,

    /// Text styling
    pub style: TextStyle,
}

impl TextRun {
    /// Create a new text run.
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Create a run with default style.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, TextStyle::default())
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// One positioned, uniformly-styled run of extracted text.
///
/// Fragments are created once at intake and then refined in place by every
/// layout pass. When two fragments merge, the right-hand one is absorbed into
/// the left-hand one and its provenance indices are appended to
/// [`Fragment::constituents`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fragment {
    /// Page the fragment was extracted from (1-indexed)
    pub page: u32,

    /// Intake position on its page, used as a stable tie-breaker
    pub source: usize,

    /// Text content (always the concatenation of `runs`)
    pub text: String,

    /// Inline style runs covering `text`
    pub runs: Vec<TextRun>,

    /// Bounding box
    pub bbox: BBox,

    /// Mean baseline of the visual line this fragment belongs to
    pub norm_baseline: Option<f32>,

    /// Column id (0 = full width)
    pub column: Option<u32>,

    /// Reading block id
    pub reading_block: Option<u32>,

    /// Table cell id when the fragment lies inside a table cell
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_cell: Option<String>,

    /// Script kind when this fragment was detected as a script
    #[serde(default, skip_serializing_if = "is_plain")]
    pub script: ScriptKind,

    /// Intake indices of every raw fragment folded into this one
    pub constituents: Vec<usize>,
}

impl Fragment {
    /// Create a fragment from a single run.
    pub fn new(page: u32, source: usize, text: impl Into<String>, bbox: BBox) -> Self {
        Self::with_runs(page, source, vec![TextRun::plain(text)], bbox)
    }

    /// Create a fragment from pre-split style runs.
    pub fn with_runs(page: u32, source: usize, runs: Vec<TextRun>, bbox: BBox) -> Self {
        let mut fragment = Self {
            page,
            source,
            text: String::new(),
            runs,
            bbox,
            norm_baseline: None,
            column: None,
            reading_block: None,
            table_cell: None,
            script: ScriptKind::None,
            constituents: vec![source],
        };
        fragment.refresh_text();
        fragment
    }

    /// Set the style of every run.
    pub fn with_style(mut self, style: TextStyle) -> Self {
        for run in &mut self.runs {
            run.style = style.clone();
        }
        self
    }

    /// Raw baseline (bottom of the box).
    pub fn baseline(&self) -> f32 {
        self.bbox.bottom()
    }

    /// Normalized baseline, falling back to the raw baseline.
    pub fn line_baseline(&self) -> f32 {
        self.norm_baseline.unwrap_or_else(|| self.baseline())
    }

    /// Column id, 0 when unassigned.
    pub fn column_id(&self) -> u32 {
        self.column.unwrap_or(0)
    }

    /// Reading block, 0 when unassigned.
    pub fn block_id(&self) -> u32 {
        self.reading_block.unwrap_or(0)
    }

    /// Style of the first regular (non-script) run.
    pub fn primary_style(&self) -> Option<&TextStyle> {
        self.runs
            .iter()
            .find(|r| !r.style.script.is_script() && !r.text.trim().is_empty())
            .or_else(|| self.runs.first())
            .map(|r| &r.style)
    }

    /// Dominant font size, falling back to the box height.
    pub fn font_size(&self) -> f32 {
        self.primary_style()
            .and_then(|s| s.font_size)
            .unwrap_or(self.bbox.height)
    }

    /// Whether the dominant run is bold.
    pub fn is_bold(&self) -> bool {
        self.primary_style().map(|s| s.bold).unwrap_or(false)
    }

    /// Number of characters in the text.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Check if the fragment carries no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Text with super/subscript runs wrapped in inline marker tags.
    pub fn marked_text(&self) -> String {
        self.runs
            .iter()
            .map(|run| match run.style.script.tag() {
                Some(tag) => format!("<{tag}>{}</{tag}>", run.text),
                None => run.text.clone(),
            })
            .collect()
    }

    /// Absorb a fragment to the right: append its runs, union the boxes and
    /// flatten its provenance into ours.
    pub fn absorb(&mut self, other: Fragment) {
        self.bbox = self.bbox.union(&other.bbox);
        self.runs.extend(other.runs.into_iter().filter(|r| !r.is_empty()));
        self.constituents.extend(other.constituents);
        self.refresh_text();
    }

    /// Recompute `text` from the runs.
    pub fn refresh_text(&mut self) {
        self.runs.retain(|r| !r.is_empty());
        self.text = self.runs.iter().map(|r| r.text.as_str()).collect();
    }

    /// Remove trailing characters matching `pred` across run boundaries.
    pub fn trim_end_matches(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(last) = self.runs.last_mut() {
            let kept = last.text.trim_end_matches(&pred).len();
            if kept == 0 {
                self.runs.pop();
                continue;
            }
            last.text.truncate(kept);
            break;
        }
        self.refresh_text();
    }

    /// Remove leading characters matching `pred` across run boundaries.
    pub fn trim_start_matches(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(first) = self.runs.first_mut() {
            let trimmed = first.text.trim_start_matches(&pred);
            if trimmed.is_empty() {
                self.runs.remove(0);
                continue;
            }
            first.text = trimmed.to_string();
            break;
        }
        self.refresh_text();
    }

    /// Remove one trailing character if it equals `c`.
    pub fn pop_suffix(&mut self, c: char) -> bool {
        let popped = match self.runs.last_mut() {
            Some(last) if last.text.ends_with(c) => {
                last.text.pop();
                true
            }
            _ => false,
        };
        self.refresh_text();
        popped
    }

    /// Split off the leading word (and the whitespace around it).
    pub fn take_leading_word(&mut self) -> String {
        self.trim_start_matches(char::is_whitespace);
        let mut word = String::new();
        while let Some(first) = self.runs.first_mut() {
            match first.text.find(char::is_whitespace) {
                Some(end) => {
                    word.push_str(&first.text[..end]);
                    first.text = first.text[end..].to_string();
                    break;
                }
                None => {
                    word.push_str(&first.text);
                    self.runs.remove(0);
                }
            }
        }
        self.trim_start_matches(char::is_whitespace);
        word
    }

    /// Append text to the last run (keeps the last run's style).
    pub fn push_text(&mut self, text: &str) {
        match self.runs.last_mut() {
            Some(last) => last.text.push_str(text),
            None => self.runs.push(TextRun::plain(text)),
        }
        self.refresh_text();
    }
}
