//! Document-level types: the geometry input and the ordered output.

use serde::{Deserialize, Serialize};

use super::{BBox, MediaKind, Page, TextRun, TextStyle};
use crate::layout::Diagnostics;

/// An ordered document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Pages in the document
    pub pages: Vec<Page>,

    /// Fallback counters collected while laying out the pages
    pub diagnostics: Diagnostics,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by its number.
    pub fn get_page(&self, page_num: u32) -> Option<&Page> {
        self.pages.iter().find(|p| p.number == page_num)
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.plain_text())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Per-page geometry produced by a layout extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentInput {
    /// Pages in extraction order
    #[serde(default)]
    pub pages: Vec<PageInput>,
}

impl DocumentInput {
    /// Create an input document from pages.
    pub fn new(pages: Vec<PageInput>) -> Self {
        Self { pages }
    }
}

/// Geometry of one page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageInput {
    /// Page number (1-indexed); 0 means "use the position in the input"
    pub number: u32,

    /// Page width
    pub width: f32,

    /// Page height
    pub height: f32,

    /// Text fragments in extraction order
    pub fragments: Vec<FragmentInput>,

    /// Image, figure and drawing boxes
    pub media: Vec<MediaInput>,

    /// Tables with resolved content
    pub tables: Vec<TableInput>,
}

impl PageInput {
    /// Create an empty page.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            ..Default::default()
        }
    }

    /// Add a fragment.
    pub fn with_fragment(mut self, fragment: FragmentInput) -> Self {
        self.fragments.push(fragment);
        self
    }

    /// Add a media box.
    pub fn with_media(mut self, media: MediaInput) -> Self {
        self.media.push(media);
        self
    }

    /// Add a table.
    pub fn with_table(mut self, table: TableInput) -> Self {
        self.tables.push(table);
        self
    }
}

/// One extracted text run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FragmentInput {
    /// Text content
    pub text: String,
    /// Left edge
    pub left: f32,
    /// Top edge
    pub top: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
    /// Font id or name
    pub font: Option<String>,
    /// Font size
    pub size: Option<f32>,
    /// Bold flag; inferred from the font name when absent
    pub bold: Option<bool>,
    /// Italic flag; inferred from the font name when absent
    pub italic: Option<bool>,
    /// Text color
    pub color: Option<String>,
    /// Rotation in degrees
    pub rotation: f32,
    /// Pre-split style runs
    pub runs: Vec<RunInput>,
    /// Table cell id, when the extractor already tied this text to a cell
    pub table_cell: Option<String>,
}

impl FragmentInput {
    /// Create a fragment from its text and box.
    pub fn new(text: impl Into<String>, left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            text: text.into(),
            left,
            top,
            width,
            height,
            ..Default::default()
        }
    }

    /// Set the font size.
    pub fn with_size(mut self, size: f32) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the bold flag.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    /// Set the font name.
    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    /// Bounding box.
    pub fn bbox(&self) -> BBox {
        BBox::new(self.left, self.top, self.width, self.height)
    }

    /// Resolved fragment-level style.
    pub fn style(&self) -> TextStyle {
        resolve_style(
            self.font.as_deref(),
            self.size,
            self.bold,
            self.italic,
            self.color.as_deref(),
        )
    }

    /// Style runs, falling back to one run covering the whole text.
    pub fn text_runs(&self) -> Vec<TextRun> {
        if self.runs.is_empty() {
            return vec![TextRun::new(self.text.clone(), self.style())];
        }
        let base = self.style();
        self.runs
            .iter()
            .map(|run| {
                let style = resolve_style(
                    run.font.as_deref().or(base.font_name.as_deref()),
                    run.size.or(base.font_size),
                    run.bold.or(Some(base.bold)),
                    run.italic.or(Some(base.italic)),
                    run.color.as_deref().or(base.color.as_deref()),
                );
                TextRun::new(run.text.clone(), style)
            })
            .collect()
    }
}

/// A pre-split style run inside a fragment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunInput {
    /// Run text
    pub text: String,
    /// Font id or name
    pub font: Option<String>,
    /// Font size
    pub size: Option<f32>,
    /// Bold flag
    pub bold: Option<bool>,
    /// Italic flag
    pub italic: Option<bool>,
    /// Text color
    pub color: Option<String>,
}

/// A media box.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaInput {
    /// Media identifier
    pub id: String,
    /// Media kind
    pub kind: MediaKind,
    /// Left edge
    pub left: f32,
    /// Top edge
    pub top: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl MediaInput {
    /// Create a media box.
    pub fn new(id: impl Into<String>, kind: MediaKind, bbox: BBox) -> Self {
        Self {
            id: id.into(),
            kind,
            left: bbox.left,
            top: bbox.top,
            width: bbox.width,
            height: bbox.height,
        }
    }

    /// Bounding box.
    pub fn bbox(&self) -> BBox {
        BBox::new(self.left, self.top, self.width, self.height)
    }
}

/// A table box with resolved rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TableInput {
    /// Table identifier
    pub id: String,
    /// Left edge
    pub left: f32,
    /// Top edge
    pub top: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
    /// Rows of cells
    pub rows: Vec<Vec<CellInput>>,
}

impl TableInput {
    /// Create an empty table box.
    pub fn new(id: impl Into<String>, bbox: BBox) -> Self {
        Self {
            id: id.into(),
            left: bbox.left,
            top: bbox.top,
            width: bbox.width,
            height: bbox.height,
            rows: Vec::new(),
        }
    }

    /// Add a row.
    pub fn with_row(mut self, row: Vec<CellInput>) -> Self {
        self.rows.push(row);
        self
    }

    /// Bounding box.
    pub fn bbox(&self) -> BBox {
        BBox::new(self.left, self.top, self.width, self.height)
    }
}

/// A resolved table cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellInput {
    /// Cell text
    #[serde(default)]
    pub text: String,
    /// Cell box
    #[serde(default)]
    pub bbox: Option<BBox>,
    /// Rows spanned
    #[serde(default = "one")]
    pub rowspan: u8,
    /// Columns spanned
    #[serde(default = "one")]
    pub colspan: u8,
}

fn one() -> u8 {
    1
}

impl CellInput {
    /// Create a cell with text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bbox: None,
            rowspan: 1,
            colspan: 1,
        }
    }

    /// Set the cell box.
    pub fn with_bbox(mut self, bbox: BBox) -> Self {
        self.bbox = Some(bbox);
        self
    }
}

fn resolve_style(
    font: Option<&str>,
    size: Option<f32>,
    bold: Option<bool>,
    italic: Option<bool>,
    color: Option<&str>,
) -> TextStyle {
    let (font_bold, font_italic) = font.map(font_weight_hints).unwrap_or((false, false));
    TextStyle {
        bold: bold.unwrap_or(font_bold),
        italic: italic.unwrap_or(font_italic),
        font_name: font.map(str::to_string),
        font_size: size.filter(|s| s.is_finite() && *s > 0.0),
        color: color.map(str::to_string),
        ..Default::default()
    }
}

/// Infer (bold, italic) from a font name such as `Helvetica-BoldOblique`.
pub fn font_weight_hints(font: &str) -> (bool, bool) {
    let lower = font.to_lowercase();
    let bold = ["bold", "black", "heavy", "semibold"]
        .iter()
        .any(|k| lower.contains(k));
    let italic = ["italic", "oblique"].iter().any(|k| lower.contains(k));
    (bold, italic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_weight_hints() {
        assert_eq!(font_weight_hints("Helvetica-BoldOblique"), (true, true));
        assert_eq!(font_weight_hints("Times-Roman"), (false, false));
        assert_eq!(font_weight_hints("Arial Black"), (true, false));
    }

    #[test]
    fn test_explicit_flags_win() {
        let frag = FragmentInput::new("x", 0.0, 0.0, 5.0, 5.0)
            .with_font("Arial-Bold")
            .with_bold(false);
        assert!(!frag.style().bold);
    }

    #[test]
    fn test_sparse_json_input() {
        let json = r#"{"pages":[{"width":600,"height":800,
            "fragments":[{"text":"Hi","left":1,"top":2,"width":3,"height":4}],
            "tables":[{"id":"t","rows":[[{"text":"a"}]]}]}]}"#;
        let input: DocumentInput = serde_json::from_str(json).unwrap();
        let page = &input.pages[0];
        assert_eq!(page.number, 0);
        assert_eq!(page.fragments[0].bbox(), BBox::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(page.tables[0].rows[0][0].colspan, 1);
    }

    #[test]
    fn test_runs_inherit_fragment_style() {
        let mut frag = FragmentInput::new("E = mc2", 0.0, 0.0, 50.0, 10.0).with_size(10.0);
        frag.runs = vec![
            RunInput {
                text: "E = mc".into(),
                ..Default::default()
            },
            RunInput {
                text: "2".into(),
                size: Some(6.0),
                ..Default::default()
            },
        ];
        let runs = frag.text_runs();
        assert_eq!(runs[0].style.font_size, Some(10.0));
        assert_eq!(runs[1].style.font_size, Some(6.0));
    }
}
