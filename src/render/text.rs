//! Plain text rendering of ordered documents.

use crate::error::Result;
use crate::model::{Block, Document, MediaKind, Page};

/// Options for plain text output.
#[derive(Debug, Clone, Default)]
pub struct TextOptions {
    /// Emit a separator line between pages
    pub page_breaks: bool,

    /// Emit a placeholder line for media items
    pub media_placeholders: bool,

    /// Wrap super/subscripts in inline marker tags
    pub mark_scripts: bool,
}

impl TextOptions {
    /// Create default text options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable page separators.
    pub fn with_page_breaks(mut self, enabled: bool) -> Self {
        self.page_breaks = enabled;
        self
    }

    /// Enable media placeholders.
    pub fn with_media_placeholders(mut self, enabled: bool) -> Self {
        self.media_placeholders = enabled;
        self
    }

    /// Enable script markers.
    pub fn with_script_markers(mut self, enabled: bool) -> Self {
        self.mark_scripts = enabled;
        self
    }
}

fn media_label(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "image",
        MediaKind::Figure => "figure",
        MediaKind::Vector => "drawing",
    }
}

fn render_page(page: &Page, options: &TextOptions) -> String {
    page.elements
        .iter()
        .filter_map(|block| match block {
            Block::Paragraph(p) if options.mark_scripts => Some(p.marked_text()),
            Block::Paragraph(p) => Some(p.text()),
            Block::Table(t) => Some(t.table.plain_text()),
            Block::Media(m) if options.media_placeholders => {
                Some(format!("[{}: {}]", media_label(m.kind), m.id))
            }
            Block::Media(_) => None,
        })
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Convert a document to plain text, one paragraph per line group.
pub fn to_text(doc: &Document, options: &TextOptions) -> Result<String> {
    let mut output = String::new();
    for page in &doc.pages {
        let text = render_page(page, options);
        if options.page_breaks {
            if !output.is_empty() {
                output.push_str("\n\n");
            }
            let separator = match &page.label {
                Some(label) => format!("--- page {} ({}) ---", page.number, label),
                None => format!("--- page {} ---", page.number),
            };
            output.push_str(&separator);
            if !text.is_empty() {
                output.push_str("\n\n");
            }
        } else if !output.is_empty() && !text.is_empty() {
            output.push_str("\n\n");
        }
        output.push_str(&text);
    }

    Ok(output.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Fragment, MediaItem, Paragraph, ScriptKind, TextRun, TextStyle};

    fn paragraph(page: u32, text: &str) -> Block {
        Block::Paragraph(Paragraph::new(
            Fragment::new(page, 0, text, BBox::new(10.0, 10.0, 50.0, 10.0)),
            0,
        ))
    }

    fn sample() -> Document {
        let mut doc = Document::new();
        let mut first = Page::new(1, 600.0, 800.0);
        first.add_block(paragraph(1, "Hello, world!"));
        first.add_block(Block::Media(MediaItem::new(
            "img1",
            MediaKind::Figure,
            BBox::new(0.0, 100.0, 100.0, 100.0),
        )));
        first.add_block(paragraph(1, "Second paragraph."));
        let mut second = Page::new(2, 600.0, 800.0);
        second.label = Some("ii".into());
        second.add_block(paragraph(2, "Next page."));
        doc.pages.push(first);
        doc.pages.push(second);
        doc
    }

    #[test]
    fn test_to_text() {
        let result = to_text(&sample(), &TextOptions::default()).unwrap();
        assert_eq!(result, "Hello, world!\n\nSecond paragraph.\n\nNext page.");
    }

    #[test]
    fn test_page_breaks_and_media() {
        let options = TextOptions::new()
            .with_page_breaks(true)
            .with_media_placeholders(true);
        let result = to_text(&sample(), &options).unwrap();
        assert!(result.starts_with("--- page 1 ---"));
        assert!(result.contains("[figure: img1]"));
        assert!(result.contains("--- page 2 (ii) ---\n\nNext page."));
    }

    #[test]
    fn test_script_markers() {
        let runs = vec![
            TextRun::plain("x"),
            TextRun::new(
                "2",
                TextStyle {
                    script: ScriptKind::Superscript,
                    ..Default::default()
                },
            ),
        ];
        let frag = Fragment::with_runs(1, 0, runs, BBox::new(0.0, 0.0, 20.0, 10.0));
        let mut doc = Document::new();
        let mut page = Page::new(1, 600.0, 800.0);
        page.add_block(Block::Paragraph(Paragraph::new(frag, 0)));
        doc.pages.push(page);

        let plain = to_text(&doc, &TextOptions::default()).unwrap();
        assert_eq!(plain, "x2");
        let marked = to_text(&doc, &TextOptions::new().with_script_markers(true)).unwrap();
        assert_eq!(marked, "x<superscript>2</superscript>");
    }
}
