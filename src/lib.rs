//! # reflow
//!
//! Reading-order reconstruction for extracted PDF page geometry.
//!
//! This library takes the positioned text fragments, media boxes and tables a
//! PDF layout extractor produces for each page and turns them into an ordered
//! document: columns are detected, fragments are sequenced into reading
//! blocks, lines are grouped into paragraphs, and figures and tables are
//! interleaved next to their captions.
//!
//! ## Quick Start
//!
//! ```no_run
//! use reflow::{reflow_reader, render};
//! use std::fs::File;
//!
//! fn main() -> reflow::Result<()> {
//!     // Read per-page geometry as JSON
//!     let doc = reflow_reader(File::open("geometry.json")?)?;
//!
//!     // Render the ordered document as plain text
//!     let text = render::to_text(&doc, &render::TextOptions::default())?;
//!     println!("{}", text);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Column detection**: line-start clustering with full-width and margin repairs
//! - **Reading blocks**: full-width bands and column regions sequenced top to bottom
//! - **Paragraphs**: line grouping with dehyphenation and cross-page continuation
//! - **Media placement**: caption-anchored figures and tables, split blocks
//! - **Parallel processing**: uses Rayon for the per-page passes

pub mod error;
pub mod layout;
pub mod model;
pub mod render;

// Re-export commonly used types
pub use error::{Error, Result};
pub use layout::{
    Diagnostics, ErrorMode, LayoutEngine, LayoutOptions, PageSelection, ProgressEvent,
    TextNormalization, Thresholds, Vocabulary,
};
pub use model::{
    BBox, Block, Document, DocumentInput, Fragment, FragmentInput, MediaInput, MediaItem,
    MediaKind, Page, PageInput, Paragraph, TableInput, TableItem, TextRun, TextStyle,
};
pub use render::{JsonFormat, TextOptions};

use crossbeam_channel::Sender;
use std::io::Read;

/// Order a document given as geometry JSON.
///
/// # Example
///
/// ```no_run
/// use reflow::reflow_json;
///
/// let json = std::fs::read_to_string("geometry.json").unwrap();
/// let doc = reflow_json(&json).unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn reflow_json(json: &str) -> Result<Document> {
    Reflow::new().process_json(json).map(ReflowResult::into_document)
}

/// Order a document read from a JSON reader.
///
/// # Example
///
/// ```no_run
/// use reflow::reflow_reader;
/// use std::fs::File;
///
/// let file = File::open("geometry.json").unwrap();
/// let doc = reflow_reader(file).unwrap();
/// ```
pub fn reflow_reader<R: Read>(reader: R) -> Result<Document> {
    Reflow::new()
        .process_reader(reader)
        .map(ReflowResult::into_document)
}

/// Order an already decoded input document with default options.
pub fn reflow_document(input: DocumentInput) -> Result<Document> {
    LayoutEngine::new(LayoutOptions::default()).process(input)
}

/// Builder for reading-order reconstruction.
///
/// # Example
///
/// ```no_run
/// use reflow::{JsonFormat, PageSelection, Reflow};
///
/// let json = std::fs::read_to_string("geometry.json").unwrap();
/// let result = Reflow::new()
///     .strict()
///     .with_pages(PageSelection::Range(1..=10))
///     .process_json(&json)
///     .unwrap();
///
/// let output = result.to_json(JsonFormat::Compact).unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct Reflow {
    options: LayoutOptions,
    progress: Option<Sender<ProgressEvent>>,
}

impl Reflow {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the layout options.
    pub fn with_options(mut self, options: LayoutOptions) -> Self {
        self.options = options;
        self
    }

    /// Reject degenerate geometry instead of dropping it.
    pub fn strict(mut self) -> Self {
        self.options.error_mode = ErrorMode::Strict;
        self
    }

    /// Disable parallel page processing.
    pub fn sequential(mut self) -> Self {
        self.options.parallel = false;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.options.pages = pages;
        self
    }

    /// Disable paragraph merging across page boundaries.
    pub fn without_cross_page_merge(mut self) -> Self {
        self.options.merge_across_pages = false;
        self
    }

    /// Keep running headers, footers and page numbers in the flow.
    pub fn keep_artifacts(mut self) -> Self {
        self.options.filter_artifacts = false;
        self
    }

    /// Report finished pages on a channel.
    pub fn with_progress(mut self, sender: Sender<ProgressEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Get the layout options.
    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    fn engine(&self) -> LayoutEngine {
        let engine = LayoutEngine::new(self.options.clone());
        match &self.progress {
            Some(sender) => engine.with_progress(sender.clone()),
            None => engine,
        }
    }

    /// Order an input document.
    pub fn process(&self, input: DocumentInput) -> Result<ReflowResult> {
        let document = self.engine().process(input)?;
        Ok(ReflowResult { document })
    }

    /// Order a document given as geometry JSON.
    pub fn process_json(&self, json: &str) -> Result<ReflowResult> {
        let input: DocumentInput = serde_json::from_str(json)?;
        self.process(input)
    }

    /// Order a document read from a JSON reader.
    pub fn process_reader<R: Read>(&self, reader: R) -> Result<ReflowResult> {
        let input: DocumentInput = serde_json::from_reader(reader)?;
        self.process(input)
    }
}

/// Result of ordering a document.
pub struct ReflowResult {
    /// The ordered document
    pub document: Document,
}

impl ReflowResult {
    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Convert to plain text.
    pub fn to_text(&self, options: &TextOptions) -> Result<String> {
        render::to_text(&self.document, options)
    }

    /// Get the counters collected while ordering.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.document.diagnostics
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Take the document.
    pub fn into_document(self) -> Document {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflow_builder() {
        let reflow = Reflow::new()
            .strict()
            .sequential()
            .without_cross_page_merge()
            .keep_artifacts();

        assert_eq!(reflow.options().error_mode, ErrorMode::Strict);
        assert!(!reflow.options().parallel);
        assert!(!reflow.options().merge_across_pages);
        assert!(!reflow.options().filter_artifacts);
    }

    #[test]
    fn test_reflow_builder_default() {
        let reflow = Reflow::default();
        assert_eq!(reflow.options().error_mode, ErrorMode::Lenient);
        assert!(reflow.options().parallel);
        assert!(reflow.progress.is_none());
    }

    #[test]
    fn test_reflow_builder_with_pages() {
        let reflow = Reflow::new().with_pages(PageSelection::Range(1..=5));
        assert_eq!(reflow.options().pages, PageSelection::Range(1..=5));
    }

    // ==================== Edge Case Tests ====================

    #[test]
    fn test_reflow_json_invalid() {
        let result = reflow_json("{ not json");
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_reflow_json_empty_object() {
        let doc = reflow_json("{}").unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_reflow_json_sparse_input() {
        let json = r#"{
            "pages": [{
                "width": 600, "height": 800,
                "fragments": [
                    {"text": "Hello ", "left": 100, "top": 300, "width": 40, "height": 12},
                    {"text": "World", "left": 142, "top": 300, "width": 38, "height": 12}
                ]
            }]
        }"#;
        let doc = reflow_json(json).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.pages[0].number, 1);
        assert_eq!(doc.plain_text(), "Hello World");
    }

    #[test]
    fn test_reflow_reader() {
        let json = br#"{"pages": [{"number": 3, "width": 600, "height": 800}]}"#;
        let doc = reflow_reader(&json[..]).unwrap();
        assert_eq!(doc.pages[0].number, 3);
        assert!(doc.pages[0].is_empty());
    }

    // ==================== Output Format Tests ====================

    #[test]
    fn test_reflow_result_outputs() {
        let page = PageInput::new(1, 600.0, 800.0).with_fragment(FragmentInput::new(
            "Only line.",
            100.0,
            300.0,
            60.0,
            12.0,
        ));
        let result = Reflow::new()
            .sequential()
            .process(DocumentInput::new(vec![page]))
            .unwrap();

        assert_eq!(result.to_text(&TextOptions::default()).unwrap(), "Only line.");
        let json = result.to_json(JsonFormat::Compact).unwrap();
        assert!(json.contains("\"type\":\"paragraph\""));
        assert_eq!(result.diagnostics().pages_recovered, 0);
        assert_eq!(result.into_document().page_count(), 1);
    }

    #[test]
    fn test_reflow_document_matches_builder() {
        let input = DocumentInput::new(vec![PageInput::new(1, 600.0, 800.0).with_fragment(
            FragmentInput::new("Text", 100.0, 300.0, 30.0, 12.0),
        )]);
        let direct = reflow_document(input.clone()).unwrap();
        let built = Reflow::new().process(input).unwrap();
        assert_eq!(direct.plain_text(), built.document().plain_text());
    }
}
