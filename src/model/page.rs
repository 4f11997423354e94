//! Page-level types.

use super::{MediaItem, Paragraph, TableItem};
use serde::{Deserialize, Serialize};

/// A single page of the ordered document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in layout units
    pub width: f32,

    /// Page height in layout units
    pub height: f32,

    /// Printed page label (page number found on the page)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Table of contents, index, glossary and similar pages
    #[serde(default)]
    pub reference_page: bool,

    /// Detected column start positions (empty for single-column pages)
    #[serde(default)]
    pub columns: Vec<f32>,

    /// Content blocks in reading order
    pub elements: Vec<Block>,
}

impl Page {
    /// Create a new page with the given dimensions.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            label: None,
            reference_page: false,
            columns: Vec::new(),
            elements: Vec::new(),
        }
    }

    /// Add a block to the page.
    pub fn add_block(&mut self, block: Block) {
        self.elements.push(block);
    }

    /// Iterate over paragraphs.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.elements.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    /// Get plain text content of the page.
    pub fn plain_text(&self) -> String {
        self.elements
            .iter()
            .filter_map(|block| match block {
                Block::Paragraph(p) => Some(p.text()),
                Block::Table(t) => Some(t.table.plain_text()),
                Block::Media(_) => None,
            })
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Number of distinct reading blocks.
    pub fn reading_block_count(&self) -> usize {
        let mut blocks: Vec<u32> = self.elements.iter().map(Block::reading_block).collect();
        blocks.sort_unstable();
        blocks.dedup();
        blocks.len()
    }

    /// Check if the page is empty (no content blocks).
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Check if the page was laid out in more than one column.
    pub fn is_multi_column(&self) -> bool {
        self.columns.len() > 1
    }
}

/// A content block on a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A paragraph of text
    Paragraph(Paragraph),

    /// An image, figure or drawing
    Media(MediaItem),

    /// A table
    Table(TableItem),
}

impl Block {
    /// Resolved column id.
    pub fn column(&self) -> u32 {
        match self {
            Block::Paragraph(p) => p.column,
            Block::Media(m) => m.position.map(|p| p.column).unwrap_or(0),
            Block::Table(t) => t.position.map(|p| p.column).unwrap_or(0),
        }
    }

    /// Final reading block.
    pub fn reading_block(&self) -> u32 {
        match self {
            Block::Paragraph(p) => p.reading_block,
            Block::Media(m) => m.position.map(|p| p.block).unwrap_or(0),
            Block::Table(t) => t.position.map(|p| p.block).unwrap_or(0),
        }
    }

    /// Check if this block is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Block::Paragraph(_))
    }

    /// Check if this block is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, Block::Table(_))
    }

    /// Check if this block is a media item.
    pub fn is_media(&self) -> bool {
        matches!(self, Block::Media(_))
    }
}
