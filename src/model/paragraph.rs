//! Paragraph types.

use serde::{Deserialize, Serialize};

use super::{BBox, Fragment};

/// An ordered, non-empty run of fragments sharing one column and one reading
/// block at the time it was formed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paragraph {
    /// Nominal page (the page the paragraph started on)
    pub page: u32,

    /// Column id (0 = full width)
    pub column: u32,

    /// Reading block at formation time
    pub reading_block: u32,

    /// Formation order within the page
    pub order: usize,

    /// Fragments in reading order
    pub fragments: Vec<Fragment>,

    /// Id of the media or table item this paragraph captions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption_for: Option<String>,
}

impl Paragraph {
    /// Start a paragraph from its first fragment.
    pub fn new(first: Fragment, order: usize) -> Self {
        Self {
            page: first.page,
            column: first.column_id(),
            reading_block: first.block_id(),
            order,
            fragments: vec![first],
            caption_for: None,
        }
    }

    /// Append a fragment.
    pub fn push(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    /// First fragment.
    pub fn first(&self) -> &Fragment {
        &self.fragments[0]
    }

    /// Last fragment.
    pub fn last(&self) -> &Fragment {
        &self.fragments[self.fragments.len() - 1]
    }

    /// Mutable last fragment.
    pub fn last_mut(&mut self) -> &mut Fragment {
        let idx = self.fragments.len() - 1;
        &mut self.fragments[idx]
    }

    /// Reading block of the first fragment (tracks block splits).
    pub fn current_block(&self) -> u32 {
        self.first().block_id()
    }

    /// Plain text, fragments joined by single spaces where needed.
    pub fn text(&self) -> String {
        join_texts(self.fragments.iter().map(|f| f.text.as_str()))
    }

    /// Text with inline script markers.
    pub fn marked_text(&self) -> String {
        let marked: Vec<String> = self.fragments.iter().map(|f| f.marked_text()).collect();
        join_texts(marked.iter().map(String::as_str))
    }

    /// Union of the fragment boxes that lie on the nominal page.
    pub fn bbox(&self) -> BBox {
        let mut boxes = self
            .fragments
            .iter()
            .filter(|f| f.page == self.page)
            .map(|f| f.bbox);
        let first = boxes.next().unwrap_or(self.first().bbox);
        boxes.fold(first, |acc, b| acc.union(&b))
    }

    /// Font size of the first fragment.
    pub fn font_size(&self) -> f32 {
        self.first().font_size()
    }

    /// Bold state of the first fragment.
    pub fn is_bold(&self) -> bool {
        self.first().is_bold()
    }

    /// Check if any fragment comes from a later page.
    pub fn is_continued(&self) -> bool {
        self.fragments.iter().any(|f| f.page != self.page)
    }

    /// Check if the paragraph has no visible text.
    pub fn is_blank(&self) -> bool {
        self.fragments.iter().all(|f| f.is_blank())
    }
}

fn join_texts<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for part in parts.filter(|p| !p.is_empty()) {
        let needs_space = !out.is_empty()
            && !out.ends_with(char::is_whitespace)
            && !part.starts_with(char::is_whitespace)
            && !part.starts_with(CLOSING_PUNCTUATION)
            && !out.ends_with(OPENING_BRACKETS)
            && !ends_with_word_hyphen(&out);
        if needs_space {
            out.push(' ');
        }
        out.push_str(part);
    }
    out.trim().to_string()
}

const CLOSING_PUNCTUATION: [char; 9] = [',', '.', ';', ':', '!', '?', ')', ']', '}'];
const OPENING_BRACKETS: [char; 3] = ['(', '[', '{'];

/// A hyphen directly after a letter or digit, as in a kept compound "pre-".
fn ends_with_word_hyphen(text: &str) -> bool {
    let mut chars = text.chars().rev();
    chars.next() == Some('-') && chars.next().is_some_and(char::is_alphanumeric)
}
