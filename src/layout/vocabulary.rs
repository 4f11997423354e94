//! Word lists, symbol sets and patterns used by the layout heuristics.
//!
//! Everything language- or typography-specific lives here as data so that it
//! can be tuned and tested without touching the passes.

use std::collections::HashSet;

use regex::Regex;

use crate::error::{Error, Result};

const SCRIPT_EXCLUSIONS: &[&str] = &[
    "°", "™", "®", "©", "•", "·", "◦", "▪", "½", "¼", "¾", "⅓", "→", "←", "↑", "↓", "…", "‥",
];

const TRAILING_PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', ')', ']', '}', '"', '\'', '…', '»', '›',
];

const BULLETS: &[char] = &[
    '•', '●', '○', '■', '□', '▪', '▫', '·', '-', '*', '–', '—', '→', '⇒', '▸', '►',
];

const CONTINUATION_WORDS: &[&str] = &[
    "including", "and", "or", "the", "for", "in", "of", "to", "a", "an", "as", "with", "from",
    "by", "at", "on", "into", "through", "during", "such", "both", "each", "all", "other",
    "these", "those", "many",
];

const HYPHEN_PREFIXES: &[&str] = &[
    "self", "non", "anti", "co", "semi", "quasi", "pseudo", "neo", "proto",
];

const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?', '。', '！', '？'];

const CLOSERS: &[char] = &['"', ')', '”', '’', '\''];

const REFERENCE_KEYWORDS: &[&str] = &[
    "contents",
    "table of contents",
    "index",
    "glossary",
    "references",
    "appendix",
];

const STRONG_REFERENCE_KEYWORDS: &[&str] =
    &["contents", "table of contents", "glossary", "appendix"];

fn pattern(src: &str) -> Regex {
    Regex::new(src).expect("valid built-in pattern")
}

/// Data tables consulted by the layout passes.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Short symbols never treated as scripts
    pub script_exclusions: HashSet<String>,
    /// Characters forming "pure punctuation" fragments
    pub trailing_punctuation: Vec<char>,
    /// Single-character list bullets
    pub bullets: Vec<char>,
    /// Words after which a line continues
    pub continuation_words: HashSet<String>,
    /// Prefixes whose hyphen is always kept
    pub hyphen_prefixes: HashSet<String>,
    /// Sentence-ending characters
    pub sentence_terminators: Vec<char>,
    /// Closing quotes and brackets that may follow a terminator
    pub closers: Vec<char>,
    /// Characters that continue a line when they lead the next fragment
    pub leading_punctuation: Vec<char>,
    /// Opening brackets that continue a line when they end the previous fragment
    pub opening_brackets: Vec<char>,
    /// Figure caption pattern used for placement (unanchored)
    pub figure_caption: Regex,
    /// Table caption pattern used for placement (unanchored)
    pub table_caption: Regex,
    /// Figure caption pattern used for linking (anchored at the start)
    pub figure_label: Regex,
    /// Table caption pattern used for linking (anchored at the start)
    pub table_label: Regex,
    /// Heading-like lines that never continue onto the next page
    pub heading_patterns: Vec<Regex>,
    /// Lines that start a new section, list item or numbered unit
    pub new_section_patterns: Vec<Regex>,
    /// List markers at the start of a fragment
    pub list_marker: Regex,
    /// Reference page keywords
    pub reference_keywords: Vec<String>,
    /// Keywords that mark a reference page on their own
    pub strong_reference_keywords: Vec<String>,
    /// Trailing page number ("Introduction ..... 12")
    pub trailing_page_number: Regex,
    /// Print artifacts (file names, dates, times)
    pub artifact_patterns: Vec<Regex>,
    /// Arabic page numbers
    pub arabic_page_number: Regex,
    /// Roman page numbers
    pub roman_page_number: Regex,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            script_exclusions: SCRIPT_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
            trailing_punctuation: TRAILING_PUNCTUATION.to_vec(),
            bullets: BULLETS.to_vec(),
            continuation_words: CONTINUATION_WORDS.iter().map(|s| s.to_string()).collect(),
            hyphen_prefixes: HYPHEN_PREFIXES.iter().map(|s| s.to_string()).collect(),
            sentence_terminators: SENTENCE_TERMINATORS.to_vec(),
            closers: CLOSERS.to_vec(),
            leading_punctuation: vec![',', '.', ';', ':', '!', '?', ')', ']', '}'],
            opening_brackets: vec!['(', '[', '{'],
            figure_caption: pattern(r"(?i)Fig(?:ure)?\.?\s+\d+[\.\-]?\d*"),
            table_caption: pattern(r"(?i)Table\.?\s+\d+[\.\-]?\d*"),
            figure_label: pattern(
                r"(?i)^\s*(?:Figure|Fig\.?|Image|Plate|Diagram|Photo)\s+(\d+(?:\.\d+)?[A-Za-z]?)",
            ),
            table_label: pattern(r"(?i)^\s*(?:Table|Tbl\.?)\s+(\d+(?:\.\d+)?[A-Za-z]?)"),
            heading_patterns: vec![
                pattern(r"^\d+\."),
                pattern(r"^[A-Z][a-z]*:$"),
                pattern(r"^[IVX]+\."),
            ],
            new_section_patterns: vec![
                pattern(r"^[A-Z][a-z]+\s+\d+"),
                pattern(r"^\d+\.\d+"),
                pattern(r"^[•●○■□▪▫·\-\*]"),
                pattern(r"^\d+\)"),
                pattern(r"^\([a-z]\)"),
                pattern(r"^[a-z]\)"),
            ],
            list_marker: pattern(r"^\s*(?:[•●○■□▪▫·\*]|-\s|\d+[.)]\s|\([a-z]\)|[a-z]\)\s)"),
            reference_keywords: REFERENCE_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            strong_reference_keywords: STRONG_REFERENCE_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            trailing_page_number: pattern(r"[\s\.,]+\d{1,4}\s*$"),
            artifact_patterns: vec![
                pattern(r"(?i)\.indd\b"),
                pattern(r"\b\d{1,2}/\d{1,2}/\d{2,4}\b"),
                pattern(r"(?i)\b\d{1,2}:\d{2}\s*(?:am|pm)\b"),
            ],
            arabic_page_number: pattern(r"^\d{1,4}$"),
            roman_page_number: pattern(r"(?i)^[ivxlcdm]+$"),
        }
    }
}

impl Vocabulary {
    /// Create the default vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the figure caption pattern.
    pub fn with_figure_caption(mut self, src: &str) -> Result<Self> {
        self.figure_caption = Regex::new(src).map_err(|e| Error::InvalidInput(e.to_string()))?;
        Ok(self)
    }

    /// Replace the table caption pattern.
    pub fn with_table_caption(mut self, src: &str) -> Result<Self> {
        self.table_caption = Regex::new(src).map_err(|e| Error::InvalidInput(e.to_string()))?;
        Ok(self)
    }

    /// Add continuation words.
    pub fn with_continuation_words<S: Into<String>>(
        mut self,
        words: impl IntoIterator<Item = S>,
    ) -> Self {
        self.continuation_words
            .extend(words.into_iter().map(|w| w.into().to_lowercase()));
        self
    }

    /// Check if text consists only of trailing punctuation.
    pub fn is_pure_punctuation(&self, text: &str) -> bool {
        let trimmed = text.trim();
        !trimmed.is_empty() && trimmed.chars().all(|c| self.trailing_punctuation.contains(&c))
    }

    /// Check if text is a lone bullet character.
    pub fn is_bullet(&self, text: &str) -> bool {
        let mut chars = text.trim().chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if self.bullets.contains(&c))
    }

    /// Check if text ends with a continuation word (optionally followed by a comma).
    pub fn ends_with_continuation_word(&self, text: &str) -> bool {
        text.split_whitespace()
            .last()
            .map(|w| w.trim_end_matches(','))
            .is_some_and(|w| self.continuation_words.contains(&w.to_lowercase()))
    }

    /// Check if text ends a sentence, allowing one closing quote or bracket.
    pub fn ends_sentence(&self, text: &str) -> bool {
        let trimmed = text.trim_end();
        let trimmed = trimmed
            .strip_suffix(|c: char| self.closers.contains(&c))
            .unwrap_or(trimmed);
        trimmed
            .chars()
            .last()
            .is_some_and(|c| self.sentence_terminators.contains(&c))
    }

    /// Check if text looks like a heading that never continues.
    pub fn is_heading_like(&self, text: &str) -> bool {
        let trimmed = text.trim();
        self.heading_patterns.iter().any(|p| p.is_match(trimmed))
    }

    /// Check if text opens a new section, list item or chapter.
    pub fn starts_new_section(&self, text: &str) -> bool {
        let trimmed = text.trim_start();
        self.new_section_patterns.iter().any(|p| p.is_match(trimmed))
    }

    /// Check if text starts with a list marker.
    pub fn starts_with_list_marker(&self, text: &str) -> bool {
        self.list_marker.is_match(text)
    }

    /// Check if the prefix before a line-end hyphen keeps its hyphen.
    pub fn keeps_hyphen(&self, word: &str) -> bool {
        let letters: Vec<char> = word.chars().filter(|c| c.is_alphabetic()).collect();
        let acronym = letters.len() >= 2 && letters.iter().all(|c| c.is_uppercase());
        acronym || self.hyphen_prefixes.contains(&word.to_lowercase())
    }

    /// Check if text is a print artifact such as a file name or timestamp.
    pub fn is_print_artifact(&self, text: &str) -> bool {
        self.artifact_patterns.iter().any(|p| p.is_match(text))
    }

    /// Check if text is a bare page number.
    pub fn is_page_number(&self, text: &str) -> bool {
        let trimmed = text.trim();
        self.arabic_page_number.is_match(trimmed) || self.roman_page_number.is_match(trimmed)
    }

    /// Check if text contains a figure or table label.
    pub fn mentions_caption(&self, text: &str) -> bool {
        self.figure_caption.is_match(text) || self.table_caption.is_match(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punctuation_and_bullets() {
        let v = Vocabulary::default();
        assert!(v.is_pure_punctuation(" .) "));
        assert!(!v.is_pure_punctuation("a."));
        assert!(v.is_bullet("•"));
        assert!(!v.is_bullet("••"));
    }

    #[test]
    fn test_continuation_words() {
        let v = Vocabulary::default();
        assert!(v.ends_with_continuation_word("continues on the"));
        assert!(v.ends_with_continuation_word("apples, pears, and,"));
        assert!(!v.ends_with_continuation_word("the end"));
    }

    #[test]
    fn test_sentence_end() {
        let v = Vocabulary::default();
        assert!(v.ends_sentence("Done."));
        assert!(v.ends_sentence("He said \"stop!\""));
        assert!(v.ends_sentence("(see above.)"));
        assert!(v.ends_sentence("終わり。"));
        assert!(!v.ends_sentence("continues on the"));
    }

    #[test]
    fn test_section_patterns() {
        let v = Vocabulary::default();
        assert!(v.starts_new_section("Chapter 3 begins"));
        assert!(v.starts_new_section("2.1 Scope"));
        assert!(v.starts_new_section("(a) first"));
        assert!(!v.starts_new_section("next page."));
        assert!(v.is_heading_like("3. Results"));
        assert!(v.is_heading_like("Summary:"));
    }

    #[test]
    fn test_keeps_hyphen() {
        let v = Vocabulary::default();
        assert!(v.keeps_hyphen("self"));
        assert!(v.keeps_hyphen("Non"));
        assert!(v.keeps_hyphen("HTML"));
        assert!(!v.keeps_hyphen("inter"));
    }

    #[test]
    fn test_caption_patterns() {
        let v = Vocabulary::default();
        assert!(v.figure_caption.is_match("see Figure 2.1 below"));
        assert!(v.figure_label.is_match("Fig. 3 Overview"));
        assert!(!v.figure_label.is_match("see Figure 2"));
        assert!(v.table_caption.is_match("Table 4"));
    }

    #[test]
    fn test_artifacts_and_page_numbers() {
        let v = Vocabulary::default();
        assert!(v.is_print_artifact("Book_final.indd 12"));
        assert!(v.is_print_artifact("12/18/18"));
        assert!(v.is_print_artifact("10:30 am"));
        assert!(v.is_page_number("42"));
        assert!(v.is_page_number("xiv"));
        assert!(!v.is_page_number("page 4"));
    }

    #[test]
    fn test_custom_caption_pattern() {
        let v = Vocabulary::default().with_figure_caption(r"(?i)Abb\.\s+\d+").unwrap();
        assert!(v.figure_caption.is_match("Abb. 4"));
        assert!(Vocabulary::default().with_table_caption("(").is_err());
    }
}
