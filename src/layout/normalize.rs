//! Unicode cleanup of fragment text at intake.

use unicode_normalization::UnicodeNormalization;

use super::TextNormalization;

const LIGATURES: &[(char, &str)] = &[
    ('\u{FB00}', "ff"),  // ﬀ
    ('\u{FB01}', "fi"),  // ﬁ
    ('\u{FB02}', "fl"),  // ﬂ
    ('\u{FB03}', "ffi"), // ﬃ
    ('\u{FB04}', "ffl"), // ﬄ
    ('\u{FB05}', "st"),  // ﬅ (long s + t)
    ('\u{FB06}', "st"),  // ﬆ
];

/// Text normalizer applied to every style run.
///
/// Leading and trailing whitespace is preserved: same-line merging relies on
/// it.
#[derive(Debug, Clone, Copy)]
pub struct TextNormalizer {
    options: TextNormalization,
}

impl TextNormalizer {
    /// Create a normalizer.
    pub fn new(options: TextNormalization) -> Self {
        Self { options }
    }

    /// Normalize one string.
    pub fn normalize(&self, text: &str) -> String {
        let mut result: String = if self.options.nfc {
            text.nfc().collect()
        } else {
            text.to_string()
        };

        if self.options.expand_ligatures && result.chars().any(is_ligature) {
            result = expand_ligatures(&result);
        }

        if self.options.remove_private_use {
            result.retain(|c| !is_private_use(c));
        }

        if self.options.remove_replacement_chars {
            result.retain(|c| c != '\u{FFFD}');
        }

        result
    }
}

fn is_ligature(c: char) -> bool {
    LIGATURES.iter().any(|(lig, _)| *lig == c)
}

fn expand_ligatures(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    for c in text.chars() {
        match LIGATURES.iter().find(|(lig, _)| *lig == c) {
            Some((_, replacement)) => out.push_str(replacement),
            None => out.push(c),
        }
    }
    out
}

fn is_private_use(c: char) -> bool {
    let code = c as u32;
    (0xE000..=0xF8FF).contains(&code)
        || (0xF0000..=0xFFFFD).contains(&code)
        || (0x100000..=0x10FFFD).contains(&code)
}
