use crate::parser::{TokenKind, TokenStream};

/// Case-insensitive matcher for a keyword phrase such as `GROUP BY`,
/// `IS NOT NULL` or `ROW_NUMBER()`.
///
/// The phrase is split into parts (words and single punctuation chars) that
/// must appear as consecutive significant tokens; comments and whitespace in
/// between are ignored.
#[derive(Debug, Default, Clone)]
pub struct WordComparer {
    pub length: usize,
    pub parts: Vec<String>,
    delimiter: Option<char>,
}

impl WordComparer {
    pub fn new(phrase: &str) -> Self {
        let parts = Self::split_phrase(phrase);
        Self {
            length: parts.len(),
            parts,
            delimiter: None,
        }
    }

    /// Require the phrase to be followed by `delimiter` (not consumed).
    pub fn with_delimiter(mut self, delimiter: char) -> Self { self.delimiter = Some(delimiter); self }

    fn split_phrase(phrase: &str) -> Vec<String> {
        let mut parts = Vec::new();
        let mut word = String::new();
        for ch in phrase.chars() {
            if ch.is_alphanumeric() || ch == '_' {
                word.push(ch.to_ascii_uppercase());
                continue;
            }
            if !word.is_empty() {
                parts.push(std::mem::take(&mut word));
            }
            if !ch.is_whitespace() {
                parts.push(ch.to_string());
            }
        }
        if !word.is_empty() {
            parts.push(word);
        }
        parts
    }

    /// When the phrase starts at significant token `index`, the index of its
    /// last matched token.
    pub fn compare(&self, stream: &TokenStream, index: usize) -> Option<usize> {
        if self.parts.is_empty() {
            return None;
        }

        let mut position = index;
        for (n, part) in self.parts.iter().enumerate() {
            if n > 0 {
                position = stream.significant_after(position)?;
            }
            let token = stream.get(position)?;
            let matched = match token.kind {
                TokenKind::Word | TokenKind::Punct => token.text.eq_ignore_ascii_case(part),
                _ => false,
            };
            if !matched {
                return None;
            }
        }

        if let Some(delimiter) = self.delimiter {
            let next = stream.significant_after(position)?;
            if !stream.tokens[next].is_punct(delimiter) {
                return None;
            }
        }

        Some(position)
    }

    pub fn matches(&self, stream: &TokenStream, index: usize) -> bool {
        self.compare(stream, index).is_some()
    }

    /// Whether the phrase appears anywhere in the stream.
    pub fn found_in(&self, stream: &TokenStream) -> bool {
        stream.significant_indexes().into_iter().any(|i| self.matches(stream, i))
    }
}
