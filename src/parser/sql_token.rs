#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    /// `"name"` or `` `name` ``
    QuotedIdentifier,
    /// `'text'`, with `''` as the escaped quote
    StringLiteral,
    Number,
    Punct,
    Whitespace,
    LineComment,
    BlockComment,
    /// `/*+ ... */` optimizer hint
    Hint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlToken {
    pub kind: TokenKind,
    pub text: String,
    /// char offset of the first char in the source text
    pub start: usize,
}

impl SqlToken {
    pub fn new(kind: TokenKind, text: String, start: usize) -> Self {
        Self { kind, text, start }
    }

    /// Whitespace and comments: tokens that never carry meaning for matching.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment | TokenKind::Hint
        )
    }

    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Word && self.text.eq_ignore_ascii_case(keyword)
    }

    pub fn is_any_keyword(&self, keywords: &[&str]) -> bool {
        self.kind == TokenKind::Word && keywords.iter().any(|k| self.text.eq_ignore_ascii_case(k))
    }

    pub fn is_punct(&self, ch: char) -> bool {
        self.kind == TokenKind::Punct && self.text.len() == ch.len_utf8() && self.text.starts_with(ch)
    }

    /// Identifier text without its quoting, lower-cased.
    pub fn identifier_key(&self) -> String {
        match self.kind {
            TokenKind::QuotedIdentifier => {
                let mut chars = self.text.chars();
                let open = chars.next();
                let inner = chars.as_str();
                let inner = match open {
                    Some('[') => inner.strip_suffix(']').unwrap_or(inner),
                    Some(q) => inner.strip_suffix(q).unwrap_or(inner),
                    None => inner,
                };
                inner.to_lowercase()
            }
            _ => self.text.to_lowercase(),
        }
    }
}
