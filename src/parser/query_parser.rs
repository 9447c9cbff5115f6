use crate::parser::{SqlToken, TokenKind, TokenStream};

/// Char cursor over a query text that splits it into a lossless token stream.
///
/// The stream is deliberately shallow: it knows about quoting, comments and
/// hints so that keyword matching never looks inside them, and nothing more.
#[derive(Debug, Default)]
pub struct QueryParser {
    pub position: usize,
    pub length: usize,
    pub text_v: Vec<char>,
}

impl QueryParser {
    pub fn new(query: &str) -> Self {
        let text_v: Vec<char> = query.chars().collect();
        Self {
            position: 0,
            length: text_v.len(),
            text_v,
        }
    }

    pub fn tokenize_query(query: &str) -> TokenStream {
        Self::new(query).tokenize()
    }

    pub fn eof(&self) -> bool {
        self.position >= self.length
    }

    pub fn current(&self) -> char {
        self.peek(0)
    }

    pub fn peek(&self, ahead: usize) -> char {
        self.text_v.get(self.position + ahead).copied().unwrap_or('\0')
    }

    pub fn next(&mut self) {
        if self.position < self.length {
            self.position += 1;
        }
    }

    pub fn jump(&mut self, ahead: usize) {
        self.position = (self.position + ahead).min(self.length);
    }

    pub fn text_from_range(&self, start: usize, end: usize) -> String {
        let end = end.min(self.length);
        self.text_v[start.min(end)..end].iter().collect()
    }

    pub fn text_from_pivot(&self, pivot: usize) -> String {
        self.text_from_range(pivot, self.position)
    }

    pub fn tokenize(mut self) -> TokenStream {
        let mut tokens = Vec::new();
        while !self.eof() {
            let pivot = self.position;
            let kind = self.consume_token();
            tokens.push(SqlToken::new(kind, self.text_from_pivot(pivot), pivot));
        }
        TokenStream::new(tokens)
    }

    fn consume_token(&mut self) -> TokenKind {
        let current = self.current();

        if current.is_whitespace() {
            while !self.eof() && self.current().is_whitespace() {
                self.next();
            }
            return TokenKind::Whitespace;
        }

        if current == '-' && self.peek(1) == '-' {
            while !self.eof() && self.current() != '\n' {
                self.next();
            }
            return TokenKind::LineComment;
        }

        if current == '/' && self.peek(1) == '*' {
            let kind = if self.peek(2) == '+' { TokenKind::Hint } else { TokenKind::BlockComment };
            self.jump(2);
            while !self.eof() && !(self.current() == '*' && self.peek(1) == '/') {
                self.next();
            }
            self.jump(2);
            return kind;
        }

        if current == '\'' {
            self.consume_quoted('\'');
            return TokenKind::StringLiteral;
        }

        if current == '"' || current == '`' {
            self.consume_quoted(current);
            return TokenKind::QuotedIdentifier;
        }

        if current == '[' && !self.follows_operand() {
            self.consume_quoted(']');
            return TokenKind::QuotedIdentifier;
        }

        if current.is_ascii_digit() || (current == '.' && self.peek(1).is_ascii_digit()) {
            self.consume_number();
            return TokenKind::Number;
        }

        if Self::is_identifier_start(current) {
            while !self.eof() && Self::is_identifier_part(self.current()) {
                self.next();
            }
            return TokenKind::Word;
        }

        self.next();
        TokenKind::Punct
    }

    // a doubled closing char inside the quotes is an escaped one
    fn consume_quoted(&mut self, close: char) {
        self.next();
        while !self.eof() {
            if self.current() == close {
                if self.peek(1) == close {
                    self.jump(2);
                    continue;
                }
                self.next();
                return;
            }
            self.next();
        }
    }

    /// `[` right after a name or a closing bracket is a subscript, not a quote.
    fn follows_operand(&self) -> bool {
        self.position
            .checked_sub(1)
            .and_then(|prev| self.text_v.get(prev))
            .is_some_and(|&ch| Self::is_identifier_part(ch) || ch == ']' || ch == ')')
    }

    fn consume_number(&mut self) {
        while self.current().is_ascii_digit() || self.current() == '.' {
            self.next();
        }
        if matches!(self.current(), 'e' | 'E') {
            let sign = matches!(self.peek(1), '+' | '-');
            let digit_at = if sign { 2 } else { 1 };
            if self.peek(digit_at).is_ascii_digit() {
                self.jump(digit_at);
                while self.current().is_ascii_digit() {
                    self.next();
                }
            }
        }
    }

    pub fn is_identifier_start(ch: char) -> bool {
        ch.is_alphabetic() || ch == '_' || ch == '@' || ch == '$'
    }

    pub fn is_identifier_part(ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_' || ch == '$'
    }
}
