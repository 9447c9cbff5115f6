use crate::parser::SqlToken;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    pub tokens: Vec<SqlToken>,
}

impl TokenStream {
    pub fn new(tokens: Vec<SqlToken>) -> Self {
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SqlToken> {
        self.tokens.get(index)
    }

    pub fn render(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    /// Index of the first non-trivia token at or after `index`.
    pub fn significant_from(&self, index: usize) -> Option<usize> {
        (index..self.tokens.len()).find(|&i| !self.tokens[i].is_trivia())
    }

    /// Index of the first non-trivia token strictly after `index`.
    pub fn significant_after(&self, index: usize) -> Option<usize> {
        self.significant_from(index + 1)
    }

    /// Index of the last non-trivia token strictly before `index`.
    pub fn significant_before(&self, index: usize) -> Option<usize> {
        (0..index.min(self.tokens.len())).rev().find(|&i| !self.tokens[i].is_trivia())
    }

    /// Indexes of all non-trivia tokens, in order.
    pub fn significant_indexes(&self) -> Vec<usize> {
        (0..self.tokens.len()).filter(|&i| !self.tokens[i].is_trivia()).collect()
    }

    /// The `)` closing the `(` at `open`, or `None` when unbalanced.
    pub fn matching_paren(&self, open: usize) -> Option<usize> {
        if !self.tokens.get(open)?.is_punct('(') {
            return None;
        }
        let mut depth = 0usize;
        for (i, token) in self.tokens.iter().enumerate().skip(open) {
            if token.is_punct('(') {
                depth += 1;
            } else if token.is_punct(')') {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
        }
        None
    }

    /// Parenthesis depth in effect at each token; a `(` reports the depth
    /// outside of it, a `)` the depth inside.
    pub fn depths(&self) -> Vec<usize> {
        let mut depth = 0usize;
        self.tokens
            .iter()
            .map(|token| {
                let at = depth;
                if token.is_punct('(') {
                    depth += 1;
                } else if token.is_punct(')') {
                    depth = depth.saturating_sub(1);
                }
                at
            })
            .collect()
    }

    /// The innermost unclosed `(` before `index`, if any.
    pub fn enclosing_paren(&self, index: usize) -> Option<usize> {
        let mut depth = 0usize;
        for i in (0..index.min(self.tokens.len())).rev() {
            let token = &self.tokens[i];
            if token.is_punct(')') {
                depth += 1;
            } else if token.is_punct('(') {
                if depth == 0 {
                    return Some(i);
                }
                depth -= 1;
            }
        }
        None
    }
}
