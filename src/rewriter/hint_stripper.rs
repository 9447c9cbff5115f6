use crate::parser::{QueryParser, TokenKind};

/// Removes inline optimizer hints (`/*+ ... */`) that one engine accepts and
/// the other rejects. Ordinary comments and literals are left alone.
pub struct HintStripper;

impl HintStripper {
    pub fn strip(query: &str) -> String {
        let stream = QueryParser::tokenize_query(query);
        if !stream.tokens.iter().any(|t| t.kind == TokenKind::Hint) {
            return query.to_string();
        }

        let mut out = String::with_capacity(query.len());
        // set right after a hint was dropped: whitespace that follows is swallowed
        let mut dropped = false;
        for (i, token) in stream.tokens.iter().enumerate() {
            match token.kind {
                TokenKind::Hint => {
                    let next_is_space = stream
                        .get(i + 1)
                        .is_some_and(|t| t.kind == TokenKind::Whitespace || t.kind == TokenKind::Hint);
                    let glued = !out.is_empty() && !out.ends_with(char::is_whitespace);
                    if glued && !next_is_space && i + 1 < stream.len() {
                        out.push(' ');
                    }
                    dropped = true;
                }
                TokenKind::Whitespace if dropped && (out.is_empty() || out.ends_with(char::is_whitespace)) => {}
                _ => {
                    out.push_str(&token.text);
                    dropped = false;
                }
            }
        }

        if query.ends_with(char::is_whitespace) {
            out
        } else {
            out.trim_end().to_string()
        }
    }
}
