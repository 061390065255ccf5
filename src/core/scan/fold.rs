//! Token folding: the last two stages of the scanning pipeline.
//!
//! - [`ConcatFolder`] joins `"a" .. "b"` into the single literal `"ab"` so
//!   that a message split across a concatenation is still extracted whole.
//! - [`NameFolder`] joins `a . b . c` into the single symbol `a.b.c` so that
//!   keywords can be qualified names such as `gettext.ngettext`.

use std::io::Read;

use anyhow::Result;

use super::token::{Token, TokenKind};
use super::tokenizer::{TOKEN_PUSHBACK, Tokenizer};

pub struct ConcatFolder<R: Read> {
    tokens: Tokenizer<R>,
    pushback: Vec<Token>,
    last: TokenKind,
}

impl<R: Read> ConcatFolder<R> {
    pub fn new(tokens: Tokenizer<R>) -> Self {
        Self {
            tokens,
            pushback: Vec::with_capacity(TOKEN_PUSHBACK),
            last: TokenKind::Eof,
        }
    }

    pub fn next(&mut self) -> Result<Token> {
        if let Some(token) = self.pushback.pop() {
            self.last = token.kind;
            return Ok(token);
        }

        let mut token = self.tokens.next()?;
        if token.is(TokenKind::String) && self.may_start_chain() {
            while let Some(tail) = self.next_fold_operand()? {
                token.text.extend_from_slice(&tail.text);
            }
        }

        self.last = token.kind;
        Ok(token)
    }

    /// Push a token back. End of input is never buffered.
    ///
    /// # Panics
    ///
    /// Panics if more than [`TOKEN_PUSHBACK`] tokens are pending.
    pub fn unread(&mut self, token: Token) {
        if token.is(TokenKind::Eof) {
            return;
        }
        assert!(
            self.pushback.len() < TOKEN_PUSHBACK,
            "concatenation folder pushback overflow"
        );
        self.pushback.push(token);
    }

    /// A literal right after one of these is already an operand of something
    /// else, so it cannot start a chain of its own.
    fn may_start_chain(&self) -> bool {
        !matches!(
            self.last,
            TokenKind::Operator1
                | TokenKind::Dot
                | TokenKind::Symbol
                | TokenKind::Concat
                | TokenKind::RParen
        )
    }

    /// Look for `.. "literal"` not followed by an arithmetic operator and
    /// consume it. Anything else is pushed back untouched.
    fn next_fold_operand(&mut self) -> Result<Option<Token>> {
        let op = self.tokens.next()?;
        if !op.is(TokenKind::Concat) {
            self.tokens.unread(op);
            return Ok(None);
        }

        let operand = self.tokens.next()?;
        if !operand.is(TokenKind::String) {
            self.tokens.unread(operand);
            self.tokens.unread(op);
            return Ok(None);
        }

        let after = self.tokens.next()?;
        if after.is(TokenKind::Operator1) {
            self.tokens.unread(after);
            self.tokens.unread(operand);
            self.tokens.unread(op);
            return Ok(None);
        }

        self.tokens.unread(after);
        Ok(Some(operand))
    }
}

pub struct NameFolder<R: Read> {
    tokens: ConcatFolder<R>,
}

impl<R: Read> NameFolder<R> {
    pub fn new(tokens: ConcatFolder<R>) -> Self {
        Self { tokens }
    }

    pub fn next(&mut self) -> Result<Token> {
        let mut token = self.tokens.next()?;
        if !token.is(TokenKind::Symbol) {
            return Ok(token);
        }

        loop {
            let dot = self.tokens.next()?;
            if !dot.is(TokenKind::Dot) {
                self.tokens.unread(dot);
                break;
            }
            let name = self.tokens.next()?;
            if !name.is(TokenKind::Symbol) {
                self.tokens.unread(name);
                self.tokens.unread(dot);
                break;
            }
            token.text.push(b'.');
            token.text.extend_from_slice(&name.text);
        }
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::scan::reader::RawReader;

    fn fold(source: &str) -> Vec<(TokenKind, String)> {
        let reader = RawReader::new(Cursor::new(source.as_bytes().to_vec()), "test.lua");
        let mut lexer = NameFolder::new(ConcatFolder::new(Tokenizer::new(reader)));
        let mut out = Vec::new();
        loop {
            let token = lexer.next().unwrap();
            if token.is(TokenKind::Eof) {
                return out;
            }
            out.push((token.kind, token.text_lossy()));
        }
    }

    fn s(text: &str) -> (TokenKind, String) {
        (TokenKind::String, text.to_string())
    }

    fn sym(text: &str) -> (TokenKind, String) {
        (TokenKind::Symbol, text.to_string())
    }

    fn k(kind: TokenKind) -> (TokenKind, String) {
        (kind, String::new())
    }

    #[test]
    fn test_two_literals_fold() {
        assert_eq!(fold(r#""foo" .. "bar""#), vec![s("foobar")]);
    }

    #[test]
    fn test_three_literals_fold() {
        assert_eq!(fold(r#""foo" .. 'bar' .. [[baz]]"#), vec![s("foobarbaz")]);
    }

    #[test]
    fn test_fold_inside_call() {
        assert_eq!(
            fold(r#"_("a" .. "b")"#),
            vec![
                sym("_"),
                k(TokenKind::LParen),
                s("ab"),
                k(TokenKind::RParen)
            ]
        );
    }

    #[test]
    fn test_no_fold_after_call_result() {
        assert_eq!(
            fold(r#"f() .. "x""#),
            vec![
                sym("f"),
                k(TokenKind::LParen),
                k(TokenKind::RParen),
                k(TokenKind::Concat),
                s("x")
            ]
        );
    }

    #[test]
    fn test_no_fold_after_symbol() {
        assert_eq!(
            fold(r#"x .. "a" .. "b""#),
            vec![
                sym("x"),
                k(TokenKind::Concat),
                s("a"),
                k(TokenKind::Concat),
                s("b")
            ]
        );
    }

    #[test]
    fn test_no_fold_before_arithmetic() {
        assert_eq!(
            fold(r#""a" .. "b" * 2"#),
            vec![
                s("a"),
                k(TokenKind::Concat),
                s("b"),
                k(TokenKind::Operator1),
                k(TokenKind::Number)
            ]
        );
    }

    #[test]
    fn test_fold_stops_at_non_literal() {
        assert_eq!(
            fold(r#""a" .. "b" .. x"#),
            vec![s("ab"), k(TokenKind::Concat), sym("x")]
        );
    }

    #[test]
    fn test_qualified_names_fold() {
        assert_eq!(fold("gettext . gettext"), vec![sym("gettext.gettext")]);
        assert_eq!(fold("a.b.c"), vec![sym("a.b.c")]);
    }

    #[test]
    fn test_trailing_dot_is_kept() {
        assert_eq!(
            fold("a.b.(x)"),
            vec![
                sym("a.b"),
                k(TokenKind::Dot),
                k(TokenKind::LParen),
                sym("x"),
                k(TokenKind::RParen)
            ]
        );
    }

    #[test]
    fn test_method_call_is_not_qualified() {
        assert_eq!(
            fold("obj:method"),
            vec![sym("obj"), k(TokenKind::Other), sym("method")]
        );
    }

    #[test]
    fn test_first_comment_wins_in_fold() {
        let reader = RawReader::new(
            Cursor::new(b"-- first\nx = \"a\" .. -- second\n\"b\"".to_vec()),
            "test.lua",
        );
        let mut lexer = NameFolder::new(ConcatFolder::new(Tokenizer::new(reader)));
        let token = loop {
            let token = lexer.next().unwrap();
            if token.is(TokenKind::String) {
                break token;
            }
        };
        assert_eq!(token.text_lossy(), "ab");
        assert_eq!(**token.comment.as_ref().unwrap(), vec!["first".to_string()]);
    }
}
