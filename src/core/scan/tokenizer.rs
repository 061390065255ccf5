//! Tokenizer: the third stage of the scanning pipeline.
//!
//! Turns the comment-free byte stream into [`Token`]s. The tokenizer only
//! distinguishes what the extraction engine needs: brackets, commas, dots,
//! the concatenation operator, two coarse operator classes, strings, numbers
//! and symbols. Malformed input never fails; the tokenizer emits its best
//! guess or skips the offending bytes.
//!
//! String literals are lexed from the raw reader so that `--` inside a string
//! is not mistaken for a comment.

use std::io::Read;

use anyhow::Result;

use super::comments::CommentElider;
use super::reader::RawReader;
use super::token::{Token, TokenKind};

/// Maximum number of tokens that may be pushed back at once.
pub const TOKEN_PUSHBACK: usize = 3;

pub struct Tokenizer<R: Read> {
    chars: CommentElider<R>,
    pushback: Vec<Token>,
}

impl<R: Read> Tokenizer<R> {
    pub fn new(reader: RawReader<R>) -> Self {
        Self {
            chars: CommentElider::new(reader),
            pushback: Vec::with_capacity(TOKEN_PUSHBACK),
        }
    }

    pub fn next(&mut self) -> Result<Token> {
        if let Some(token) = self.pushback.pop() {
            return Ok(token);
        }

        let token = self.lex()?;
        if !token.is(TokenKind::Eof) {
            self.chars.comments().mark_code(token.line);
        }
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
            "tokenizer pushback overflow"
        );
        self.pushback.push(token);
    }

    fn lex(&mut self) -> Result<Token> {
        loop {
            let line = self.chars.line();
            let Some(c) = self.chars.next()? else {
                return Ok(Token::new(TokenKind::Eof, line));
            };

            let kind = match c {
                b'\n' => {
                    self.chars.comments().end_of_line();
                    continue;
                }
                b' ' | b'\t' | b'\r' => continue,
                b'+' | b'-' | b'*' | b'/' | b'^' | b'%' | b'#' => TokenKind::Operator1,
                b'<' | b'>' | b'=' => {
                    let raw = self.chars.reader();
                    let next = raw.next()?;
                    if next != Some(b'=') {
                        raw.unread(next);
                    }
                    TokenKind::Operator2
                }
                b'~' => {
                    let raw = self.chars.reader();
                    let next = raw.next()?;
                    if next == Some(b'=') {
                        TokenKind::Operator2
                    } else {
                        // A lone '~' is not Lua 5.1; skip it.
                        raw.unread(next);
                        continue;
                    }
                }
                b'(' => TokenKind::LParen,
                b')' => TokenKind::RParen,
                b',' => TokenKind::Comma,
                b';' => TokenKind::Other,
                b']' => TokenKind::RBracket,
                b'.' => match self.lex_dot()? {
                    Some(kind) => kind,
                    None => continue,
                },
                b'"' | b'\'' => return self.lex_quoted(c, line),
                b'[' => match self.lex_long_bracket(line)? {
                    Some(token) => return Ok(token),
                    None => continue,
                },
                b'0'..=b'9' => {
                    self.skip_number(c)?;
                    TokenKind::Number
                }
                c if c.is_ascii_alphabetic() || c == b'_' => return self.lex_name(c, line),
                _ => TokenKind::Other,
            };
            return Ok(Token::new(kind, line));
        }
    }

    /// `.`, `..` or `...`. Returns `None` when the dot starts a number like
    /// `.5`; the digit is pushed back so the next round lexes the number.
    fn lex_dot(&mut self) -> Result<Option<TokenKind>> {
        let raw = self.chars.reader();
        let c = raw.next()?;
        match c {
            Some(b'.') => {
                let c = raw.next()?;
                if c == Some(b'.') {
                    Ok(Some(TokenKind::Other))
                } else {
                    raw.unread(c);
                    Ok(Some(TokenKind::Concat))
                }
            }
            Some(b'0'..=b'9') => {
                raw.unread(c);
                Ok(None)
            }
            _ => {
                raw.unread(c);
                Ok(Some(TokenKind::Dot))
            }
        }
    }

    /// A `'…'` or `"…"` literal. Ends at the matching quote, an unescaped
    /// newline or end of input.
    fn lex_quoted(&mut self, quote: u8, line: usize) -> Result<Token> {
        let mut text = Vec::new();
        let raw = self.chars.reader();

        loop {
            match raw.next()? {
                Some(b'\\') => {
                    let c = raw.next()?;
                    match c {
                        None => break,
                        Some(b'a') => text.push(0x07),
                        Some(b'b') => text.push(0x08),
                        Some(b'f') => text.push(0x0c),
                        Some(b'n') => text.push(b'\n'),
                        Some(b'r') => text.push(b'\r'),
                        Some(b't') => text.push(b'\t'),
                        Some(b'v') => text.push(0x0b),
                        Some(b'0'..=b'9') => {
                            let mut value: u32 = 0;
                            let mut digits = 0;
                            let mut c = c;
                            while digits < 3 {
                                match c {
                                    Some(d @ b'0'..=b'9') => {
                                        value = value * 10 + u32::from(d - b'0');
                                        digits += 1;
                                        c = raw.next()?;
                                    }
                                    _ => break,
                                }
                            }
                            raw.unread(c);
                            // Out-of-range escapes are a lexical error; drop them.
                            if let Ok(byte) = u8::try_from(value) {
                                text.push(byte);
                            }
                        }
                        Some(other) => text.push(other),
                    }
                }
                Some(c) if c == quote || c == b'\n' => break,
                None => break,
                Some(c) => text.push(c),
            }
        }

        let comment = self.chars.comments().share();
        Ok(Token::string(text, comment, line))
    }

    /// Called after `[`. Returns a long string token, a plain `[` token, or
    /// `None` when the bracket was malformed (`[==` without a second `[`).
    fn lex_long_bracket(&mut self, line: usize) -> Result<Option<Token>> {
        let raw = self.chars.reader();
        let mut level = 0;
        let mut c = raw.next()?;
        while c == Some(b'=') {
            level += 1;
            c = raw.next()?;
        }

        if c != Some(b'[') {
            raw.unread(c);
            if level == 0 {
                return Ok(Some(Token::new(TokenKind::LBracket, line)));
            }
            return Ok(None);
        }

        let mut text = Vec::new();
        loop {
            match raw.next()? {
                None => break,
                Some(b']') => {
                    let mut closing = 0;
                    let mut c = raw.next()?;
                    while c == Some(b'=') {
                        closing += 1;
                        c = raw.next()?;
                    }
                    if c == Some(b']') && closing == level {
                        break;
                    }
                    // Not our closer. The byte after the '='s may still
                    // start one, as in `]=]==]`.
                    raw.unread(c);
                    text.push(b']');
                    text.extend(std::iter::repeat_n(b'=', closing));
                }
                Some(c) => text.push(c),
            }
        }

        let comment = self.chars.comments().share();
        Ok(Some(Token::string(text, comment, line)))
    }

    /// Skip over a numeric literal; its value is never needed.
    fn skip_number(&mut self, first: u8) -> Result<()> {
        let raw = self.chars.reader();
        let mut c = raw.next()?;

        if first == b'0' && matches!(c, Some(b'x' | b'X')) {
            c = raw.next()?;
            while matches!(c, Some(d) if d.is_ascii_hexdigit()) {
                c = raw.next()?;
            }
            raw.unread(c);
            return Ok(());
        }

        while matches!(c, Some(b'0'..=b'9')) {
            c = raw.next()?;
        }
        if c == Some(b'.') {
            c = raw.next()?;
            while matches!(c, Some(b'0'..=b'9')) {
                c = raw.next()?;
            }
        }
        if matches!(c, Some(b'e' | b'E')) {
            c = raw.next()?;
            if matches!(c, Some(b'+' | b'-')) {
                c = raw.next()?;
            }
            while matches!(c, Some(b'0'..=b'9')) {
                c = raw.next()?;
            }
        }
        raw.unread(c);
        Ok(())
    }

    fn lex_name(&mut self, first: u8, line: usize) -> Result<Token> {
        let raw = self.chars.reader();
        let mut name = vec![first];
        let mut c = raw.next()?;
        while let Some(ch) = c.filter(|ch| ch.is_ascii_alphanumeric() || *ch == b'_') {
            name.push(ch);
            c = raw.next()?;
        }
        raw.unread(c);

        let token = match name.as_slice() {
            b"not" => Token::new(TokenKind::Operator1, line),
            b"and" | b"or" => Token::new(TokenKind::Operator2, line),
            _ => Token::symbol(name, line),
        };
        Ok(token)
    }
}
