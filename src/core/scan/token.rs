use super::comments::SharedComment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `..`
    Concat,
    /// `+ - * / % ^ # not`
    Operator1,
    /// `< > <= >= ~= == and or`
    Operator2,
    String,
    Number,
    Symbol,
    Other,
}

/// A lexed token.
///
/// `text` holds the decoded bytes of a string literal or the name of a
/// symbol and is empty for every other kind. `comment` is only ever set on
/// string literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: Vec<u8>,
    pub comment: Option<SharedComment>,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize) -> Self {
        Self {
            kind,
            text: Vec::new(),
            comment: None,
            line,
        }
    }

    pub fn string(text: Vec<u8>, comment: Option<SharedComment>, line: usize) -> Self {
        Self {
            kind: TokenKind::String,
            text,
            comment,
            line,
        }
    }

    pub fn symbol(name: Vec<u8>, line: usize) -> Self {
        Self {
            kind: TokenKind::Symbol,
            text: name,
            comment: None,
            line,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// The token text as UTF-8, replacing invalid sequences.
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.text).into_owned()
    }
}
