//! Lexical scanning of Lua sources.
//!
//! Each stage wraps the previous one and pulls from it on demand:
//!
//! ```text
//! RawReader -> CommentElider -> Tokenizer -> ConcatFolder -> NameFolder
//! ```

mod comments;
mod fold;
mod reader;
mod token;
mod tokenizer;

use std::io::Read;

pub use comments::SharedComment;
pub use fold::{ConcatFolder, NameFolder};
pub use reader::RawReader;
pub use token::{Token, TokenKind};
pub use tokenizer::Tokenizer;

/// The complete scanning pipeline for one input.
pub type Lexer<R> = NameFolder<R>;

/// Build the pipeline over `input`. `real_file_name` is used in I/O errors.
pub fn lexer<R: Read>(input: R, real_file_name: impl Into<String>) -> Lexer<R> {
    NameFolder::new(ConcatFolder::new(Tokenizer::new(RawReader::new(
        input,
        real_file_name,
    ))))
}
