use std::io::Read;

use anyhow::Result;

use super::ExtractSettings;
use super::arglist::{ArgumentAccumulator, decode_literal};
use crate::core::catalog::{ExtractedMessage, MessageSink, Position};
use crate::core::flags::{ContextIter, FlagContext};
use crate::core::keywords::CallShape;
use crate::core::scan::{Lexer, Token, TokenKind};

/// Groups nested deeper than this are not descended into; their brackets
/// only reset the state of the innermost open group.
pub const MAX_NESTING_DEPTH: usize = 200;

/// Walks the token stream of one file and reports messages to a sink.
///
/// Owns the whole scanning state of the file, so independent files can be
/// processed on independent extractors.
pub struct Extractor<'s, R: Read> {
    tokens: Lexer<R>,
    settings: &'s ExtractSettings,
    file: String,
    depth: usize,
    depth_warned: bool,
}

/// State of one bracketed group.
struct Frame<'s> {
    /// 1-based index of the current argument.
    arg: usize,
    /// Shape of the keyword just seen, if the previous token was one.
    keyword: Option<CallShape>,
    outer: FlagContext,
    contexts: ContextIter<'s>,
    /// Flag context of the current argument.
    current: FlagContext,
    /// Argument contexts for a call opened by the next `(`.
    next_contexts: ContextIter<'s>,
}

impl<'s> Frame<'s> {
    fn new(outer: FlagContext, mut contexts: ContextIter<'s>) -> Self {
        let current = contexts.advance().inherit(outer);
        Self {
            arg: 1,
            keyword: None,
            outer,
            contexts,
            current,
            next_contexts: ContextIter::Passthrough,
        }
    }

    fn next_argument(&mut self) {
        self.arg += 1;
        self.current = self.contexts.advance().inherit(self.outer);
        self.keyword = None;
        self.next_contexts = ContextIter::Passthrough;
    }

    fn reset(&mut self) {
        self.keyword = None;
        self.next_contexts = ContextIter::Null;
    }
}

impl<'s, R: Read> Extractor<'s, R> {
    pub fn new(tokens: Lexer<R>, settings: &'s ExtractSettings, file: impl Into<String>) -> Self {
        Self {
            tokens,
            settings,
            file: file.into(),
            depth: 0,
            depth_warned: false,
        }
    }

    /// Extract until end of input. Unbalanced closing brackets at the top
    /// level end the current group and scanning resumes after them.
    pub fn run(mut self, sink: &mut dyn MessageSink) -> Result<()> {
        while !self.extract_group(
            TokenKind::Eof,
            FlagContext::NULL,
            ContextIter::Null,
            ArgumentAccumulator::unbound(),
            sink,
        )? {}
        Ok(())
    }

    /// Process tokens up to `closer`. Returns true once end of input has been
    /// reached, at any depth.
    fn extract_group(
        &mut self,
        closer: TokenKind,
        outer: FlagContext,
        contexts: ContextIter<'s>,
        mut args: ArgumentAccumulator,
        sink: &mut dyn MessageSink,
    ) -> Result<bool> {
        let settings = self.settings;
        let mut frame = Frame::new(outer, contexts);

        loop {
            let token = self.tokens.next()?;
            match token.kind {
                TokenKind::Symbol => {
                    frame.keyword = settings.keywords.get(&token.text).copied();
                    frame.next_contexts = settings.flags.iter(&token.text);
                }
                TokenKind::LParen | TokenKind::LBracket if self.depth >= MAX_NESTING_DEPTH => {
                    self.warn_too_deep(token.line);
                    frame.reset();
                }
                TokenKind::LParen => {
                    let call_args = ArgumentAccumulator::new(frame.keyword);
                    self.depth += 1;
                    let at_eof = self.extract_group(
                        TokenKind::RParen,
                        frame.current,
                        frame.next_contexts,
                        call_args,
                        sink,
                    )?;
                    self.depth -= 1;
                    if at_eof {
                        args.finish(frame.arg, sink);
                        return Ok(true);
                    }
                    frame.reset();
                }
                TokenKind::LBracket => {
                    self.depth += 1;
                    let at_eof = self.extract_group(
                        TokenKind::RBracket,
                        FlagContext::NULL,
                        ContextIter::Null,
                        ArgumentAccumulator::unbound(),
                        sink,
                    )?;
                    self.depth -= 1;
                    if at_eof {
                        args.finish(frame.arg, sink);
                        return Ok(true);
                    }
                    frame.reset();
                }
                TokenKind::RParen | TokenKind::RBracket => {
                    if token.kind == closer || closer == TokenKind::Eof {
                        args.finish(frame.arg, sink);
                        return Ok(false);
                    }
                    frame.reset();
                }
                TokenKind::Comma => frame.next_argument(),
                TokenKind::Eof => {
                    args.finish(frame.arg, sink);
                    return Ok(true);
                }
                TokenKind::String => {
                    self.handle_string(token, &frame, &mut args, sink);
                    frame.reset();
                }
                TokenKind::Dot
                | TokenKind::Concat
                | TokenKind::Operator1
                | TokenKind::Operator2
                | TokenKind::Number
                | TokenKind::Other => frame.reset(),
            }
        }
    }

    fn warn_too_deep(&mut self, line: usize) {
        if !self.depth_warned {
            self.depth_warned = true;
            tracing::warn!(
                "{}:{}: brackets nested deeper than {} levels; inner calls are skipped",
                self.file,
                line,
                MAX_NESTING_DEPTH
            );
        }
    }

    fn handle_string(
        &self,
        token: Token,
        frame: &Frame<'_>,
        args: &mut ArgumentAccumulator,
        sink: &mut dyn MessageSink,
    ) {
        let position = Position::new(self.file.as_str(), token.line);

        if self.settings.extract_all {
            let text = decode_literal(&token.text, &position);
            sink.remember(ExtractedMessage {
                format: frame.current.is_format,
                comment: token.comment,
                ..ExtractedMessage::new(text, position)
            });
        } else if let Some(shape) = frame.keyword {
            // `f "literal"`: a call with a single literal argument.
            let mut call_args = ArgumentAccumulator::new(Some(shape));
            call_args.remember(1, &token.text, frame.current, position, token.comment);
            call_args.finish(1, sink);
        } else {
            args.remember(frame.arg, &token.text, frame.current, position, token.comment);
        }
    }
}
