//! Comment elision: the second stage of the scanning pipeline.
//!
//! Lua has two comment forms:
//!
//! ```lua
//! -- short comment, runs to the end of the line
//! --[==[ long comment, closed by a bracket
//!        with the same number of '=' ]==]
//! ```
//!
//! [`CommentElider`] removes both forms from the byte stream. A short comment
//! is replaced by a single `'\n'` and a long one by a single `' '`, so the
//! tokenizer never sees comment syntax. The comment text is trimmed and handed
//! to [`PendingComments`], from where it is attached to the next string
//! literal.

use std::io::Read;
use std::sync::Arc;

use anyhow::Result;

use super::reader::RawReader;

/// Comment lines shared between every literal lexed while they were pending.
pub type SharedComment = Arc<Vec<String>>;

/// Comment lines waiting to be attached to the next string literal.
///
/// Handles given out by [`PendingComments::share`] are copy-on-write: adding
/// or resetting never changes a handle that a token already holds.
#[derive(Debug, Default)]
pub struct PendingComments {
    lines: SharedComment,
    last_comment_line: Option<usize>,
    last_code_line: Option<usize>,
}

impl PendingComments {
    pub fn add(&mut self, line: String) {
        Arc::make_mut(&mut self.lines).push(line);
    }

    /// A handle to the current lines, or `None` when nothing is pending.
    pub fn share(&self) -> Option<SharedComment> {
        if self.lines.is_empty() {
            None
        } else {
            Some(Arc::clone(&self.lines))
        }
    }

    pub fn reset(&mut self) {
        if !self.lines.is_empty() {
            self.lines = SharedComment::default();
        }
    }

    /// Record that a comment ended on `line`.
    pub fn mark_comment(&mut self, line: usize) {
        self.last_comment_line = Some(line);
    }

    /// Record that a code token was produced on `line`.
    pub fn mark_code(&mut self, line: usize) {
        self.last_code_line = Some(line);
    }

    /// Called at every newline: comments followed by a line of code that was
    /// not their literal are no longer attachable.
    pub fn end_of_line(&mut self) {
        if self.last_code_line > self.last_comment_line {
            self.reset();
        }
    }
}

pub struct CommentElider<R: Read> {
    reader: RawReader<R>,
    comments: PendingComments,
    buffer: Vec<u8>,
}

impl<R: Read> CommentElider<R> {
    pub fn new(reader: RawReader<R>) -> Self {
        Self {
            reader,
            comments: PendingComments::default(),
            buffer: Vec::new(),
        }
    }

    pub fn reader(&mut self) -> &mut RawReader<R> {
        &mut self.reader
    }

    pub fn comments(&mut self) -> &mut PendingComments {
        &mut self.comments
    }

    pub fn line(&self) -> usize {
        self.reader.line()
    }

    /// Next non-comment byte, or `None` at end of input.
    pub fn next(&mut self) -> Result<Option<u8>> {
        let c = self.reader.next()?;
        if c != Some(b'-') {
            return Ok(c);
        }

        let c = self.reader.next()?;
        if c != Some(b'-') {
            self.reader.unread(c);
            return Ok(Some(b'-'));
        }

        let start_line = self.reader.line();
        let c = self.reader.next()?;
        if c != Some(b'[') {
            self.buffer.clear();
            self.reader.unread(c);
            self.eat_comment_line()?;
            self.comments.mark_comment(start_line);
            return Ok(Some(b'\n'));
        }

        let mut level = 0;
        let mut c = self.reader.next()?;
        while c == Some(b'=') {
            level += 1;
            c = self.reader.next()?;
        }

        if c == Some(b'[') {
            self.eat_long_comment(level)?;
            let end_line = self.reader.line();
            self.comments.mark_comment(end_line);
            return Ok(Some(b' '));
        }

        // `--[==` without a second bracket is an ordinary short comment.
        self.reader.unread(c);
        self.buffer.clear();
        self.buffer.push(b'[');
        self.buffer.extend(std::iter::repeat_n(b'=', level));
        self.eat_comment_line()?;
        self.comments.mark_comment(start_line);
        Ok(Some(b'\n'))
    }

    /// Consume the rest of a short comment, up to and including its newline.
    fn eat_comment_line(&mut self) -> Result<()> {
        loop {
            match self.reader.next()? {
                None | Some(b'\n') => {
                    self.flush_line(0);
                    return Ok(());
                }
                Some(b' ' | b'\t') if self.buffer.is_empty() => {}
                Some(c) => self.buffer.push(c),
            }
        }
    }

    /// Consume a long comment body up to the `]`, `level` times `=`, `]`
    /// closer. Every physical line becomes its own comment line.
    fn eat_long_comment(&mut self, level: usize) -> Result<()> {
        self.buffer.clear();
        // Number of '=' seen since the last ']', while a closer may be open.
        let mut closer: Option<usize> = None;

        loop {
            let Some(c) = self.reader.next()? else {
                if !self.buffer.is_empty() {
                    self.flush_line(0);
                }
                return Ok(());
            };

            if self.buffer.is_empty() && (c == b' ' || c == b'\t') {
                continue;
            }
            self.buffer.push(c);

            match (c, closer) {
                (b']', Some(seen)) if seen == level => {
                    self.flush_line(level + 2);
                    return Ok(());
                }
                (b']', _) => closer = Some(0),
                (b'=', Some(seen)) => closer = Some(seen + 1),
                (b'\n', _) => {
                    self.flush_line(1);
                    closer = None;
                }
                _ => closer = None,
            }
        }
    }

    /// Drop the last `strip` bytes plus trailing blanks and carriage returns,
    /// then hand the line over to the pending comments.
    fn flush_line(&mut self, strip: usize) {
        let len = self.buffer.len().saturating_sub(strip);
        self.buffer.truncate(len);
        while matches!(self.buffer.last(), Some(b' ' | b'\t' | b'\r')) {
            self.buffer.pop();
        }
        let line = String::from_utf8_lossy(&self.buffer).into_owned();
        self.comments.add(line);
        self.buffer.clear();
    }
}
