//! Raw byte reader: the first stage of the scanning pipeline.
//!
//! Yields bytes from the input, keeps the line counter in sync with every
//! newline read or unread, and drops a leading shebang line.

use std::io::{BufReader, Bytes, Read};

use anyhow::{Context, Result};

/// Maximum number of bytes that may be pushed back at once.
pub const READER_PUSHBACK: usize = 2;

pub struct RawReader<R: Read> {
    bytes: Bytes<BufReader<R>>,
    real_file_name: String,
    line: usize,
    pushback: Vec<u8>,
    at_start: bool,
}

impl<R: Read> RawReader<R> {
    pub fn new(input: R, real_file_name: impl Into<String>) -> Self {
        Self {
            bytes: BufReader::new(input).bytes(),
            real_file_name: real_file_name.into(),
            line: 1,
            pushback: Vec::with_capacity(READER_PUSHBACK),
            at_start: true,
        }
    }

    /// Current line number (1-indexed).
    pub fn line(&self) -> usize {
        self.line
    }

    /// Read the next byte, or `None` at end of input.
    pub fn next(&mut self) -> Result<Option<u8>> {
        let c = match self.pushback.pop() {
            Some(c) => Some(c),
            None => {
                let mut c = self.read_byte()?;
                if self.at_start {
                    self.at_start = false;
                    if c == Some(b'#') {
                        c = self.skip_shebang()?;
                    }
                }
                c
            }
        };

        if c == Some(b'\n') {
            self.line += 1;
        }
        Ok(c)
    }

    /// Push a byte back. Pushing back end of input is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if more than [`READER_PUSHBACK`] bytes are pending.
    pub fn unread(&mut self, c: Option<u8>) {
        let Some(c) = c else {
            return;
        };
        if c == b'\n' {
            self.line -= 1;
        }
        assert!(
            self.pushback.len() < READER_PUSHBACK,
            "reader pushback overflow in {}",
            self.real_file_name
        );
        self.pushback.push(c);
    }

    /// Discard the rest of a `#!` line and return the byte following it.
    /// The shebang's own newline still counts as a line.
    fn skip_shebang(&mut self) -> Result<Option<u8>> {
        loop {
            match self.read_byte()? {
                None => return Ok(None),
                Some(b'\n') => {
                    self.line += 1;
                    return self.read_byte();
                }
                Some(_) => {}
            }
        }
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        self.bytes
            .next()
            .transpose()
            .with_context(|| format!("error while reading \"{}\"", self.real_file_name))
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    fn from_str(source: &str) -> RawReader<io::Cursor<Vec<u8>>> {
        RawReader::new(io::Cursor::new(source.as_bytes().to_vec()), "test.lua")
    }

    fn drain(source: &str) -> (String, usize) {
        let mut reader = from_str(source);
        let mut out = Vec::new();
        while let Some(c) = reader.next().unwrap() {
            out.push(c);
        }
        (String::from_utf8(out).unwrap(), reader.line())
    }

    #[test]
    fn test_reads_all_bytes_and_counts_lines() {
        let (text, line) = drain("a\nb\nc");
        assert_eq!(text, "a\nb\nc");
        assert_eq!(line, 3);
    }

    #[test]
    fn test_shebang_is_dropped() {
        let (text, line) = drain("#!/usr/bin/env lua\nprint(1)\n");
        assert_eq!(text, "print(1)\n");
        assert_eq!(line, 3);
    }

    #[test]
    fn test_shebang_only_file() {
        let (text, line) = drain("#!/usr/bin/env lua");
        assert_eq!(text, "");
        assert_eq!(line, 1);
    }

    #[test]
    fn test_hash_after_start_is_kept() {
        let (text, _) = drain("x = #t");
        assert_eq!(text, "x = #t");
    }

    #[test]
    fn test_unread_newline_restores_line() {
        let mut reader = from_str("\nx");
        assert_eq!(reader.next().unwrap(), Some(b'\n'));
        assert_eq!(reader.line(), 2);
        reader.unread(Some(b'\n'));
        assert_eq!(reader.line(), 1);
        assert_eq!(reader.next().unwrap(), Some(b'\n'));
        assert_eq!(reader.next().unwrap(), Some(b'x'));
        assert_eq!(reader.line(), 2);
    }

    #[test]
    fn test_unread_is_lifo() {
        let mut reader = from_str("abc");
        let a = reader.next().unwrap();
        let b = reader.next().unwrap();
        reader.unread(b);
        reader.unread(a);
        assert_eq!(reader.next().unwrap(), Some(b'a'));
        assert_eq!(reader.next().unwrap(), Some(b'b'));
        assert_eq!(reader.next().unwrap(), Some(b'c'));
        assert_eq!(reader.next().unwrap(), None);
    }

    #[test]
    fn test_unread_end_of_input_is_noop() {
        let mut reader = from_str("");
        reader.unread(None);
        reader.unread(None);
        reader.unread(None);
        assert_eq!(reader.next().unwrap(), None);
    }

    #[test]
    #[should_panic(expected = "pushback overflow")]
    fn test_pushback_overflow_panics() {
        let mut reader = from_str("");
        reader.unread(Some(b'a'));
        reader.unread(Some(b'b'));
        reader.unread(Some(b'c'));
    }

    #[test]
    fn test_read_error_names_file() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("disk on fire"))
            }
        }

        let mut reader = RawReader::new(Broken, "broken.lua");
        let err = reader.next().unwrap_err();
        assert!(err.to_string().contains("broken.lua"));
    }
}
