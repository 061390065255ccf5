//! The message catalog: deduplicated entries ready to be written out.
//!
//! The extractor reports every occurrence as an [`ExtractedMessage`] through
//! the [`MessageSink`] trait. [`Catalog`] merges occurrences that share a
//! msgctxt and msgid into one [`CatalogEntry`], collecting their positions,
//! comments and format flags.

use std::{collections::HashMap, fmt};

use serde::Serialize;

use crate::core::flags::FormatFlag;
use crate::core::format::{count_directives, guess_format_flag};
use crate::core::scan::SharedComment;

/// Source position of a message, as reported in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    /// Logical file name.
    pub file: String,
    /// Line number (1-indexed).
    pub line: usize,
}

impl Position {
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One occurrence of a translatable string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMessage {
    pub context: Option<String>,
    pub msgid: String,
    pub plural: Option<String>,
    pub position: Position,
    pub format: FormatFlag,
    /// Comment lines that preceded the literal.
    pub comment: Option<SharedComment>,
}

impl ExtractedMessage {
    pub fn new(msgid: impl Into<String>, position: Position) -> Self {
        Self {
            context: None,
            msgid: msgid.into(),
            plural: None,
            position,
            format: FormatFlag::Undecided,
            comment: None,
        }
    }
}

/// Receives messages as the extractor finds them.
pub trait MessageSink {
    fn remember(&mut self, message: ExtractedMessage);
}

impl MessageSink for Vec<ExtractedMessage> {
    fn remember(&mut self, message: ExtractedMessage) {
        self.push(message);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub msgid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plural: Option<String>,
    pub positions: Vec<Position>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
    pub format: FormatFlag,
}

type EntryKey = (Option<String>, String);

#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<EntryKey, usize>,
    /// `None`: keep no comments. `Some("")`: keep all. Otherwise keep the
    /// comment block starting at the first line that begins with the tag.
    comment_tag: Option<String>,
}

impl Catalog {
    pub fn new(comment_tag: Option<String>) -> Self {
        Self {
            comment_tag,
            ..Self::default()
        }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sort entries by msgid, then msgctxt.
    pub fn sort_by_msgid(&mut self) {
        self.entries.sort_by(|a, b| {
            a.msgid
                .cmp(&b.msgid)
                .then_with(|| a.context.cmp(&b.context))
        });
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| ((e.context.clone(), e.msgid.clone()), i))
            .collect();
    }

    fn select_comments<'c>(&self, lines: &'c [String]) -> &'c [String] {
        match self.comment_tag.as_deref() {
            None => &[],
            Some("") => lines,
            Some(tag) => lines
                .iter()
                .position(|line| line.trim_start().starts_with(tag))
                .map_or(&[], |start| &lines[start..]),
        }
    }
}

impl MessageSink for Catalog {
    fn remember(&mut self, message: ExtractedMessage) {
        if message.msgid.is_empty() {
            tracing::warn!(
                "{}: empty msgid, reserved for the catalog header; skipped",
                message.position
            );
            return;
        }

        let format = guess_format_flag(message.format, &message.msgid);
        if format == FormatFlag::Yes {
            if let Err(reason) = count_directives(&message.msgid) {
                tracing::warn!(
                    "{}: \"{}\" is not a valid Lua format string: {}",
                    message.position,
                    message.msgid,
                    reason
                );
            }
        }

        let comments: Vec<String> = message
            .comment
            .as_deref()
            .map(|lines| self.select_comments(lines).to_vec())
            .unwrap_or_default();

        let key = (message.context.clone(), message.msgid.clone());
        let index = match self.index.get(&key) {
            Some(&index) => index,
            None => {
                self.entries.push(CatalogEntry {
                    context: message.context,
                    msgid: message.msgid,
                    plural: None,
                    positions: Vec::new(),
                    comments: Vec::new(),
                    format: FormatFlag::Undecided,
                });
                self.index.insert(key, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };

        let entry = &mut self.entries[index];
        if !entry.positions.contains(&message.position) {
            entry.positions.push(message.position.clone());
        }
        for line in comments {
            if !entry.comments.contains(&line) {
                entry.comments.push(line);
            }
        }
        entry.format = entry.format.merge(format);

        match (&entry.plural, message.plural) {
            (None, plural) => entry.plural = plural,
            (Some(existing), Some(plural)) if *existing != plural => {
                tracing::warn!(
                    "{}: msgid \"{}\" already has plural \"{}\"; ignoring \"{}\"",
                    message.position,
                    entry.msgid,
                    existing,
                    plural
                );
            }
            _ => {}
        }
    }
}
