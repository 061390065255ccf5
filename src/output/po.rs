//! PO template writer.

use std::io::Write;

use anyhow::{Context, Result};
use unicode_width::UnicodeWidthStr;

use super::CatalogWriter;
use crate::core::flags::FormatFlag;
use crate::core::{Catalog, CatalogEntry};

/// `#:` reference lines are wrapped at this display width.
const REFERENCE_WIDTH: usize = 79;

const HEADER: &str = r#"# SOME DESCRIPTIVE TITLE.
# Copyright (C) YEAR THE PACKAGE'S COPYRIGHT HOLDER
# This file is distributed under the same license as the PACKAGE package.
# FIRST AUTHOR <EMAIL@ADDRESS>, YEAR.
#
#, fuzzy
msgid ""
msgstr ""
"Project-Id-Version: PACKAGE VERSION\n"
"Report-Msgid-Bugs-To: \n"
"PO-Revision-Date: YEAR-MO-DA HO:MI+ZONE\n"
"Last-Translator: FULL NAME <EMAIL@ADDRESS>\n"
"Language-Team: LANGUAGE <LL@li.org>\n"
"Language: \n"
"MIME-Version: 1.0\n"
"Content-Type: text/plain; charset=UTF-8\n"
"Content-Transfer-Encoding: 8bit\n"
"#;

const PLURAL_FORMS: &str = "\"Plural-Forms: nplurals=INTEGER; plural=EXPRESSION;\\n\"\n";

#[derive(Debug, Clone, Copy, Default)]
pub struct PoOptions {
    pub no_location: bool,
    pub omit_header: bool,
}

#[derive(Debug, Clone)]
pub struct PoWriter {
    options: PoOptions,
}

impl PoWriter {
    pub fn new(options: PoOptions) -> Self {
        Self { options }
    }

    fn render(&self, catalog: &Catalog) -> String {
        let mut out = String::new();
        let mut first = true;

        if !self.options.omit_header {
            out.push_str(HEADER);
            if catalog.entries().iter().any(|e| e.plural.is_some()) {
                out.push_str(PLURAL_FORMS);
            }
            first = false;
        }

        for entry in catalog.entries() {
            if !first {
                out.push('\n');
            }
            first = false;
            self.render_entry(entry, &mut out);
        }
        out
    }

    fn render_entry(&self, entry: &CatalogEntry, out: &mut String) {
        for line in &entry.comments {
            if line.is_empty() {
                out.push_str("#.\n");
            } else {
                out.push_str("#. ");
                out.push_str(line);
                out.push('\n');
            }
        }

        if !self.options.no_location {
            render_references(entry, out);
        }

        match entry.format {
            FormatFlag::Yes | FormatFlag::Possible => out.push_str("#, lua-format\n"),
            FormatFlag::No => out.push_str("#, no-lua-format\n"),
            FormatFlag::Undecided | FormatFlag::Impossible => {}
        }

        if let Some(context) = &entry.context {
            render_field("msgctxt", context, out);
        }
        render_field("msgid", &entry.msgid, out);
        match &entry.plural {
            Some(plural) => {
                render_field("msgid_plural", plural, out);
                out.push_str("msgstr[0] \"\"\n");
                out.push_str("msgstr[1] \"\"\n");
            }
            None => out.push_str("msgstr \"\"\n"),
        }
    }
}

impl CatalogWriter for PoWriter {
    fn write_catalog(&self, catalog: &Catalog, out: &mut dyn Write) -> Result<()> {
        out.write_all(self.render(catalog).as_bytes())
            .context("Failed to write PO output")
    }
}

/// `#: file:line` lines, several references per line up to the wrap width.
fn render_references(entry: &CatalogEntry, out: &mut String) {
    let mut line = String::new();
    for position in &entry.positions {
        let reference = position.to_string();
        if !line.is_empty() && line.width() + 1 + reference.width() > REFERENCE_WIDTH {
            out.push_str(&line);
            out.push('\n');
            line.clear();
        }
        if line.is_empty() {
            line.push_str("#:");
        }
        line.push(' ');
        line.push_str(&reference);
    }
    if !line.is_empty() {
        out.push_str(&line);
        out.push('\n');
    }
}

/// `keyword "text"`, or `keyword ""` followed by one line per embedded
/// newline when the text spans several lines.
fn render_field(keyword: &str, text: &str, out: &mut String) {
    let segments: Vec<&str> = text.split_inclusive('\n').collect();
    out.push_str(keyword);
    if segments.len() <= 1 {
        out.push_str(" \"");
        out.push_str(&escape(text));
        out.push_str("\"\n");
        return;
    }

    out.push_str(" \"\"\n");
    for segment in segments {
        out.push('"');
        out.push_str(&escape(segment));
        out.push_str("\"\n");
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            '\u{07}' => escaped.push_str("\\a"),
            '\u{08}' => escaped.push_str("\\b"),
            '\u{0b}' => escaped.push_str("\\v"),
            '\u{0c}' => escaped.push_str("\\f"),
            c => escaped.push(c),
        }
    }
    escaped
}
