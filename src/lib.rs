//! xlua - translatable string extractor for Lua
//!
//! xlua scans Lua sources for calls to gettext-style keywords such as
//! `_("Hello")` or `gettext.ngettext("one", "many", n)` and writes the
//! strings they carry to a PO template or JSON catalog.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (argument parsing, commands, reporting)
//! - `config`: Configuration file loading and parsing
//! - `core`: Lexing, extraction and the message catalog
//! - `output`: PO and JSON catalog writers

pub mod cli;
pub mod config;
pub mod core;
pub mod output;
