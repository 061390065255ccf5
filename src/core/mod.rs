//! Extraction core.
//!
//! - `scan`: the lexical pipeline, from bytes to folded tokens
//! - `extract`: the engine that finds keyword calls in the token stream
//! - `keywords` / `flags` / `format`: what counts as a message and how it is
//!   flagged
//! - `catalog`: deduplicated messages ready for output
//! - `context`: one extraction run over a set of files

pub mod catalog;
pub mod context;
pub mod extract;
pub mod file_scanner;
pub mod flags;
pub mod format;
pub mod keywords;
pub mod scan;

pub use catalog::{Catalog, CatalogEntry, ExtractedMessage, MessageSink, Position};
pub use context::ExtractContext;
pub use extract::{ExtractSettings, extract_file, extract_source};
