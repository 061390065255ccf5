//! Message extraction from Lua sources.
//!
//! The engine tracks bracket nesting and argument positions over the token
//! stream from [`crate::core::scan`]. A string literal is reported when it
//! sits in a message slot of a keyword call:
//!
//! - `_("Hello")` and `_ "Hello"` yield `Hello`
//! - `gettext.ngettext("one", "many", n)` yields a message with a plural
//! - `print("Hello")` yields nothing, unless extract-all is on

mod arglist;
mod engine;

use std::{fs::File, io::Read, path::Path};

use anyhow::{Context, Result};

pub use arglist::ArgumentAccumulator;
pub use engine::Extractor;

use crate::core::catalog::MessageSink;
use crate::core::flags::FlagTable;
use crate::core::keywords::KeywordTable;
use crate::core::scan;

/// What to extract. Shared read-only by every file of a run.
#[derive(Debug, Clone)]
pub struct ExtractSettings {
    pub keywords: KeywordTable,
    pub flags: FlagTable,
    /// Report every string literal, keyword or not.
    pub extract_all: bool,
}

impl ExtractSettings {
    pub fn new(keywords: KeywordTable, flags: FlagTable) -> Self {
        Self {
            keywords,
            flags,
            extract_all: false,
        }
    }
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self::new(KeywordTable::with_defaults(), FlagTable::with_defaults())
    }
}

/// Extract every message of `input` into `sink`.
///
/// `real_file_name` names the input in I/O errors; `logical_file_name` is the
/// name recorded in message positions.
pub fn extract_source<R: Read>(
    input: R,
    real_file_name: &str,
    logical_file_name: &str,
    settings: &ExtractSettings,
    sink: &mut dyn MessageSink,
) -> Result<()> {
    let tokens = scan::lexer(input, real_file_name);
    Extractor::new(tokens, settings, logical_file_name).run(sink)
}

/// Open `path` and extract its messages, recorded under `logical_file_name`.
pub fn extract_file(
    path: &Path,
    logical_file_name: &str,
    settings: &ExtractSettings,
    sink: &mut dyn MessageSink,
) -> Result<()> {
    let real_file_name = path.display().to_string();
    let file = File::open(path)
        .with_context(|| format!("error while opening \"{}\" for reading", real_file_name))?;
    tracing::debug!("extracting {}", real_file_name);
    extract_source(file, &real_file_name, logical_file_name, settings, sink)
}
