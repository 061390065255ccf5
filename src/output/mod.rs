//! Catalog writers.

mod json;
mod po;

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use clap::ValueEnum;
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

pub use json::JsonWriter;
pub use po::{PoOptions, PoWriter};

use crate::core::Catalog;

/// Output path meaning "write to standard output".
pub const STDOUT_PATH: &str = "-";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Gettext PO template
    #[default]
    Po,
    /// JSON array of catalog entries
    Json,
}

#[enum_dispatch]
pub trait CatalogWriter {
    fn write_catalog(&self, catalog: &Catalog, out: &mut dyn Write) -> Result<()>;
}

#[enum_dispatch(CatalogWriter)]
#[derive(Debug, Clone)]
pub enum OutputWriter {
    Po(PoWriter),
    Json(JsonWriter),
}

impl OutputWriter {
    pub fn new(format: OutputFormat, options: PoOptions) -> Self {
        match format {
            OutputFormat::Po => PoWriter::new(options).into(),
            OutputFormat::Json => JsonWriter.into(),
        }
    }

    /// Write `catalog` to `path`, or to stdout when `path` is `-`.
    pub fn write_to(&self, catalog: &Catalog, path: &str) -> Result<()> {
        if path == STDOUT_PATH {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            self.write_catalog(catalog, &mut out)?;
            return out.flush().context("Failed to write to stdout");
        }

        let path = Path::new(path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create file: {}", path.display()))?;
        let mut out = BufWriter::new(file);
        self.write_catalog(catalog, &mut out)?;
        out.flush()
            .with_context(|| format!("Failed to write file: {}", path.display()))
    }
}
