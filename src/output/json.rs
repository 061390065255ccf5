use std::io::Write;

use anyhow::{Context, Result};

use super::CatalogWriter;
use crate::core::Catalog;

/// Writes the catalog entries as a pretty-printed JSON array.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonWriter;

impl CatalogWriter for JsonWriter {
    fn write_catalog(&self, catalog: &Catalog, out: &mut dyn Write) -> Result<()> {
        let content =
            serde_json::to_string_pretty(catalog.entries()).context("Failed to serialize JSON")?;
        writeln!(out, "{}", content).context("Failed to write JSON output")
    }
}
