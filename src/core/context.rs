use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use colored::Colorize;
use rayon::prelude::*;

use crate::{
    cli::args::ExtractArgs,
    config::{CONFIG_FILE_NAME, Config, load_config},
    core::{
        catalog::{Catalog, ExtractedMessage, MessageSink},
        extract::{ExtractSettings, extract_file},
        file_scanner::scan_files,
        flags::FlagTable,
        keywords::KeywordTable,
    },
    output::{OutputWriter, PoOptions},
};

/// A source file to extract from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceFile {
    /// Path used to open the file.
    pub path: PathBuf,
    /// Name recorded in message positions.
    pub logical_name: String,
}

/// One extraction run: merged configuration, the files to read and the
/// settings shared by every file.
///
/// Configuration is merged with the following priority (highest to lowest):
/// 1. CLI arguments (e.g. `--keyword tr`)
/// 2. `.xluarc.json` config file
/// 3. Built-in defaults
pub struct ExtractContext {
    pub config: Config,
    pub files: Vec<SourceFile>,
    pub settings: ExtractSettings,
}

impl ExtractContext {
    pub fn new(args: &ExtractArgs) -> Result<Self> {
        let verbose = args.common.verbose;
        let root_dir = args
            .common
            .source_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));

        let config_result = load_config(&root_dir)?;
        if verbose && !config_result.from_file {
            eprintln!(
                "Note: No {} found, using default configuration",
                CONFIG_FILE_NAME
            );
        }

        let mut config = config_result.config;
        apply_overrides(&mut config, args);
        config.validate()?;

        let mut keyword_specs = config.keywords.clone();
        keyword_specs.extend(args.keywords.iter().cloned());
        let mut flag_specs = config.flags.clone();
        flag_specs.extend(args.flags.iter().cloned());

        let settings = ExtractSettings {
            keywords: KeywordTable::from_specs(&keyword_specs, !config.no_default_keywords)?,
            flags: FlagTable::from_specs(&flag_specs)?,
            extract_all: config.extract_all,
        };
        if settings.keywords.is_empty() && !settings.extract_all {
            eprintln!(
                "{} no keywords are defined; nothing will be extracted",
                "warning:".bold().yellow()
            );
        }

        let (files, skipped_count) = collect_files(&root_dir, &args.paths, &config, verbose)?;

        if skipped_count > 0 {
            eprintln!(
                "{} {} path(s) skipped due to access errors{}",
                "warning:".bold().yellow(),
                skipped_count,
                if verbose { "" } else { " (use -v for details)" }
            );
        }

        Ok(Self {
            config,
            files,
            settings,
        })
    }

    /// Extract every file into a fresh catalog.
    ///
    /// Files are scanned in parallel; their messages are merged in file order
    /// so the catalog does not depend on scheduling.
    pub fn extract(&self) -> Result<Catalog> {
        let per_file: Vec<Result<Vec<ExtractedMessage>>> = self
            .files
            .par_iter()
            .map(|file| {
                let mut found = Vec::new();
                extract_file(&file.path, &file.logical_name, &self.settings, &mut found)?;
                Ok(found)
            })
            .collect();

        let mut catalog = Catalog::new(self.config.add_comments.clone());
        for messages in per_file {
            for message in messages? {
                catalog.remember(message);
            }
        }

        if self.config.sort_output {
            catalog.sort_by_msgid();
        }
        Ok(catalog)
    }

    pub fn writer(&self) -> OutputWriter {
        OutputWriter::new(
            self.config.output_format,
            PoOptions {
                no_location: self.config.no_location,
                omit_header: self.config.omit_header,
            },
        )
    }
}

fn apply_overrides(config: &mut Config, args: &ExtractArgs) {
    if let Some(output) = &args.output {
        config.output = output.clone();
    }
    if let Some(format) = args.format {
        config.output_format = format;
    }
    if args.add_comments.is_some() {
        config.add_comments = args.add_comments.clone();
    }
    config.no_default_keywords |= args.no_default_keywords;
    config.extract_all |= args.extract_all;
    config.sort_output |= args.sort_output;
    config.no_location |= args.no_location;
    config.omit_header |= args.omit_header;
}

/// Explicit paths win over the configured includes. Files named on the
/// command line are taken whatever their extension.
fn collect_files(
    root_dir: &Path,
    paths: &[PathBuf],
    config: &Config,
    verbose: bool,
) -> Result<(Vec<SourceFile>, usize)> {
    if paths.is_empty() {
        let scan = scan_files(root_dir, &config.includes, &config.ignores, verbose);
        let files = scan
            .files
            .into_iter()
            .map(|path| {
                let logical_name = logical_name(&path, root_dir);
                SourceFile { path, logical_name }
            })
            .collect();
        return Ok((files, scan.skipped_count));
    }

    let mut files = Vec::new();
    let mut skipped_count = 0;
    for path in paths {
        let metadata = path
            .metadata()
            .with_context(|| format!("Cannot access {}", path.display()))?;
        if metadata.is_dir() {
            let scan = scan_files(path, &[], &config.ignores, verbose);
            skipped_count += scan.skipped_count;
            files.extend(scan.files.into_iter().map(|file| SourceFile {
                logical_name: logical_name(&file, Path::new(".")),
                path: file,
            }));
        } else {
            files.push(SourceFile {
                path: path.clone(),
                logical_name: logical_name(path, Path::new(".")),
            });
        }
    }
    files.sort();
    files.dedup();
    Ok((files, skipped_count))
}

/// `path` relative to `base` with `/` separators, or as given when it lies
/// elsewhere.
fn logical_name(path: &Path, base: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    let relative = relative.strip_prefix(".").unwrap_or(relative);
    relative
        .to_string_lossy()
        .replace(std::path::MAIN_SEPARATOR, "/")
}
