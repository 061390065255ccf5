//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `extract`: Extract translatable strings from Lua sources into a catalog
//! - `init`: Initialize xlua configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Extract(args)) => args.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Source code root directory (where the config file search starts)
    #[arg(long)]
    pub source_root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Files or directories to extract from (default: config includes under the source root)
    pub paths: Vec<PathBuf>,

    /// Output file, or - for stdout (overrides config file)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<String>,

    /// Output format (overrides config file)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Additional keyword, as NAME or NAME:ARGS (e.g. tr:1,2 or pgettext:1c,2)
    #[arg(short = 'k', long = "keyword", value_name = "SPEC")]
    pub keywords: Vec<String>,

    /// Do not use the default keywords
    #[arg(long)]
    pub no_default_keywords: bool,

    /// Additional flag, as NAME:ARG:FLAG (e.g. log:1:lua-format)
    #[arg(long = "flag", value_name = "SPEC")]
    pub flags: Vec<String>,

    /// Extract all string literals
    #[arg(short = 'a', long)]
    pub extract_all: bool,

    /// Keep comments preceding keyword calls; with TAG, only from the line starting with TAG
    #[arg(
        short = 'c',
        long,
        value_name = "TAG",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = ""
    )]
    pub add_comments: Option<String>,

    /// Sort entries by msgid
    #[arg(long)]
    pub sort_output: bool,

    /// Do not write #: source references
    #[arg(long)]
    pub no_location: bool,

    /// Do not write the PO header entry
    #[arg(long)]
    pub omit_header: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract translatable strings from Lua sources
    Extract(ExtractArgs),
    /// Initialize a new .xluarc.json configuration file
    Init,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(args: &[&str]) -> ExtractArgs {
        let args = Arguments::try_parse_from(std::iter::once("xlua").chain(args.iter().copied()))
            .unwrap();
        match args.command {
            Some(Command::Extract(extract)) => extract,
            other => panic!("expected extract, got {:?}", other),
        }
    }

    #[test]
    fn test_add_comments_forms() {
        assert_eq!(parse(&["extract"]).add_comments, None);
        assert_eq!(parse(&["extract", "-c"]).add_comments.as_deref(), Some(""));
        assert_eq!(
            parse(&["extract", "--add-comments=TRANSLATORS:", "a.lua"]).add_comments.as_deref(),
            Some("TRANSLATORS:")
        );

        let args = parse(&["extract", "-c", "a.lua"]);
        assert_eq!(args.add_comments.as_deref(), Some(""));
        assert_eq!(args.paths, vec![PathBuf::from("a.lua")]);
    }

    #[test]
    fn test_repeated_keywords_and_flags() {
        let args = parse(&[
            "extract",
            "-k",
            "tr",
            "--keyword",
            "trn:1,2",
            "--flag",
            "log:1:lua-format",
            "--format",
            "json",
            "-o",
            "-",
        ]);
        assert_eq!(args.keywords, vec!["tr", "trn:1,2"]);
        assert_eq!(args.flags, vec!["log:1:lua-format"]);
        assert_eq!(args.format, Some(OutputFormat::Json));
        assert_eq!(args.output.as_deref(), Some("-"));
    }

    #[test]
    fn test_verbose() {
        let args = Arguments::try_parse_from(["xlua", "extract", "-v"]).unwrap();
        assert!(args.verbose());
        let args = Arguments::try_parse_from(["xlua", "init"]).unwrap();
        assert!(!args.verbose());
    }
}
