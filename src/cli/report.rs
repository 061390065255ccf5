//! Summary printing.
//!
//! Everything goes to stderr so that `-o -` keeps stdout for the catalog.

use std::io::{self, Write};

use colored::Colorize;

use super::commands::{CommandResult, CommandSummary, ExtractSummary, InitSummary};
use crate::config::CONFIG_FILE_NAME;
use crate::output::STDOUT_PATH;

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

pub fn print(result: &CommandResult) {
    print_to(result, &mut io::stderr().lock());
}

pub fn print_to<W: Write>(result: &CommandResult, writer: &mut W) {
    match &result.summary {
        CommandSummary::Extract(summary) => print_extract(summary, writer),
        CommandSummary::Init(summary) => print_init(summary, writer),
    }
}

fn print_extract<W: Write>(summary: &ExtractSummary, writer: &mut W) {
    if summary.file_count == 0 {
        let _ = writeln!(
            writer,
            "{} no Lua files found (check {} or the paths given)",
            "warning:".bold().yellow(),
            "includes".cyan()
        );
    }

    let destination = if summary.output == STDOUT_PATH {
        "stdout".to_string()
    } else {
        summary.output.clone()
    };

    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Extracted {} {} from {} {} into {}",
            summary.message_count,
            plural(summary.message_count, "message", "messages"),
            summary.file_count,
            plural(summary.file_count, "file", "files"),
            destination
        )
        .green()
    );
}

fn print_init<W: Write>(summary: &InitSummary, writer: &mut W) {
    if summary.created {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Created {}", CONFIG_FILE_NAME).green()
        );
    } else {
        let _ = writeln!(
            writer,
            "{} {}",
            FAILURE_MARK.red(),
            format!("{} already exists", CONFIG_FILE_NAME).red()
        );
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}
