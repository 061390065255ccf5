use anyhow::Result;

use super::super::args::ExtractArgs;
use super::{CommandResult, CommandSummary, ExtractSummary};
use crate::core::ExtractContext;

pub fn extract(args: &ExtractArgs) -> Result<CommandResult> {
    let ctx = ExtractContext::new(args)?;
    let catalog = ctx.extract()?;

    ctx.writer().write_to(&catalog, &ctx.config.output)?;
    tracing::debug!(
        "wrote {} entries to {}",
        catalog.len(),
        ctx.config.output
    );

    Ok(CommandResult {
        summary: CommandSummary::Extract(ExtractSummary {
            file_count: ctx.files.len(),
            message_count: catalog.len(),
            output: ctx.config.output.clone(),
        }),
    })
}
