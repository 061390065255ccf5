use super::super::exit_status::ExitStatus;

#[derive(Debug)]
pub enum CommandSummary {
    Extract(ExtractSummary),
    Init(InitSummary),
}

#[derive(Debug)]
pub struct ExtractSummary {
    /// Number of Lua sources read.
    pub file_count: usize,
    /// Number of catalog entries written.
    pub message_count: usize,
    /// Output path, `-` for stdout.
    pub output: String,
}

#[derive(Debug)]
pub struct InitSummary {
    pub created: bool,
}

/// Result of running xlua commands
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
}

impl CommandResult {
    pub fn exit_status(&self) -> ExitStatus {
        match &self.summary {
            CommandSummary::Init(InitSummary { created: false }) => ExitStatus::Failure,
            _ => ExitStatus::Success,
        }
    }
}
