use clap::{Parser, Subcommand};

use super::commands::export::ExportCommands;
use super::commands::history::HistoryCommands;
use super::commands::submit::SubmitCommands;
use super::commands::tasks::TaskCommands;

#[derive(Parser)]
#[command(name = "watchdesk")]
#[command(about = "A CLI for social media monitoring and content extraction workflows")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit URL batches for monitoring or extraction
    Submit(SubmitCommands),
    /// List and control monitoring tasks
    Tasks(TaskCommands),
    /// Browse collected post and influencer history
    History(HistoryCommands),
    /// Export history rows to CSV, Markdown, or tab-delimited text
    Export(ExportCommands),
}
