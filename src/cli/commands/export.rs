//! Export command handler

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use std::fs;
use std::path::PathBuf;

use crate::api::models::{ResourceFamily, TaskStatus};
use crate::config;
use crate::export::ExportFormat;
use crate::history::HistoryQuery;
use crate::selection::TERMINAL_ACTIONABLE;

#[derive(Args)]
pub struct ExportCommands {
    /// Resource family to export from
    #[arg(long, value_enum, default_value_t = ResourceFamily::Posts)]
    pub family: ResourceFamily,

    /// Output format
    #[arg(short = 'F', long, value_enum, default_value_t = ExportFormat::Csv)]
    pub format: ExportFormat,

    /// Directory the export file is written to
    #[arg(short, long, default_value = ".")]
    pub out: PathBuf,

    /// Restrict the export to these task ids (default: every terminal row
    /// on the page)
    #[arg(long)]
    pub ids: Vec<String>,

    /// Filter by note id (posts) or account id (influencers)
    #[arg(long)]
    pub id: Option<String>,

    /// Filter by author name (posts) or display name (influencers)
    #[arg(long)]
    pub author: Option<String>,

    /// Filter by task status
    #[arg(short, long, value_enum)]
    pub status: Option<TaskStatus>,

    /// Page number
    #[arg(short, long, default_value_t = 1)]
    pub page: u32,

    /// Page size
    #[arg(short, long)]
    pub limit: Option<u32>,
}

pub async fn handle_export_command(args: ExportCommands) -> Result<()> {
    let mut session = super::super::make_session()?;
    let query = HistoryQuery {
        page: args.page,
        limit: args.limit.unwrap_or(config::global().page_size),
        id_filter: args.id.clone(),
        author_filter: args.author.clone(),
        status_filter: args.status,
    };

    session.load_history(args.family, &query, true).await?;
    // Exports come from settled rows only.
    session.restrict_selection(args.family, TERMINAL_ACTIONABLE);

    if args.ids.is_empty() {
        session.select_all(args.family);
    } else {
        for id in &args.ids {
            session.toggle_selection(args.family, id)?;
        }
    }

    let selected = session.selection(args.family).len();
    let artifact = session.export_selection(args.family, args.format)?;

    let path = args.out.join(&artifact.filename);
    fs::write(&path, &artifact.bytes)
        .with_context(|| format!("Failed to write export file: {}", path.display()))?;

    println!(
        "📦 Exported {} record(s) to {}",
        selected.to_string().bright_green().bold(),
        path.display().to_string().cyan()
    );
    Ok(())
}
