//! Submit command handler

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use std::fs;
use std::io::Read;
use std::path::PathBuf;

use crate::api::models::{MonitorInterval, TaskKind};
use crate::queue::QueueItemStatus;

#[derive(Args)]
pub struct SubmitCommands {
    /// URLs passed inline, one per argument
    pub urls: Vec<String>,

    /// File with one URL per line; reads stdin when neither URLs nor a
    /// file are given
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Task kind to create
    #[arg(short, long, value_enum, default_value_t = TaskKind::PostMonitor)]
    pub kind: TaskKind,

    /// Monitor interval for recurring kinds (ignored for content-extract)
    #[arg(short, long, value_enum, default_value_t = MonitorInterval::Daily)]
    pub interval: MonitorInterval,
}

pub async fn handle_submit_command(args: SubmitCommands) -> Result<()> {
    if !args.urls.is_empty() && args.file.is_some() {
        anyhow::bail!("Cannot specify both inline URLs and --file");
    }

    let input = if !args.urls.is_empty() {
        args.urls.join("\n")
    } else if let Some(path) = &args.file {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read URL file: {}", path.display()))?
    } else {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read URLs from stdin")?;
        buffer
    };

    let mut session = super::super::make_session()?;
    let report = if args.kind == TaskKind::ContentExtract {
        session.submit_extract_batch(&input).await?
    } else {
        session
            .submit_monitor_batch(&input, args.kind, args.interval)
            .await?
    };

    println!(
        "✅ {} of {} submitted URL(s) created as {} tasks",
        report.created.to_string().bright_green().bold(),
        report.submitted.len(),
        args.kind
    );
    if !report.invalid.is_empty() {
        println!(
            "⚠️  {} line(s) skipped (not a supported platform URL):",
            report.invalid.len().to_string().yellow()
        );
        for url in &report.invalid {
            println!("   {}", url.dimmed());
        }
    }
    if !report.failed_urls.is_empty() {
        println!(
            "❌ {} URL(s) rejected by the backend:",
            report.failed_urls.len().to_string().red()
        );
        for url in &report.failed_urls {
            println!("   {}", url.dimmed());
        }
    }

    for item in session.queue.items() {
        let marker = match item.status {
            QueueItemStatus::Completed => "✓".green(),
            QueueItemStatus::Failed => "✗".red(),
            _ => "…".dimmed(),
        };
        match &item.server_task_id {
            Some(task_id) => println!("{} {} -> {}", marker, item.url, task_id.cyan()),
            None => println!("{} {}", marker, item.url),
        }
    }

    Ok(())
}
