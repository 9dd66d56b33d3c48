//! Task list and bulk control command handlers

use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::*;

use crate::actions::{
    AutoConfirm, BatchAction, BatchActionCoordinator, BatchReport, ConfirmPolicy, Confirmation,
};
use crate::api::MonitorClient;
use crate::api::models::{TaskKind, TaskListQuery, TaskStatus};
use crate::config::{self, Config};

#[derive(Args)]
pub struct TaskCommands {
    #[command(subcommand)]
    pub command: TaskSubcommands,
}

#[derive(Subcommand)]
pub enum TaskSubcommands {
    /// List tasks with optional kind/status filters
    List {
        /// Filter by task kind
        #[arg(short, long, value_enum)]
        kind: Option<TaskKind>,
        /// Filter by status
        #[arg(short, long, value_enum)]
        status: Option<TaskStatus>,
        /// Page number
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Page size
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Pause monitoring tasks
    Pause(ActionArgs),
    /// Resume paused tasks
    Resume(ActionArgs),
    /// Re-queue failed tasks
    Retry(ActionArgs),
    /// Cancel non-terminal tasks
    Cancel(ActionArgs),
}

#[derive(Args)]
pub struct ActionArgs {
    /// Task ids to act on
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Interactive confirmation before multi-task actions.
pub struct PromptConfirm;

impl ConfirmPolicy for PromptConfirm {
    fn confirm(&self, action: BatchAction, count: usize) -> Confirmation {
        let prompt = format!("Apply {} to {} tasks?", action, count);
        match dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
        {
            Ok(true) => Confirmation::Proceed,
            _ => Confirmation::Abort,
        }
    }
}

pub async fn handle_tasks_command(args: TaskCommands) -> Result<()> {
    match args.command {
        TaskSubcommands::List {
            kind,
            status,
            page,
            limit,
        } => list_tasks(kind, status, page, limit).await,
        TaskSubcommands::Pause(args) => run_action(BatchAction::Pause, args).await,
        TaskSubcommands::Resume(args) => run_action(BatchAction::Resume, args).await,
        TaskSubcommands::Retry(args) => run_action(BatchAction::Retry, args).await,
        TaskSubcommands::Cancel(args) => run_action(BatchAction::Cancel, args).await,
    }
}

fn make_client() -> Result<MonitorClient> {
    let config = config::global();
    Ok(MonitorClient::new(
        config.api_base_url.clone(),
        Config::token()?,
        config.platform.clone(),
    ))
}

fn status_colored(status: TaskStatus) -> ColoredString {
    match status {
        TaskStatus::Monitoring | TaskStatus::Completed => status.as_str().green(),
        TaskStatus::Failed | TaskStatus::Cancelled => status.as_str().red(),
        TaskStatus::Paused => status.as_str().yellow(),
        _ => status.as_str().cyan(),
    }
}

async fn list_tasks(
    kind: Option<TaskKind>,
    status: Option<TaskStatus>,
    page: u32,
    limit: Option<u32>,
) -> Result<()> {
    let session = crate::cli::make_session()?;
    let query = TaskListQuery {
        task_type: kind,
        status,
        page,
        limit: limit.unwrap_or(config::global().page_size),
    };

    let response = session.list_tasks(&query).await?;
    println!(
        "📋 {} task(s), page {}/{}",
        response.total.to_string().bold(),
        response.page,
        response.total_pages.max(1)
    );
    for task in &response.tasks {
        let progress = if task.status.is_active() {
            format!(" {}%", task.progress)
        } else {
            String::new()
        };
        println!(
            "{}  {:<12}{}  {}",
            task.id.cyan(),
            status_colored(task.status),
            progress.dimmed(),
            task.url
        );
        if let Some(error) = &task.error {
            println!("   {}", error.red());
        }
    }
    Ok(())
}

async fn run_action(action: BatchAction, args: ActionArgs) -> Result<()> {
    let policy: Box<dyn ConfirmPolicy> = if args.yes {
        Box::new(AutoConfirm)
    } else {
        Box::new(PromptConfirm)
    };
    if args.ids.len() > 1 && policy.confirm(action, args.ids.len()) == Confirmation::Abort {
        println!("Aborted.");
        return Ok(());
    }

    let coordinator = BatchActionCoordinator::new(Arc::new(make_client()?));
    let report = coordinator.execute(action, &args.ids).await?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &BatchReport) {
    println!(
        "{} {}: {} succeeded, {} failed",
        if report.is_clean() { "✅" } else { "⚠️ " },
        report.action,
        report.success_count().to_string().green(),
        report.failure_count().to_string().red()
    );
    for failure in &report.failures {
        println!("   {} {}", failure.task_id.cyan(), failure.error.red());
    }
}
