//! History browsing command handlers

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::*;

use crate::api::models::{ResourceFamily, TaskStatus};
use crate::config;
use crate::history::HistoryQuery;

#[derive(Args)]
pub struct HistoryCommands {
    #[command(subcommand)]
    pub command: HistorySubcommands,
}

#[derive(Subcommand)]
pub enum HistorySubcommands {
    /// Browse collected post history
    Posts(HistoryArgs),
    /// Browse collected influencer history
    Influencers(HistoryArgs),
}

#[derive(Args)]
pub struct HistoryArgs {
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

    /// Bypass the cached page for this query
    #[arg(short, long)]
    pub refresh: bool,
}

impl HistoryArgs {
    fn to_query(&self) -> HistoryQuery {
        HistoryQuery {
            page: self.page,
            limit: self.limit.unwrap_or(config::global().page_size),
            id_filter: self.id.clone(),
            author_filter: self.author.clone(),
            status_filter: self.status,
        }
    }
}

/// Render a raw count the way the dashboard does ("2.3万"), for display
/// only. The data model always carries the raw number.
pub fn format_magnitude(count: u64) -> String {
    if count >= 100_000_000 {
        format!("{:.1}亿", count as f64 / 100_000_000.0)
    } else if count >= 10_000 {
        format!("{:.1}万", count as f64 / 10_000.0)
    } else {
        count.to_string()
    }
}

pub async fn handle_history_command(args: HistoryCommands) -> Result<()> {
    let (family, args) = match args.command {
        HistorySubcommands::Posts(args) => (ResourceFamily::Posts, args),
        HistorySubcommands::Influencers(args) => (ResourceFamily::Influencers, args),
    };

    let mut session = super::super::make_session()?;
    let query = args.to_query();
    let page = session.load_history(family, &query, !args.refresh).await?;

    println!(
        "🗂  {} {} record(s), page {}/{}",
        page.total.to_string().bold(),
        family,
        page.page,
        page.total_pages.max(1)
    );

    for record in &page.items {
        match family {
            ResourceFamily::Posts => {
                let content = record.extracted_content().unwrap_or_default();
                let title = if content.title.is_empty() {
                    record.url.as_str()
                } else {
                    content.title.as_str()
                };
                let author = content
                    .author
                    .map(|a| a.name)
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}  {:<10}  {}  by {}  👍{} 💬{}",
                    record.id.cyan(),
                    record.status.as_str(),
                    title,
                    author.bright_green(),
                    format_magnitude(content.like_count),
                    format_magnitude(content.comment_count)
                );
            }
            ResourceFamily::Influencers => {
                let snapshot = record.influencer_snapshot().unwrap_or_default();
                println!(
                    "{}  {:<10}  {}  followers {}  posts {}",
                    record.id.cyan(),
                    record.status.as_str(),
                    snapshot.name.bright_green(),
                    format_magnitude(snapshot.follower_count).bold(),
                    format_magnitude(snapshot.post_count)
                );
            }
        }
    }
    Ok(())
}
