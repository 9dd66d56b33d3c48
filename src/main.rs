use anyhow::Result;
use clap::Parser;
use log::info;

use watchdesk::cli::commands::{
    handle_export_command, handle_history_command, handle_submit_command, handle_tasks_command,
};
use watchdesk::cli::{Cli, Commands};
use watchdesk::config::{self, Config};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env().init();

    let cfg = Config::load()?;
    config::init(cfg)?;

    let cli = Cli::parse();
    info!("Starting watchdesk");

    match cli.command {
        Commands::Submit(args) => handle_submit_command(args).await,
        Commands::Tasks(args) => handle_tasks_command(args).await,
        Commands::History(args) => handle_history_command(args).await,
        Commands::Export(args) => handle_export_command(args).await,
    }
}
