use anyhow::Result;
use clap::Parser;
use log::info;
use std::sync::Arc;

use panel_console::api::{ApiClient, Gateway};
use panel_console::cli::commands::{campaign, catalog, config as config_cmd, panel, providers};
use panel_console::cli::{Cli, Commands};
use panel_console::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Log to a file (truncated on each run) so prompts keep the terminal
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("panel-console.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    info!("Starting panel-console against {}", config.base_url);

    match cli.command {
        Commands::Catalog(args) => catalog::catalog_command(connect(&config)?.as_ref(), args).await,
        Commands::Providers => providers::providers_command(connect(&config)?.as_ref()).await,
        Commands::Panel(cmd) => panel::panel_command(&config, connect(&config)?, cmd).await,
        Commands::Campaign(cmd) => {
            let gateway = connect(&config)?;
            campaign::campaign_command(&mut config, gateway.as_ref(), cmd).await
        }
        Commands::Config(cmd) => config_cmd::config_command(&mut config, cmd),
    }
}

fn connect(config: &Config) -> Result<Arc<dyn Gateway>> {
    Ok(Arc::new(ApiClient::from_config(config)?))
}
