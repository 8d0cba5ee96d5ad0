use crate::config::Config;
use crate::editor::AllocationMode;
use crate::ui::prompts::print_success;
use anyhow::Result;
use clap::{Args, Subcommand};
use colored::*;

#[derive(Args)]
pub struct ConfigCommands {
    #[command(subcommand)]
    pub command: ConfigSubcommands,
}

#[derive(Subcommand)]
pub enum ConfigSubcommands {
    /// Show the effective configuration
    Show,
    /// Set the backend base URL
    SetUrl {
        /// Base URL, e.g. https://panels.example.com/api/
        url: String,
    },
    /// Set the default allocation mode for new panels
    SetMode {
        #[arg(value_enum)]
        mode: AllocationMode,
    },
}

pub fn config_command(config: &mut Config, cmd: ConfigCommands) -> Result<()> {
    match cmd.command {
        ConfigSubcommands::Show => {
            show_config(config);
            Ok(())
        }
        ConfigSubcommands::SetUrl { url } => {
            config.set_base_url(&url)?;
            config.save()?;
            print_success(&format!("Backend set to {}", config.base_url));
            Ok(())
        }
        ConfigSubcommands::SetMode { mode } => {
            config.allocation_mode = mode;
            config.save()?;
            print_success(&format!("Allocation mode set to {}", mode));
            Ok(())
        }
    }
}

fn show_config(config: &Config) {
    let token = match &config.api_token {
        Some(_) => "set".green(),
        None => "not set".dimmed(),
    };
    let campaign = config
        .campaign_id
        .map(|id| id.to_string().bright_green().bold())
        .unwrap_or_else(|| "none".dimmed());

    println!();
    println!("  {}", "Configuration:".bright_white().bold());
    println!("  {:<18} {}", "Backend", config.base_url.cyan());
    println!("  {:<18} {}", "API token", token);
    println!("  {:<18} {}", "Current campaign", campaign);
    println!("  {:<18} {}", "Allocation mode", config.allocation_mode);
    println!("  {:<18} {}s", "Request timeout", config.request_timeout_secs);
    println!();
}
