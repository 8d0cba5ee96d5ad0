use super::commands::campaign::CampaignCommands;
use super::commands::catalog::CatalogArgs;
use super::commands::config::ConfigCommands;
use super::commands::panel::PanelCommands;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "panel-console")]
#[command(about = "Configure the respondent panels of market-research campaigns")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Browse the qualification question catalog
    Catalog(CatalogArgs),
    /// List available panel providers
    Providers,
    /// Add, edit, inspect or delete campaign panels
    Panel(PanelCommands),
    /// Create campaigns and pick the current one
    Campaign(CampaignCommands),
    /// Show or change the console configuration
    Config(ConfigCommands),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::panel::PanelSubcommands;
    use crate::editor::AllocationMode;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_panel_edit() {
        let cli = Cli::try_parse_from([
            "panel-console",
            "panel",
            "edit",
            "12",
            "--campaign",
            "7",
            "--mode",
            "auto",
        ])
        .unwrap();

        match cli.command {
            Commands::Panel(PanelCommands {
                command: PanelSubcommands::Edit { panel_id, target },
            }) => {
                assert_eq!(panel_id, 12);
                assert_eq!(target.campaign, Some(7));
                assert_eq!(target.mode, Some(AllocationMode::Auto));
            }
            _ => panic!("expected panel edit"),
        }
    }

    #[test]
    fn test_parse_catalog_search() {
        let cli = Cli::try_parse_from(["panel-console", "catalog", "--search", "age"]).unwrap();
        match cli.command {
            Commands::Catalog(args) => assert_eq!(args.search.as_deref(), Some("age")),
            _ => panic!("expected catalog"),
        }
    }
}
