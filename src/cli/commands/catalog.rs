use crate::api::Gateway;
use crate::editor::Catalog;
use crate::ui::with_spinner;
use anyhow::Result;
use clap::Args;
use colored::*;

#[derive(Args)]
pub struct CatalogArgs {
    /// Only show questions whose label or type contains this text
    #[arg(short, long)]
    pub search: Option<String>,
    /// Also list each question's answer options
    #[arg(short, long)]
    pub options: bool,
}

pub async fn catalog_command(gateway: &dyn Gateway, args: CatalogArgs) -> Result<()> {
    let raw = with_spinner("Loading question catalog", gateway.fetch_question_catalog()).await?;
    let catalog = Catalog::project(&raw);
    let questions = catalog.filter(args.search.as_deref().unwrap_or_default());

    if questions.is_empty() {
        println!("  {}", "No matching questions".bright_yellow().bold());
        return Ok(());
    }

    println!();
    for question in &questions {
        let options = catalog.options_for(question.id);
        println!(
            "  {} {} {} ({} options)",
            format!("#{}", question.id).dimmed(),
            question.label.bright_white().bold(),
            format!("[{}]", question.kind).cyan(),
            options.len()
        );
        if args.options {
            for option in options {
                println!("      {} {}", format!("{}", option.id).dimmed(), option.label);
            }
        }
    }
    println!();
    println!("  {} of {} questions", questions.len(), catalog.len());

    Ok(())
}
