use crate::api::Gateway;
use crate::ui::with_spinner;
use anyhow::Result;
use colored::*;

pub async fn providers_command(gateway: &dyn Gateway) -> Result<()> {
    let providers = with_spinner("Loading panel providers", gateway.fetch_providers()).await?;

    if providers.is_empty() {
        println!("  {}", "⚠️  No panel providers available".bright_yellow().bold());
        return Ok(());
    }

    println!();
    println!("  {}", "Panel providers:".bright_white().bold());
    for provider in &providers {
        println!("  {} {}", format!("{:>5}", provider.id).dimmed(), provider.name.cyan());
    }
    println!();

    Ok(())
}
