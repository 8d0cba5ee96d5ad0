//! Campaign creation wizard and current-campaign selection

use super::require_terminal;
use crate::api::models::LookupItem;
use crate::api::Gateway;
use crate::campaign::{CampaignDraft, CampaignStep};
use crate::config::Config;
use crate::editor::fields::FormField;
use crate::editor::ids::{read_id, CampaignId};
use crate::editor::AllocationMode;
use crate::ui::prompts::{
    print_field_errors, print_heading, print_success, print_warning, prompt_confirmation,
    prompt_select, prompt_text,
};
use crate::ui::with_spinner;
use anyhow::Result;
use clap::{Args, Subcommand};
use colored::*;

#[derive(Args)]
pub struct CampaignCommands {
    #[command(subcommand)]
    pub command: CampaignSubcommands,
}

#[derive(Subcommand)]
pub enum CampaignSubcommands {
    /// Create a campaign step by step and make it current
    Create,
    /// Make an existing campaign the current one
    Use {
        /// Campaign id
        campaign_id: CampaignId,
    },
}

pub async fn campaign_command(config: &mut Config, gateway: &dyn Gateway, cmd: CampaignCommands) -> Result<()> {
    match cmd.command {
        CampaignSubcommands::Create => {
            require_terminal("campaign create")?;
            if let Some(campaign_id) = create_campaign(gateway).await? {
                config.set_campaign(campaign_id);
                config.save()?;
                print_success(&format!("Campaign {} created and set as current", campaign_id));
            }
            Ok(())
        }
        CampaignSubcommands::Use { campaign_id } => {
            config.set_campaign(campaign_id);
            config.save()?;
            print_success(&format!("Campaign {} is now current", campaign_id));
            Ok(())
        }
    }
}

/// Run the draft wizard; `None` when the user cancels
async fn create_campaign(gateway: &dyn Gateway) -> Result<Option<CampaignId>> {
    let mut draft = CampaignDraft::new();
    with_spinner("Loading languages and countries", draft.load_lookups(gateway)).await;
    if let Some(e) = draft.languages().error() {
        print_warning(&format!("Languages unavailable: {}", e));
    }
    if let Some(e) = draft.countries().error() {
        print_warning(&format!("Countries unavailable: {}", e));
    }

    loop {
        print_heading(&draft.step().to_string());
        match draft.step() {
            CampaignStep::Basics => basics_step(&mut draft)?,
            CampaignStep::Panels => panels_step(&mut draft)?,
            CampaignStep::Redirects => redirects_step(&mut draft)?,
            CampaignStep::Review => {
                print_review(&draft);
                match prompt_select("Launch", &["Create campaign", "Back", "Cancel"], 0)? {
                    0 => {
                        let errors = draft.errors();
                        if !errors.is_empty() {
                            print_field_errors(&errors);
                            continue;
                        }
                        let campaign_id = with_spinner("Creating campaign", draft.submit(gateway)).await?;
                        return Ok(Some(campaign_id));
                    }
                    1 => {
                        draft.previous();
                        continue;
                    }
                    _ => return Ok(None),
                }
            }
        }

        match prompt_select("Next", &["Continue", "Back", "Cancel"], 0)? {
            0 => {
                if !draft.next() {
                    print_field_errors(&draft.step_errors(draft.step()));
                }
            }
            1 => {
                draft.previous();
            }
            _ => {
                if prompt_confirmation("Discard this campaign draft?", false)? {
                    return Ok(None);
                }
            }
        }
    }
}

fn pick_lookup(prompt: &str, items: &[LookupItem], field: &FormField) -> Result<Option<i64>> {
    if items.is_empty() {
        print_warning(&format!("No {} available", prompt.to_lowercase()));
        return Ok(None);
    }
    let current = read_id(field.value());
    let default = current
        .and_then(|id| items.iter().position(|item| item.id == id))
        .unwrap_or(0);
    let labels: Vec<&str> = items.iter().map(|item| item.name.as_str()).collect();
    Ok(Some(items[prompt_select(prompt, &labels, default)?].id))
}

fn basics_step(draft: &mut CampaignDraft) -> Result<()> {
    let name = prompt_text("Campaign name", draft.basics().name.value())?;
    draft.basics_mut().name.set_value(name);

    let countries = draft.countries().data().cloned().unwrap_or_default();
    if let Some(id) = pick_lookup("Country", &countries, &draft.basics().country)? {
        draft.set_country(id);
    }
    let languages = draft.languages().data().cloned().unwrap_or_default();
    if let Some(id) = pick_lookup("Language", &languages, &draft.basics().language)? {
        draft.set_language(id);
    }

    let loi = prompt_text("LOI (minutes)", draft.basics().loi.value())?;
    draft.basics_mut().loi.set_value(loi);
    let ir = prompt_text("IR (%)", draft.basics().ir.value())?;
    draft.basics_mut().ir.set_value(ir);
    let total = prompt_text("Total target completes", draft.basics().total_completes.value())?;
    draft.basics_mut().total_completes.set_value(total);
    Ok(())
}

fn panels_step(draft: &mut CampaignDraft) -> Result<()> {
    let modes = [AllocationMode::Manual, AllocationMode::Auto];
    let current = if draft.allocation_mode().is_auto() { 1 } else { 0 };
    draft.set_allocation_mode(modes[prompt_select("Allocation mode", &modes, current)?]);

    for index in 0..draft.panels().len() {
        let panel = &draft.panels()[index];
        let (name, target, cpi) = (
            panel.name.clone(),
            panel.target.value().to_string(),
            panel.cpi.value().to_string(),
        );
        if !draft.allocation_mode().is_auto() {
            let target = prompt_text(&format!("{} target completes", name), &target)?;
            draft.set_panel_target(index, target);
        }
        let cpi = prompt_text(&format!("{} CPI ($)", name), &cpi)?;
        draft.set_panel_cpi(index, cpi);
    }

    print_allocation(draft);
    Ok(())
}

fn redirects_step(draft: &mut CampaignDraft) -> Result<()> {
    let redirects = draft.redirects_mut();
    let complete = prompt_text("Success URL", redirects.complete.value())?;
    redirects.complete.set_value(complete);
    let terminate = prompt_text("Termination URL", redirects.terminate.value())?;
    redirects.terminate.set_value(terminate);
    let overquota = prompt_text("Overquota URL", redirects.overquota.value())?;
    redirects.overquota.set_value(overquota);
    Ok(())
}

fn print_allocation(draft: &CampaignDraft) {
    let diff = draft.allocation_diff();
    let diff_text = match diff {
        0 => "balanced".green(),
        d if d > 0 => format!("+{} over target", d).bright_yellow(),
        d => format!("{} under target", d).bright_yellow(),
    };
    println!(
        "  Allocated {} of {} completes ({})",
        draft.allocated_total(),
        draft.target_total(),
        diff_text
    );
    if let Some(cpi) = draft.blended_cpi() {
        println!("  Blended CPI {}", format!("${:.2}", cpi).cyan());
    }
}

fn lookup_name(items: &[LookupItem], field: &FormField) -> String {
    read_id(field.value())
        .and_then(|id| items.iter().find(|item| item.id == id))
        .map(|item| item.name.clone())
        .unwrap_or_else(|| "-".to_string())
}

fn print_review(draft: &CampaignDraft) {
    let basics = draft.basics();
    let countries = draft.countries().data().map(Vec::as_slice).unwrap_or(&[]);
    let languages = draft.languages().data().map(Vec::as_slice).unwrap_or(&[]);

    println!("  {:<18} {}", "Name", basics.name.value().bright_white().bold());
    println!("  {:<18} {}", "Country", lookup_name(countries, &basics.country));
    println!("  {:<18} {}", "Language", lookup_name(languages, &basics.language));
    println!("  {:<18} {} min", "LOI", basics.loi.value());
    println!("  {:<18} {}%", "IR", basics.ir.value());
    println!("  {:<18} {}", "Allocation mode", draft.allocation_mode());
    for panel in draft.panels() {
        println!(
            "  {:<18} {} completes at ${}",
            panel.name,
            panel.target.value(),
            panel.cpi.value()
        );
    }
    print_allocation(draft);
    let redirects = draft.redirects();
    println!("  {:<18} {}", "Success URL", redirects.complete.value().cyan());
    println!("  {:<18} {}", "Termination URL", redirects.terminate.value().cyan());
    println!("  {:<18} {}", "Overquota URL", redirects.overquota.value().cyan());
    println!();
}
