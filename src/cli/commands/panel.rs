//! Panel commands and the interactive panel wizard

use super::require_terminal;
use crate::api::models::Provider;
use crate::api::Gateway;
use crate::config::Config;
use crate::editor::ids::{read_id, CampaignId, PanelId, QuestionId};
use crate::editor::quota::ConditionForm;
use crate::editor::{
    AllocationMode, Catalog, EditorContext, EditorMode, FinishOutcome, PanelWizard, QuotaEditor,
    SelectionStore, SummaryItem, UiOption, WizardStep,
};
use crate::ui::prompts::{
    print_field_errors, print_heading, print_success, print_warning, prompt_delete_confirmation,
    prompt_multi_select, prompt_select, prompt_text,
};
use crate::ui::with_spinner;
use anyhow::Result;
use clap::{Args, Subcommand};
use colored::*;
use log::warn;
use std::fmt;
use std::sync::Arc;

#[derive(Args)]
pub struct PanelCommands {
    #[command(subcommand)]
    pub command: PanelSubcommands,
}

/// Where the wizard works and how completes are allocated
#[derive(Args, Debug, Clone)]
pub struct PanelTarget {
    /// Campaign id (defaults to the current campaign)
    #[arg(short, long)]
    pub campaign: Option<CampaignId>,
    /// Allocation mode (defaults to the configured mode)
    #[arg(short, long, value_enum)]
    pub mode: Option<AllocationMode>,
}

#[derive(Subcommand)]
pub enum PanelSubcommands {
    /// Add a panel with qualifications and quotas
    Add {
        #[command(flatten)]
        target: PanelTarget,
    },
    /// Edit a saved panel
    Edit {
        /// Panel id
        panel_id: PanelId,
        #[command(flatten)]
        target: PanelTarget,
    },
    /// Show a saved panel
    Show {
        /// Panel id
        panel_id: PanelId,
        /// Campaign id (defaults to the current campaign)
        #[arg(short, long)]
        campaign: Option<CampaignId>,
    },
    /// Delete a saved panel
    Delete {
        /// Panel id
        panel_id: PanelId,
        /// Campaign id (defaults to the current campaign)
        #[arg(short, long)]
        campaign: Option<CampaignId>,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

pub async fn panel_command(config: &Config, gateway: Arc<dyn Gateway>, cmd: PanelCommands) -> Result<()> {
    match cmd.command {
        PanelSubcommands::Add { target } => {
            require_terminal("panel add")?;
            run_wizard(gateway, editor_context(config, &target, None)?).await
        }
        PanelSubcommands::Edit { panel_id, target } => {
            require_terminal("panel edit")?;
            run_wizard(gateway, editor_context(config, &target, Some(panel_id))?).await
        }
        PanelSubcommands::Show { panel_id, campaign } => {
            let campaign_id = config.resolve_campaign(campaign)?;
            show_panel(gateway.as_ref(), campaign_id, panel_id).await
        }
        PanelSubcommands::Delete { panel_id, campaign, force } => {
            let campaign_id = config.resolve_campaign(campaign)?;
            delete_panel(gateway.as_ref(), campaign_id, panel_id, force).await
        }
    }
}

fn editor_context(config: &Config, target: &PanelTarget, panel_id: Option<PanelId>) -> Result<EditorContext> {
    let campaign_id = config.resolve_campaign(target.campaign)?;
    let mode = target.mode.unwrap_or(config.allocation_mode);
    Ok(match panel_id {
        Some(panel_id) => EditorContext::edit(campaign_id, panel_id, mode),
        None => EditorContext::create(campaign_id, mode),
    })
}

enum StepAction {
    Stay,
    Next,
    Back,
    Cancel,
    Finish { skip: bool },
}

async fn run_wizard(gateway: Arc<dyn Gateway>, context: EditorContext) -> Result<()> {
    let mut wizard = with_spinner("Loading catalog and providers", PanelWizard::open(gateway, context)).await?;

    if let Some(e) = wizard.catalog().error() {
        print_warning(&format!("Question catalog unavailable: {}", e));
    }
    if let Some(e) = wizard.providers().error() {
        print_warning(&format!("Panel providers unavailable: {}", e));
    }

    loop {
        print_heading(&wizard.step().to_string());
        let action = match wizard.step() {
            WizardStep::Provider => provider_step(&mut wizard)?,
            WizardStep::Qualifications => qualification_step(&mut wizard)?,
            WizardStep::Quotas => quota_step(&mut wizard)?,
        };

        match action {
            StepAction::Stay => {}
            StepAction::Next => {
                if !wizard.next() {
                    print_field_errors(&wizard.provider_form().errors());
                }
            }
            StepAction::Back => {
                wizard.back();
            }
            StepAction::Cancel => {
                wizard.cancel();
                println!("  {}", "Panel editing cancelled".dimmed());
                return Ok(());
            }
            StepAction::Finish { skip } => {
                let outcome = with_spinner("Saving panel", wizard.finish(skip)).await;
                match outcome {
                    FinishOutcome::Submitted(_) => {
                        print_success("Panel saved");
                        return Ok(());
                    }
                    FinishOutcome::Blocked => {
                        print_warning("Panel not submitted, fix these first:");
                        print_field_errors(&wizard.provider_form().errors());
                        print_quota_errors(&wizard);
                    }
                    FinishOutcome::Failed(message) => {
                        anyhow::bail!("Panel was not saved: {}", message);
                    }
                }
            }
        }
    }
}

fn provider_step(wizard: &mut PanelWizard) -> Result<StepAction> {
    let providers: Vec<Provider> = wizard.providers().data().cloned().unwrap_or_default();
    if providers.is_empty() {
        print_warning("No panel providers loaded");
    } else {
        let current = read_id(wizard.provider_form().provider().value());
        let default = current
            .and_then(|id| providers.iter().position(|p| p.id == id))
            .unwrap_or(0);
        let labels: Vec<String> = providers.iter().map(|p| format!("{} (#{})", p.name, p.id)).collect();
        let index = prompt_select("Panel provider", &labels, default)?;
        wizard.provider_form_mut().set_provider(providers[index].id);
    }

    if wizard.provider_form().mode().is_auto() {
        println!("  Max completes: {}", "Auto".cyan());
    } else {
        let value = prompt_text("Max completes", wizard.provider_form().max_completes().value())?;
        wizard.provider_form_mut().set_max_completes(value);
    }
    let cpi = prompt_text("CPI", wizard.provider_form().cpi().value())?;
    wizard.provider_form_mut().set_cpi(cpi);
    let entry_url = prompt_text("Entry URL", wizard.provider_form().entry_url().value())?;
    wizard.provider_form_mut().set_entry_url(entry_url);

    let choice = prompt_select("Next", &["Continue to qualifications", "Edit again", "Cancel"], 0)?;
    Ok(match choice {
        0 => StepAction::Next,
        1 => StepAction::Stay,
        _ => StepAction::Cancel,
    })
}

const QUALIFICATION_MENU: &[&str] = &[
    "Add or remove questions",
    "Search questions",
    "Choose answer options",
    "Show selected qualifications",
    "Continue to quotas",
    "Back",
    "Cancel",
];

fn qualification_step(wizard: &mut PanelWizard) -> Result<StepAction> {
    loop {
        match prompt_select("Qualifications", QUALIFICATION_MENU, 0)? {
            0 => pick_questions(wizard)?,
            1 => {
                let term = prompt_text("Search", wizard.search())?;
                wizard.set_search(term);
                println!("  {} questions match", wizard.filtered_questions().len());
            }
            2 => pick_options(wizard)?,
            3 => print_summary(&wizard.selected_summary()),
            4 => return Ok(StepAction::Next),
            5 => return Ok(StepAction::Back),
            _ => return Ok(StepAction::Cancel),
        }
    }
}

fn pick_questions(wizard: &mut PanelWizard) -> Result<()> {
    let questions: Vec<(i64, String)> = wizard
        .filtered_questions()
        .iter()
        .map(|q| (q.id, format!("{} [{}]", q.label, q.kind)))
        .collect();
    if questions.is_empty() {
        print_warning("No questions match the current search");
        return Ok(());
    }

    let labels: Vec<&str> = questions.iter().map(|(_, label)| label.as_str()).collect();
    let checked: Vec<bool> = questions
        .iter()
        .map(|(id, _)| wizard.selection().is_question_added(*id))
        .collect();
    let chosen = prompt_multi_select("Qualification questions (space toggles)", &labels, &checked)?;

    for (index, (question_id, _)) in questions.iter().enumerate() {
        if chosen.contains(&index) != checked[index] {
            wizard.toggle_add_question(*question_id);
        }
    }
    Ok(())
}

/// Catalog options of a question, each with its current selection state
fn answer_choices(
    catalog: &Catalog,
    selection: &SelectionStore,
    question_id: QuestionId,
) -> Vec<(UiOption, bool)> {
    catalog
        .options_for(question_id)
        .iter()
        .map(|o| (o.clone(), selection.is_option_selected(question_id, o.id)))
        .collect()
}

fn pick_options(wizard: &mut PanelWizard) -> Result<()> {
    let Some(catalog) = wizard.catalog().data() else {
        print_warning("Question catalog is not loaded");
        return Ok(());
    };
    let added: Vec<(i64, String)> = wizard
        .selection()
        .snapshot()
        .added()
        .filter_map(|id| catalog.question(id).map(|q| (id, q.label.clone())))
        .collect();
    if added.is_empty() {
        print_warning("Add a question first");
        return Ok(());
    }

    let labels: Vec<&str> = added.iter().map(|(_, label)| label.as_str()).collect();
    let question_id = added[prompt_select("Question", &labels, 0)?].0;
    let (options, checked): (Vec<UiOption>, Vec<bool>) =
        answer_choices(catalog, wizard.selection(), question_id).into_iter().unzip();
    if options.is_empty() {
        print_warning("This question has no answers to choose from");
        return Ok(());
    }

    let option_labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
    let chosen = prompt_multi_select("Qualifying answers (space toggles)", &option_labels, &checked)?;

    for (index, option) in options.iter().enumerate() {
        if chosen.contains(&index) != checked[index] {
            wizard.toggle_option(question_id, option.id);
        }
    }
    if chosen.is_empty() {
        print_warning("No answers selected, this question is left out of the qualifications");
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum QuotaAction {
    Add,
    Edit,
    Remove,
    Review,
    Submit,
    SubmitPanelOnly,
    Back,
    Cancel,
}

impl fmt::Display for QuotaAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QuotaAction::Add => "Add quota",
            QuotaAction::Edit => "Edit quota",
            QuotaAction::Remove => "Remove quota",
            QuotaAction::Review => "Review panel",
            QuotaAction::Submit => "Submit",
            QuotaAction::SubmitPanelOnly => "Submit panel only (skip qualifications and quotas)",
            QuotaAction::Back => "Back",
            QuotaAction::Cancel => "Cancel",
        })
    }
}

fn quota_step(wizard: &mut PanelWizard) -> Result<StepAction> {
    let mut actions = vec![
        QuotaAction::Add,
        QuotaAction::Edit,
        QuotaAction::Remove,
        QuotaAction::Review,
        QuotaAction::Submit,
    ];
    if wizard.context().mode == EditorMode::Create {
        actions.push(QuotaAction::SubmitPanelOnly);
    }
    actions.extend([QuotaAction::Back, QuotaAction::Cancel]);

    loop {
        match actions[prompt_select("Quotas", &actions, 0)?] {
            QuotaAction::Add => {
                let index = wizard.quotas_mut().add_quota();
                edit_quota(wizard, index)?;
            }
            QuotaAction::Edit => {
                if let Some(index) = pick_quota(wizard)? {
                    edit_quota(wizard, index)?;
                }
            }
            QuotaAction::Remove => {
                if let Some(index) = pick_quota(wizard)? {
                    wizard.quotas_mut().remove_quota(index);
                }
            }
            QuotaAction::Review => print_review(wizard),
            QuotaAction::Submit => return Ok(StepAction::Finish { skip: false }),
            QuotaAction::SubmitPanelOnly => return Ok(StepAction::Finish { skip: true }),
            QuotaAction::Back => return Ok(StepAction::Back),
            QuotaAction::Cancel => return Ok(StepAction::Cancel),
        }
    }
}

fn pick_quota(wizard: &PanelWizard) -> Result<Option<usize>> {
    let quotas = wizard.quotas().quotas();
    if quotas.is_empty() {
        print_warning("No quotas yet");
        return Ok(None);
    }
    let labels: Vec<String> = quotas
        .iter()
        .enumerate()
        .map(|(i, q)| format!("{}. {} ({})", i + 1, q.name().value(), q.target().value()))
        .collect();
    Ok(Some(prompt_select("Quota", &labels, 0)?))
}

fn edit_quota(wizard: &mut PanelWizard, index: usize) -> Result<()> {
    let Some(quota) = wizard.quotas().quotas().get(index) else {
        return Ok(());
    };
    let (name, target) = (quota.name().value().to_string(), quota.target().value().to_string());

    let name = prompt_text("Quota name", &name)?;
    wizard.quotas_mut().set_name(index, name);
    if !wizard.quotas().mode().is_auto() {
        let target = prompt_text("Quota target", &target)?;
        wizard.quotas_mut().set_target(index, target);
    }

    loop {
        let summary = wizard.selected_summary();
        let conditions: Vec<String> = wizard.quotas().quotas()[index]
            .conditions()
            .iter()
            .map(|c| condition_label(c, &summary))
            .collect();
        for condition in &conditions {
            println!("    {} {}", "•".cyan(), condition);
        }

        match prompt_select("Conditions", &["Add condition", "Remove condition", "Done"], 0)? {
            0 => add_condition(wizard, index, &summary)?,
            1 if conditions.is_empty() => print_warning("No conditions yet"),
            1 => {
                let condition = prompt_select("Remove which condition", &conditions, 0)?;
                wizard.quotas_mut().remove_condition(index, condition);
            }
            _ => return Ok(()),
        }
    }
}

fn add_condition(wizard: &mut PanelWizard, quota: usize, summary: &[SummaryItem]) -> Result<()> {
    let choices = QuotaEditor::available_questions(summary);
    if choices.is_empty() {
        print_warning("Select qualifications before adding conditions");
        return Ok(());
    }

    let labels: Vec<&str> = choices.iter().map(|c| c.label.as_str()).collect();
    let choice = &choices[prompt_select("Question", &labels, 0)?];
    let Some(question_id) = read_id(&choice.value) else {
        return Ok(());
    };
    let Some(condition) = wizard.quotas_mut().add_condition(quota) else {
        return Ok(());
    };
    wizard.quotas_mut().set_condition_question(quota, condition, question_id);

    let options = wizard.quotas().options_for_condition(quota, condition, summary);
    let option_labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
    let option = &options[prompt_select("Answer", &option_labels, 0)?];
    wizard.quotas_mut().set_condition_answer(quota, condition, option.id);
    Ok(())
}

fn condition_label(condition: &ConditionForm, summary: &[SummaryItem]) -> String {
    let question = condition
        .question_id()
        .and_then(|id| summary.iter().find(|item| item.question_id == id));
    let Some(question) = question else {
        return "(question no longer selected)".red().to_string();
    };
    let answer = condition
        .answer_id()
        .and_then(|id| question.options.iter().find(|o| o.id == id))
        .map(|o| o.label.clone())
        .unwrap_or_else(|| "?".to_string());
    format!("{} = {}", question.question_title, answer)
}

fn print_summary(summary: &[SummaryItem]) {
    if summary.is_empty() {
        println!("  {}", "No qualifications selected".dimmed());
        return;
    }
    for item in summary {
        println!("  {} {}", item.question_title.bright_white().bold(), item.option_labels().cyan());
    }
}

fn print_quota_errors(wizard: &PanelWizard) {
    let summary = wizard.selected_summary();
    for error in wizard.quotas().errors(&summary) {
        let location = match error.condition {
            Some(condition) => format!("Quota {}, condition {}", error.quota + 1, condition + 1),
            None => format!("Quota {}", error.quota + 1),
        };
        println!("  {} {}: {}", "✗".bright_red().bold(), location, error.error.message.red());
    }
}

fn print_review(wizard: &PanelWizard) {
    let attrs = wizard.provider_form().attributes();
    let provider = wizard
        .providers()
        .data()
        .and_then(|providers| providers.iter().find(|p| Some(p.id) == attrs.panel_provider_id))
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "-".to_string());
    let dash = || "-".to_string();

    println!();
    println!("  {:<16} {}", "Provider", provider.cyan());
    println!(
        "  {:<16} {}",
        "Max completes",
        attrs.target_completes.map(|t| t.to_string()).unwrap_or_else(dash)
    );
    println!("  {:<16} {}", "CPI", attrs.cpi.map(|c| format!("{:.2}", c)).unwrap_or_else(dash));
    println!("  {:<16} {}", "Entry URL", attrs.entry_url);

    let summary = wizard.selected_summary();
    println!();
    println!("  {}", "Qualifications".bright_white().bold());
    print_summary(&summary);

    println!();
    println!("  {}", "Quotas".bright_white().bold());
    for quota in wizard.quotas().quotas() {
        println!("  {} (target {})", quota.name().value().bright_white(), quota.target().value());
        for condition in quota.conditions() {
            println!("    {} {}", "•".cyan(), condition_label(condition, &summary));
        }
    }
    print_quota_errors(wizard);
    println!();
}

async fn show_panel(gateway: &dyn Gateway, campaign_id: CampaignId, panel_id: PanelId) -> Result<()> {
    let (panel, catalog) = with_spinner("Loading panel", async {
        futures::join!(gateway.fetch_panel(campaign_id, panel_id), gateway.fetch_question_catalog())
    })
    .await;
    let panel = panel?;
    let catalog = catalog.map(|raw| Catalog::project(&raw)).unwrap_or_else(|e| {
        warn!("Showing panel without question labels: {:#}", e);
        Catalog::default()
    });

    let dash = || "-".to_string();
    println!();
    println!("  {}", format!("Panel {} of campaign {}", panel_id, campaign_id).bright_white().bold());
    println!(
        "  {:<16} {}",
        "Provider",
        panel.panel_provider_id.map(|id| id.to_string()).unwrap_or_else(dash)
    );
    println!(
        "  {:<16} {}",
        "Max completes",
        panel.target_completes.map(|t| t.to_string()).unwrap_or_else(dash)
    );
    println!("  {:<16} {}", "CPI", panel.cpi.map(|c| format!("{:.2}", c)).unwrap_or_else(dash));
    println!("  {:<16} {}", "Entry URL", panel.entry_url.as_deref().unwrap_or("-"));

    println!();
    println!("  {}", "Qualifications".bright_white().bold());
    for qualification in &panel.qualifications {
        let title = catalog
            .question(qualification.qs_id)
            .map(|q| q.label.clone())
            .unwrap_or_else(|| format!("#{}", qualification.qs_id));
        let options: Vec<String> = qualification
            .option_ids
            .iter()
            .map(|id| {
                catalog
                    .options_for(qualification.qs_id)
                    .iter()
                    .find(|o| o.id == *id)
                    .map(|o| o.label.clone())
                    .unwrap_or_else(|| format!("#{}", id))
            })
            .collect();
        println!("  {} {}", title.bright_white(), options.join(", ").cyan());
    }

    println!();
    println!("  {}", "Quotas".bright_white().bold());
    for quota in &panel.quotas {
        let target = quota.target.map(|t| t.to_string()).unwrap_or_else(dash);
        println!("  {} (target {})", quota.quota_name.bright_white(), target);
        for condition in &quota.conditions {
            println!(
                "    {} question {} = option {}",
                "•".cyan(),
                condition.qs_id.map(|id| id.to_string()).unwrap_or_else(dash),
                condition.opt_id.map(|id| id.to_string()).unwrap_or_else(dash)
            );
        }
    }
    println!();
    Ok(())
}

async fn delete_panel(gateway: &dyn Gateway, campaign_id: CampaignId, panel_id: PanelId, force: bool) -> Result<()> {
    if !force {
        require_terminal("panel delete")?;
        if !prompt_delete_confirmation(panel_id)? {
            println!("  {}", "Deletion cancelled".dimmed());
            return Ok(());
        }
    }

    with_spinner("Deleting panel", gateway.delete_panel(campaign_id, panel_id)).await?;
    print_success(&format!("Panel {} deleted", panel_id));
    Ok(())
}
