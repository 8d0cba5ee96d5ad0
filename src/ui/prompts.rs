use crate::editor::fields::FieldError;
use anyhow::Result;
use colored::*;
use dialoguer::{Confirm, Input, MultiSelect, Select};

/// Yes/No selection navigable with the arrow keys
pub fn prompt_confirmation(prompt: &str, default_yes: bool) -> Result<bool> {
    let items = ["Yes", "No"];
    let default_index = if default_yes { 0 } else { 1 };

    let selection = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(default_index)
        .interact()?;

    Ok(selection == 0)
}

pub fn prompt_delete_confirmation(panel_id: i64) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(format!("Delete panel {}? This cannot be undone", panel_id))
        .default(false)
        .interact()?)
}

/// Free-text input prefilled with the current value; empty input is allowed
pub fn prompt_text(prompt: &str, current: &str) -> Result<String> {
    let value = Input::<String>::new()
        .with_prompt(prompt)
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()?;
    Ok(value)
}

/// Pick one entry; returns its index
pub fn prompt_select<T: ToString>(prompt: &str, items: &[T], default: usize) -> Result<usize> {
    Ok(Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(default.min(items.len().saturating_sub(1)))
        .interact()?)
}

/// Toggle several entries at once; returns the indices left checked
pub fn prompt_multi_select<T: ToString>(prompt: &str, items: &[T], checked: &[bool]) -> Result<Vec<usize>> {
    Ok(MultiSelect::new()
        .with_prompt(prompt)
        .items(items)
        .defaults(checked)
        .interact()?)
}

pub fn print_field_errors(errors: &[FieldError]) {
    for error in errors {
        println!("  {} {}", "✗".bright_red().bold(), error.message.red());
    }
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".bright_green().bold(), message.bright_green().bold());
}

pub fn print_warning(message: &str) {
    println!("  {}", format!("⚠️  {}", message).bright_yellow().bold());
}

pub fn print_heading(title: &str) {
    println!();
    println!("{}", title.bright_white().bold());
    println!("{}", "=".repeat(title.chars().count()));
}
