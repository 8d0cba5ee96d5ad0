pub mod campaign;
pub mod catalog;
pub mod config;
pub mod panel;
pub mod providers;

use anyhow::Result;
use is_terminal::IsTerminal;

/// Interactive commands need a terminal on stdin
pub fn require_terminal(command: &str) -> Result<()> {
    if !std::io::stdin().is_terminal() {
        anyhow::bail!("'{}' is interactive and needs a terminal", command);
    }
    Ok(())
}
