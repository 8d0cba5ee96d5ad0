//! Panel qualification and quota editor
//!
//! Headless state behind the panel wizard: the projected question catalog,
//! the qualification selection, the quota list and the step-one provider
//! form, driven by [`wizard::PanelWizard`].

pub mod catalog;
pub mod fields;
pub mod ids;
pub mod provider_form;
pub mod quota;
pub mod selection;
pub mod wizard;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use catalog::{Catalog, UiOption, UiQuestion};
pub use provider_form::ProviderForm;
pub use quota::{QuotaEditor, QuotaError};
pub use selection::{SelectionSnapshot, SelectionStore, SummaryItem};
pub use wizard::{EditorContext, EditorMode, FinishOutcome, PanelWizard, WizardStep};

/// How campaign completes are distributed over panels and quotas
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AllocationMode {
    #[default]
    Manual,
    /// Targets are fixed to `Auto` and assigned by the backend
    Auto,
}

impl AllocationMode {
    pub fn is_auto(&self) -> bool {
        matches!(self, AllocationMode::Auto)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationMode::Manual => "manual",
            AllocationMode::Auto => "auto",
        }
    }
}

impl fmt::Display for AllocationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
