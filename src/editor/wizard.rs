//! Three-step panel wizard: provider, qualifications, quotas and review

use super::catalog::{Catalog, UiQuestion};
use super::ids::{CampaignId, OptionId, PanelId, QuestionId};
use super::provider_form::ProviderForm;
use super::quota::QuotaEditor;
use super::selection::{SelectionStore, SummaryItem};
use super::AllocationMode;
use crate::api::models::{PanelSubmission, Provider, SavedPanel};
use crate::api::Gateway;
use crate::resource::Resource;
use anyhow::Context;
use log::{debug, error, info, warn};
use once_cell::sync::Lazy;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

static EMPTY_CATALOG: Lazy<Catalog> = Lazy::new(Catalog::default);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    Provider,
    Qualifications,
    Quotas,
}

impl WizardStep {
    /// One-based position shown to the user
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::Provider => 1,
            WizardStep::Qualifications => 2,
            WizardStep::Quotas => 3,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Provider => "Panel provider",
            WizardStep::Qualifications => "Qualifications",
            WizardStep::Quotas => "Quotas & review",
        }
    }

    fn following(&self) -> Option<Self> {
        match self {
            WizardStep::Provider => Some(WizardStep::Qualifications),
            WizardStep::Qualifications => Some(WizardStep::Quotas),
            WizardStep::Quotas => None,
        }
    }

    fn preceding(&self) -> Option<Self> {
        match self {
            WizardStep::Provider => None,
            WizardStep::Qualifications => Some(WizardStep::Provider),
            WizardStep::Quotas => Some(WizardStep::Qualifications),
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {} of 3: {}", self.number(), self.title())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit { panel_id: PanelId },
}

/// Everything the editor needs to know about where it is working
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorContext {
    pub campaign_id: CampaignId,
    pub allocation_mode: AllocationMode,
    pub mode: EditorMode,
}

impl EditorContext {
    pub fn create(campaign_id: CampaignId, allocation_mode: AllocationMode) -> Self {
        Self {
            campaign_id,
            allocation_mode,
            mode: EditorMode::Create,
        }
    }

    pub fn edit(campaign_id: CampaignId, panel_id: PanelId, allocation_mode: AllocationMode) -> Self {
        Self {
            campaign_id,
            allocation_mode,
            mode: EditorMode::Edit { panel_id },
        }
    }
}

/// Result of [`PanelWizard::finish`]
#[derive(Debug, Clone, PartialEq)]
pub enum FinishOutcome {
    /// Backend accepted the panel; carries its response body
    Submitted(Value),
    /// Local validation stopped the submission, nothing was sent
    Blocked,
    /// The request failed. The editor has been reset regardless.
    Failed(String),
}

pub struct PanelWizard {
    gateway: Arc<dyn Gateway>,
    context: EditorContext,
    catalog: Resource<Catalog>,
    providers: Resource<Vec<Provider>>,
    selection: SelectionStore,
    provider_form: ProviderForm,
    quotas: QuotaEditor,
    step: WizardStep,
    search: String,
    busy: bool,
}

impl PanelWizard {
    /// Editor with nothing loaded yet
    pub fn new(gateway: Arc<dyn Gateway>, context: EditorContext) -> Self {
        Self {
            gateway,
            context,
            catalog: Resource::NotAsked,
            providers: Resource::NotAsked,
            selection: SelectionStore::new(),
            provider_form: ProviderForm::new(context.allocation_mode),
            quotas: QuotaEditor::new(context.allocation_mode),
            step: WizardStep::Provider,
            search: String::new(),
            busy: false,
        }
    }

    /// Build the editor and load everything it needs.
    ///
    /// Fails only when the saved panel of an edit session cannot be loaded.
    pub async fn open(gateway: Arc<dyn Gateway>, context: EditorContext) -> anyhow::Result<Self> {
        let mut wizard = Self::new(gateway, context);
        wizard.load().await?;
        Ok(wizard)
    }

    /// Fetch catalog and providers concurrently, then the saved panel when editing.
    ///
    /// List failures are recorded on the corresponding resource and leave the
    /// list empty.
    pub async fn load(&mut self) -> anyhow::Result<()> {
        self.begin_load();

        let gateway = Arc::clone(&self.gateway);
        let (catalog, providers) = futures::join!(gateway.fetch_question_catalog(), gateway.fetch_providers());
        self.busy = false;

        if let Err(e) = &catalog {
            error!("Failed to load question catalog: {:#}", e);
        }
        if let Err(e) = &providers {
            error!("Failed to load panel providers: {:#}", e);
        }
        self.catalog = Resource::from_anyhow(catalog.map(|raw| Catalog::project(&raw)));
        self.providers = Resource::from_anyhow(providers);
        debug!(
            "Editor lists loaded: {} questions, {} providers",
            self.catalog.data().map_or(0, Catalog::len),
            self.providers.data().map_or(0, Vec::len)
        );

        if let EditorMode::Edit { panel_id } = self.context.mode {
            self.busy = true;
            let saved = gateway.fetch_panel(self.context.campaign_id, panel_id).await;
            self.busy = false;
            let saved = saved.with_context(|| format!("Failed to load panel {}", panel_id))?;
            self.apply_saved(&saved);
        }
        Ok(())
    }

    fn begin_load(&mut self) {
        self.busy = true;
        self.catalog = Resource::Loading;
        self.providers = Resource::Loading;
    }

    fn apply_saved(&mut self, panel: &SavedPanel) {
        info!(
            "Restoring saved panel: {} qualifications, {} quotas",
            panel.qualifications.len(),
            panel.quotas.len()
        );
        self.provider_form.patch_from_saved(panel);
        self.selection.restore(&panel.qualifications);
        self.quotas.restore(&panel.quotas);
    }

    pub fn context(&self) -> &EditorContext {
        &self.context
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn catalog(&self) -> &Resource<Catalog> {
        &self.catalog
    }

    pub fn providers(&self) -> &Resource<Vec<Provider>> {
        &self.providers
    }

    fn catalog_or_empty(&self) -> &Catalog {
        self.catalog.data().unwrap_or(&EMPTY_CATALOG)
    }

    pub fn selection(&self) -> &SelectionStore {
        &self.selection
    }

    pub fn provider_form(&self) -> &ProviderForm {
        &self.provider_form
    }

    pub fn provider_form_mut(&mut self) -> &mut ProviderForm {
        &mut self.provider_form
    }

    pub fn quotas(&self) -> &QuotaEditor {
        &self.quotas
    }

    pub fn quotas_mut(&mut self) -> &mut QuotaEditor {
        &mut self.quotas
    }

    /// Advance one step. Returns whether the step changed.
    pub fn next(&mut self) -> bool {
        match self.step {
            WizardStep::Provider if !self.provider_form.is_valid() => {
                self.provider_form.mark_all_touched();
                warn!("Provider step incomplete, staying on step 1");
                return false;
            }
            WizardStep::Qualifications => self.search.clear(),
            _ => {}
        }

        match self.step.following() {
            Some(step) => {
                debug!("Wizard step {} -> {}", self.step.number(), step.number());
                self.step = step;
                true
            }
            None => false,
        }
    }

    /// Go back one step; always allowed past the first
    pub fn back(&mut self) -> bool {
        match self.step.preceding() {
            Some(step) => {
                self.step = step;
                true
            }
            None => false,
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Catalog questions matching the current search term
    pub fn filtered_questions(&self) -> Vec<&UiQuestion> {
        self.catalog_or_empty().filter(&self.search)
    }

    pub fn toggle_add_question(&mut self, question_id: QuestionId) {
        let catalog = self.catalog.data().unwrap_or(&EMPTY_CATALOG);
        self.selection.toggle_add_question(catalog, question_id);
    }

    pub fn toggle_option(&mut self, question_id: QuestionId, option_id: OptionId) {
        self.selection.toggle_option(question_id, option_id);
    }

    pub fn selected_summary(&self) -> Vec<SummaryItem> {
        self.selection.selected_summary(self.catalog_or_empty())
    }

    /// Payload `finish` would send for the current state
    pub fn submission(&self, skip: bool) -> PanelSubmission {
        let panel = self.provider_form.attributes();
        if skip {
            return PanelSubmission::skipped(panel);
        }
        PanelSubmission::full(
            panel,
            self.selection.qualifications(self.catalog_or_empty()),
            self.quotas.records(),
        )
    }

    /// Submit the panel from the last step.
    ///
    /// `skip` sends the panel attributes only. An edit session always sends
    /// the full payload as an update. Success and failure both reset the
    /// editor.
    pub async fn finish(&mut self, skip: bool) -> FinishOutcome {
        if self.busy || self.step != WizardStep::Quotas {
            return FinishOutcome::Blocked;
        }
        if !self.provider_form.is_valid() {
            self.provider_form.mark_all_touched();
            warn!("Finish blocked: provider step is incomplete");
            return FinishOutcome::Blocked;
        }
        let summary = self.selected_summary();
        if !self.quotas.is_valid(&summary) {
            self.quotas.mark_all_touched();
            warn!("Finish blocked: {} quota errors", self.quotas.errors(&summary).len());
            return FinishOutcome::Blocked;
        }

        let campaign_id = self.context.campaign_id;
        self.busy = true;
        let result = match self.context.mode {
            EditorMode::Create => {
                let submission = self.submission(skip);
                info!("Creating panel for campaign {} (skip: {})", campaign_id, skip);
                self.gateway.create_panel(campaign_id, &submission).await
            }
            EditorMode::Edit { panel_id } => {
                if skip {
                    warn!("Skip is not available when editing, sending the full panel");
                }
                let submission = self.submission(false);
                info!("Updating panel {} of campaign {}", panel_id, campaign_id);
                self.gateway.update_panel(campaign_id, panel_id, &submission).await
            }
        };
        self.busy = false;
        self.reset();

        match result {
            Ok(body) => {
                info!("Panel saved");
                FinishOutcome::Submitted(body)
            }
            Err(e) => {
                error!("Panel submission failed: {:#}", e);
                FinishOutcome::Failed(format!("{:#}", e))
            }
        }
    }

    /// Abandon the session without sending anything
    pub fn cancel(&mut self) {
        info!("Panel editing cancelled");
        self.reset();
    }

    /// Clear every piece of local state; loaded lists are kept
    pub fn reset(&mut self) {
        self.selection.reset();
        self.quotas.clear();
        self.provider_form.reset();
        self.step = WizardStep::Provider;
        self.search.clear();
        self.busy = false;
    }
}
