use super::CampaignStep;
use crate::api::models::{CampaignSubmission, LookupItem};
use crate::api::Gateway;
use crate::editor::fields::{FieldError, FormField, Rule, HTTP_URL};
use crate::editor::ids::{bind_id, read_decimal, read_id, CampaignId};
use crate::editor::AllocationMode;
use crate::resource::Resource;
use anyhow::bail;
use log::{debug, error, info, warn};

pub const REDIRECT_COMPLETE_DEFAULT: &str = "https://panel.example.com/success?pid=[PID]&sid=[SID]";
pub const REDIRECT_TERMINATE_DEFAULT: &str = "https://panel.example.com/terminate?pid=[PID]&sid=[SID]";
pub const REDIRECT_OVERQUOTA_DEFAULT: &str = "https://panel.example.com/overquota?pid=[PID]&sid=[SID]";

/// Panel rows a new draft starts with: name, target completes, CPI
const DEFAULT_PANELS: &[(&str, &str, &str)] = &[
    ("Panel 1", "500", "2.50"),
    ("Panel 2", "300", "2.80"),
    ("Panel 3", "200", "3.00"),
];

const NAME_RULES: &[Rule] = &[Rule::Required, Rule::MinLength(3), Rule::MaxLength(100)];
const LOOKUP_RULES: &[Rule] = &[Rule::Required, Rule::Integer];
const LOI_RULES: &[Rule] = &[Rule::Required, Rule::Count, Rule::Min(1.0)];
const IR_RULES: &[Rule] = &[Rule::Required, Rule::Count, Rule::Min(1.0), Rule::Max(100.0)];
const TOTAL_RULES: &[Rule] = &[Rule::Required, Rule::Count, Rule::Min(1.0)];
const PANEL_TARGET_RULES: &[Rule] = &[Rule::Required, Rule::Count, Rule::Min(0.0)];
const PANEL_CPI_RULES: &[Rule] = &[Rule::Required, Rule::Min(0.0)];
static REDIRECT_RULES: &[Rule] = &[Rule::Pattern(&HTTP_URL)];

#[derive(Debug, Clone, Default)]
pub struct BasicsForm {
    pub name: FormField,
    pub country: FormField,
    pub language: FormField,
    pub loi: FormField,
    pub ir: FormField,
    pub total_completes: FormField,
}

impl BasicsForm {
    fn errors(&self) -> Vec<FieldError> {
        [
            self.name.validate("campaign_name", "Campaign name", NAME_RULES),
            self.country.validate("country", "Country", LOOKUP_RULES),
            self.language.validate("language", "Language", LOOKUP_RULES),
            self.loi.validate("loi", "LOI (minutes)", LOI_RULES),
            self.ir.validate("ir", "IR (%)", IR_RULES),
            self.total_completes
                .validate("total_completes", "Total target completes", TOTAL_RULES),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect()
    }

    fn mark_all_touched(&mut self) {
        for field in [
            &mut self.name,
            &mut self.country,
            &mut self.language,
            &mut self.loi,
            &mut self.ir,
            &mut self.total_completes,
        ] {
            field.mark_touched();
        }
    }
}

/// One panel row of the allocation table
#[derive(Debug, Clone)]
pub struct PanelAllocation {
    pub name: String,
    pub target: FormField,
    pub cpi: FormField,
}

impl PanelAllocation {
    pub fn new(name: impl Into<String>, target: &str, cpi: &str) -> Self {
        Self {
            name: name.into(),
            target: FormField::with_value(target),
            cpi: FormField::with_value(cpi),
        }
    }

    /// Whole-number target, zero when blank or unparseable
    pub fn target_count(&self) -> u64 {
        self.target.value().trim().parse().unwrap_or(0)
    }

    fn errors(&self, mode: AllocationMode) -> Vec<FieldError> {
        let target_label = format!("{} target completes", self.name);
        let cpi_label = format!("{} CPI", self.name);
        let target = match mode {
            AllocationMode::Manual => self.target.validate("panel_target", &target_label, PANEL_TARGET_RULES),
            AllocationMode::Auto => Ok(()),
        };
        [target, self.cpi.validate("panel_cpi", &cpi_label, PANEL_CPI_RULES)]
            .into_iter()
            .filter_map(Result::err)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct RedirectsForm {
    pub complete: FormField,
    pub terminate: FormField,
    pub overquota: FormField,
}

impl Default for RedirectsForm {
    fn default() -> Self {
        Self {
            complete: FormField::with_value(REDIRECT_COMPLETE_DEFAULT),
            terminate: FormField::with_value(REDIRECT_TERMINATE_DEFAULT),
            overquota: FormField::with_value(REDIRECT_OVERQUOTA_DEFAULT),
        }
    }
}

impl RedirectsForm {
    fn errors(&self) -> Vec<FieldError> {
        [
            self.complete.validate("redirect_complete", "Success URL", REDIRECT_RULES),
            self.terminate.validate("redirect_terminate", "Termination URL", REDIRECT_RULES),
            self.overquota.validate("redirect_overquota", "Overquota URL", REDIRECT_RULES),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect()
    }
}

fn optional_text(field: &FormField) -> Option<String> {
    let value = field.value().trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn read_count(field: &FormField) -> Option<u32> {
    field.value().trim().parse().ok()
}

/// Four-step campaign creation draft
#[derive(Debug, Clone)]
pub struct CampaignDraft {
    step: CampaignStep,
    mode: AllocationMode,
    basics: BasicsForm,
    panels: Vec<PanelAllocation>,
    redirects: RedirectsForm,
    languages: Resource<Vec<LookupItem>>,
    countries: Resource<Vec<LookupItem>>,
}

impl Default for CampaignDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl CampaignDraft {
    pub fn new() -> Self {
        Self {
            step: CampaignStep::Basics,
            mode: AllocationMode::Manual,
            basics: BasicsForm::default(),
            panels: DEFAULT_PANELS
                .iter()
                .map(|(name, target, cpi)| PanelAllocation::new(*name, target, cpi))
                .collect(),
            redirects: RedirectsForm::default(),
            languages: Resource::NotAsked,
            countries: Resource::NotAsked,
        }
    }

    /// Load languages and countries concurrently
    pub async fn load_lookups(&mut self, gateway: &dyn Gateway) {
        self.languages = Resource::Loading;
        self.countries = Resource::Loading;

        let (languages, countries) = futures::join!(gateway.fetch_languages(), gateway.fetch_countries());
        if let Err(e) = &languages {
            error!("Failed to load languages: {:#}", e);
        }
        if let Err(e) = &countries {
            error!("Failed to load countries: {:#}", e);
        }
        self.languages = Resource::from_anyhow(languages);
        self.countries = Resource::from_anyhow(countries);
    }

    /// Still waiting on either lookup list
    pub fn is_loading(&self) -> bool {
        self.languages.is_loading() || self.countries.is_loading()
    }

    pub fn languages(&self) -> &Resource<Vec<LookupItem>> {
        &self.languages
    }

    pub fn countries(&self) -> &Resource<Vec<LookupItem>> {
        &self.countries
    }

    pub fn step(&self) -> CampaignStep {
        self.step
    }

    pub fn basics(&self) -> &BasicsForm {
        &self.basics
    }

    pub fn basics_mut(&mut self) -> &mut BasicsForm {
        &mut self.basics
    }

    pub fn redirects(&self) -> &RedirectsForm {
        &self.redirects
    }

    pub fn redirects_mut(&mut self) -> &mut RedirectsForm {
        &mut self.redirects
    }

    pub fn set_country(&mut self, country_id: i64) {
        self.basics.country.set_value(bind_id(country_id));
    }

    pub fn set_language(&mut self, language_id: i64) {
        self.basics.language.set_value(bind_id(language_id));
    }

    pub fn panels(&self) -> &[PanelAllocation] {
        &self.panels
    }

    pub fn add_panel(&mut self, name: impl Into<String>) -> usize {
        self.panels.push(PanelAllocation::new(name, "0", "0"));
        self.panels.len() - 1
    }

    pub fn remove_panel(&mut self, index: usize) -> bool {
        if index >= self.panels.len() {
            return false;
        }
        self.panels.remove(index);
        true
    }

    /// Ignored in automatic allocation
    pub fn set_panel_target(&mut self, index: usize, target: impl Into<String>) -> bool {
        if self.mode.is_auto() {
            return false;
        }
        match self.panels.get_mut(index) {
            Some(panel) => {
                panel.target.set_value(target);
                true
            }
            None => false,
        }
    }

    pub fn set_panel_cpi(&mut self, index: usize, cpi: impl Into<String>) -> bool {
        match self.panels.get_mut(index) {
            Some(panel) => {
                panel.cpi.set_value(cpi);
                true
            }
            None => false,
        }
    }

    pub fn allocation_mode(&self) -> AllocationMode {
        self.mode
    }

    pub fn set_allocation_mode(&mut self, mode: AllocationMode) {
        debug!("Campaign allocation mode set to {}", mode);
        self.mode = mode;
    }

    pub fn allocated_total(&self) -> u64 {
        self.panels.iter().map(PanelAllocation::target_count).sum()
    }

    pub fn target_total(&self) -> u64 {
        self.basics.total_completes.value().trim().parse().unwrap_or(0)
    }

    /// Positive when panels allocate more than the campaign target
    pub fn allocation_diff(&self) -> i64 {
        self.allocated_total() as i64 - self.target_total() as i64
    }

    /// Errors of the required controls on a step. Optional controls such as
    /// redirects do not hold back navigation.
    pub fn step_errors(&self, step: CampaignStep) -> Vec<FieldError> {
        match step {
            CampaignStep::Basics => self.basics.errors(),
            CampaignStep::Panels => self.panels.iter().flat_map(|p| p.errors(self.mode)).collect(),
            CampaignStep::Redirects | CampaignStep::Review => Vec::new(),
        }
    }

    /// Every error across the draft, optional controls included
    pub fn errors(&self) -> Vec<FieldError> {
        let mut errors = self.step_errors(CampaignStep::Basics);
        errors.extend(self.step_errors(CampaignStep::Panels));
        errors.extend(self.redirects.errors());
        errors
    }

    pub fn is_current_step_valid(&self) -> bool {
        self.step_errors(self.step).is_empty()
    }

    pub fn next(&mut self) -> bool {
        if !self.is_current_step_valid() {
            if self.step == CampaignStep::Basics {
                self.basics.mark_all_touched();
            }
            warn!("{} step incomplete", self.step.name());
            return false;
        }
        match self.step.following() {
            Some(step) => {
                self.step = step;
                true
            }
            None => false,
        }
    }

    pub fn previous(&mut self) -> bool {
        match self.step.preceding() {
            Some(step) => {
                self.step = step;
                true
            }
            None => false,
        }
    }

    /// Jump to a step by number, at most one past the current step
    pub fn go_to_step(&mut self, number: u8) -> bool {
        match CampaignStep::from_number(number) {
            Some(step) if number <= self.step.number() + 1 => {
                self.step = step;
                true
            }
            _ => false,
        }
    }

    pub fn submission(&self) -> anyhow::Result<CampaignSubmission> {
        let errors = self.errors();
        if !errors.is_empty() {
            let messages: Vec<String> = errors.iter().map(|e| e.message.clone()).collect();
            bail!("Campaign draft is incomplete: {}", messages.join("; "));
        }

        Ok(CampaignSubmission {
            campaign_name: self.basics.name.value().trim().to_string(),
            country_id: read_id(self.basics.country.value()),
            language_id: read_id(self.basics.language.value()),
            loi: read_count(&self.basics.loi),
            ir: read_count(&self.basics.ir),
            total_completes: read_count(&self.basics.total_completes),
            allocation_mode: self.mode.as_str().to_string(),
            redirect_complete: optional_text(&self.redirects.complete),
            redirect_terminate: optional_text(&self.redirects.terminate),
            redirect_overquota: optional_text(&self.redirects.overquota),
        })
    }

    /// Post the draft and return the new campaign's id
    pub async fn submit(&self, gateway: &dyn Gateway) -> anyhow::Result<CampaignId> {
        let submission = self.submission()?;
        let created = gateway.create_campaign(&submission).await?;
        info!("Created campaign {}", created.campaign_id);
        Ok(created.campaign_id)
    }

    /// Average CPI across panels, weighted by target completes
    pub fn blended_cpi(&self) -> Option<f64> {
        let allocated = self.allocated_total();
        if allocated == 0 {
            return None;
        }
        let spend: f64 = self
            .panels
            .iter()
            .filter_map(|p| read_decimal(p.cpi.value()).map(|cpi| cpi * p.target_count() as f64))
            .sum();
        Some(spend / allocated as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_basics(draft: &mut CampaignDraft) {
        let basics = draft.basics_mut();
        basics.name.set_value("Summer study");
        basics.loi.set_value("15");
        basics.ir.set_value("40");
        basics.total_completes.set_value("1000");
        draft.set_country(2);
        draft.set_language(1);
    }

    #[test]
    fn test_new_draft_defaults() {
        let draft = CampaignDraft::new();
        assert_eq!(draft.step(), CampaignStep::Basics);
        assert_eq!(draft.panels().len(), 3);
        assert_eq!(draft.allocated_total(), 1000);
        assert_eq!(draft.redirects().complete.value(), REDIRECT_COMPLETE_DEFAULT);
    }

    #[test]
    fn test_next_requires_valid_basics() {
        let mut draft = CampaignDraft::new();
        assert!(!draft.next());
        assert_eq!(draft.step(), CampaignStep::Basics);
        assert!(draft.basics().name.is_touched());

        valid_basics(&mut draft);
        draft.basics_mut().ir.set_value("101");
        assert!(!draft.next());
        draft.basics_mut().ir.set_value("100");
        assert!(draft.next());
        assert_eq!(draft.step(), CampaignStep::Panels);
    }

    #[test]
    fn test_name_length_bounds() {
        let mut draft = CampaignDraft::new();
        valid_basics(&mut draft);
        draft.basics_mut().name.set_value("ab");
        assert!(!draft.is_current_step_valid());
        draft.basics_mut().name.set_value("a".repeat(101));
        assert!(!draft.is_current_step_valid());
        draft.basics_mut().name.set_value("abc");
        assert!(draft.is_current_step_valid());
    }

    #[test]
    fn test_auto_mode_skips_panel_targets() {
        let mut draft = CampaignDraft::new();
        valid_basics(&mut draft);
        draft.next();
        draft.set_panel_target(0, "");
        assert!(!draft.is_current_step_valid());

        draft.set_allocation_mode(AllocationMode::Auto);
        assert!(draft.is_current_step_valid());
        assert!(!draft.set_panel_target(0, "10"));
    }

    #[test]
    fn test_allocation_totals() {
        let mut draft = CampaignDraft::new();
        draft.basics_mut().total_completes.set_value("900");
        assert_eq!(draft.target_total(), 900);
        assert_eq!(draft.allocation_diff(), 100);

        draft.set_panel_target(2, "abc");
        assert_eq!(draft.allocated_total(), 800);
        assert_eq!(draft.allocation_diff(), -100);
    }

    #[test]
    fn test_blended_cpi() {
        let mut draft = CampaignDraft::new();
        draft.set_panel_target(0, "100");
        draft.set_panel_target(1, "100");
        draft.set_panel_target(2, "0");
        draft.set_panel_cpi(0, "2");
        draft.set_panel_cpi(1, "4");
        assert_eq!(draft.blended_cpi(), Some(3.0));
    }

    #[test]
    fn test_go_to_step_bounds() {
        let mut draft = CampaignDraft::new();
        assert!(!draft.go_to_step(3));
        assert!(!draft.go_to_step(0));
        assert!(draft.go_to_step(2));
        assert!(draft.go_to_step(3));
        assert!(draft.go_to_step(1));
        assert!(!draft.go_to_step(5));
        assert!(!draft.previous());
    }

    #[test]
    fn test_redirects_do_not_block_navigation_but_block_submission() {
        let mut draft = CampaignDraft::new();
        valid_basics(&mut draft);
        draft.redirects_mut().terminate.set_value("ftp://nope");
        draft.go_to_step(2);
        draft.go_to_step(3);
        assert!(draft.next());
        assert_eq!(draft.step(), CampaignStep::Review);
        assert!(draft.submission().is_err());

        draft.redirects_mut().terminate.set_value("");
        let submission = draft.submission().unwrap();
        assert_eq!(submission.redirect_terminate, None);
        assert_eq!(submission.country_id, Some(2));
        assert_eq!(submission.total_completes, Some(1000));
        assert_eq!(submission.allocation_mode, "manual");
    }
}
