use super::AllocationMode;
use super::fields::{FieldError, FormField, Rule};
use super::ids::{bind_id, read_decimal, read_id, ProviderId};
use crate::api::models::{PanelAttributes, SavedPanel, Target, AUTO_TARGET};

const PROVIDER_RULES: &[Rule] = &[Rule::Required, Rule::Integer];
const MANUAL_COMPLETES_RULES: &[Rule] = &[Rule::Required, Rule::Count, Rule::Min(1.0)];
const AUTO_COMPLETES_RULES: &[Rule] = &[Rule::Required];
const CPI_RULES: &[Rule] = &[Rule::Required, Rule::Min(0.01)];
const ENTRY_URL_RULES: &[Rule] = &[Rule::Required];

/// Step-one sub-form: provider, completes target, CPI and entry URL
#[derive(Debug, Clone)]
pub struct ProviderForm {
    provider: FormField,
    max_completes: FormField,
    cpi: FormField,
    entry_url: FormField,
    mode: AllocationMode,
}

impl ProviderForm {
    pub fn new(mode: AllocationMode) -> Self {
        let mut form = Self {
            provider: FormField::new(),
            max_completes: FormField::new(),
            cpi: FormField::new(),
            entry_url: FormField::new(),
            mode,
        };
        form.apply_mode();
        form
    }

    fn apply_mode(&mut self) {
        if self.mode.is_auto() {
            self.max_completes.set_value(AUTO_TARGET);
        }
    }

    pub fn mode(&self) -> AllocationMode {
        self.mode
    }

    pub fn set_provider(&mut self, provider_id: ProviderId) {
        self.provider.set_value(bind_id(provider_id));
    }

    /// Ignored in automatic allocation, where the target is fixed to `Auto`
    pub fn set_max_completes(&mut self, value: impl Into<String>) {
        if self.mode.is_auto() {
            return;
        }
        self.max_completes.set_value(value);
    }

    pub fn set_cpi(&mut self, value: impl Into<String>) {
        self.cpi.set_value(value);
    }

    pub fn set_entry_url(&mut self, value: impl Into<String>) {
        self.entry_url.set_value(value);
    }

    pub fn provider(&self) -> &FormField {
        &self.provider
    }

    pub fn max_completes(&self) -> &FormField {
        &self.max_completes
    }

    pub fn cpi(&self) -> &FormField {
        &self.cpi
    }

    pub fn entry_url(&self) -> &FormField {
        &self.entry_url
    }

    fn completes_rules(&self) -> &'static [Rule] {
        match self.mode {
            AllocationMode::Manual => MANUAL_COMPLETES_RULES,
            AllocationMode::Auto => AUTO_COMPLETES_RULES,
        }
    }

    pub fn errors(&self) -> Vec<FieldError> {
        [
            self.provider.validate("panel_provider", "Panel provider", PROVIDER_RULES),
            self.max_completes
                .validate("max_completes", "Max completes", self.completes_rules()),
            self.cpi.validate("cpi", "CPI", CPI_RULES),
            self.entry_url.validate("entry_url", "Entry URL", ENTRY_URL_RULES),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }

    pub fn mark_all_touched(&mut self) {
        self.provider.mark_touched();
        self.max_completes.mark_touched();
        self.cpi.mark_touched();
        self.entry_url.mark_touched();
    }

    pub fn reset(&mut self) {
        self.provider.reset();
        self.max_completes.reset();
        self.cpi.reset();
        self.entry_url.reset();
        self.apply_mode();
    }

    /// Seed the form from a saved panel (edit mode)
    pub fn patch_from_saved(&mut self, panel: &SavedPanel) {
        if let Some(provider_id) = panel.panel_provider_id {
            self.set_provider(provider_id);
        }
        if let Some(target) = panel.target_completes {
            self.set_max_completes(target.to_string());
        }
        if let Some(cpi) = panel.cpi {
            self.cpi.set_value(cpi.to_string());
        }
        if let Some(url) = &panel.entry_url {
            self.entry_url.set_value(url.clone());
        }
    }

    pub fn attributes(&self) -> PanelAttributes {
        let target_completes = match self.mode {
            AllocationMode::Auto => Some(Target::Auto),
            AllocationMode::Manual => Target::parse(self.max_completes.value()),
        };
        PanelAttributes {
            panel_provider_id: read_id(self.provider.value()),
            target_completes,
            cpi: read_decimal(self.cpi.value()),
            entry_url: self.entry_url.value().trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(mode: AllocationMode) -> ProviderForm {
        let mut form = ProviderForm::new(mode);
        form.set_provider(3);
        form.set_max_completes("250");
        form.set_cpi("1.75");
        form.set_entry_url("https://survey.example.com/s?pid=[PID]");
        form
    }

    #[test]
    fn test_empty_form_reports_every_field() {
        let form = ProviderForm::new(AllocationMode::Manual);
        let fields: Vec<&str> = form.errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["panel_provider", "max_completes", "cpi", "entry_url"]);
    }

    #[test]
    fn test_cpi_lower_bound() {
        let mut form = filled(AllocationMode::Manual);
        form.set_cpi("0");
        assert!(!form.is_valid());
        form.set_cpi("0.01");
        assert!(form.is_valid());
    }

    #[test]
    fn test_valid_form_always_yields_payload_values() {
        let mut form = filled(AllocationMode::Manual);
        form.set_max_completes("5000000000");
        assert!(!form.is_valid());

        let mut form = filled(AllocationMode::Manual);
        form.set_cpi("inf");
        assert!(!form.is_valid());

        let form = filled(AllocationMode::Manual);
        assert!(form.is_valid());
        let attrs = form.attributes();
        assert!(attrs.target_completes.is_some());
        assert!(attrs.cpi.is_some());
    }

    #[test]
    fn test_auto_mode_pins_completes() {
        let mut form = filled(AllocationMode::Auto);
        assert_eq!(form.max_completes().value(), "Auto");
        assert!(form.is_valid());
        assert_eq!(form.attributes().target_completes, Some(Target::Auto));

        form.reset();
        assert_eq!(form.max_completes().value(), "Auto");
        assert!(!form.provider().is_touched());
    }

    #[test]
    fn test_attributes_coerce_ids_and_numbers() {
        let attrs = filled(AllocationMode::Manual).attributes();
        assert_eq!(attrs.panel_provider_id, Some(3));
        assert_eq!(attrs.target_completes, Some(Target::Count(250)));
        assert_eq!(attrs.cpi, Some(1.75));
        assert_eq!(attrs.entry_url, "https://survey.example.com/s?pid=[PID]");
    }

    #[test]
    fn test_mark_all_touched() {
        let mut form = ProviderForm::new(AllocationMode::Manual);
        form.mark_all_touched();
        assert!(form.provider().is_touched());
        assert!(form.max_completes().is_touched());
        assert!(form.cpi().is_touched());
        assert!(form.entry_url().is_touched());
    }

    #[test]
    fn test_patch_from_saved() {
        let mut form = ProviderForm::new(AllocationMode::Manual);
        form.patch_from_saved(&SavedPanel {
            panel_provider_id: Some(9),
            target_completes: Some(Target::Count(40)),
            cpi: Some(2.5),
            entry_url: Some("https://e.example.com".to_string()),
            qualifications: Vec::new(),
            quotas: Vec::new(),
        });
        assert_eq!(form.provider().value(), "9");
        assert_eq!(form.max_completes().value(), "40");
        assert_eq!(form.cpi().value(), "2.5");
        assert!(form.is_valid());
    }
}
