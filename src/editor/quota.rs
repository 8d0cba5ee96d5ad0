//! Quota groups and their targeting conditions

use super::AllocationMode;
use super::catalog::UiOption;
use super::fields::{FieldError, FormField, Rule};
use super::ids::{bind_id, bind_opt_id, id_matches, read_id, OptionId, QuestionId};
use super::selection::SummaryItem;
use crate::api::models::{ConditionRecord, QuotaRecord, Target, AUTO_TARGET};
use log::debug;

const NAME_RULES: &[Rule] = &[Rule::Required];
const MANUAL_TARGET_RULES: &[Rule] = &[Rule::Required, Rule::Count, Rule::Min(1.0)];
const REQUIRED: &[Rule] = &[Rule::Required];

/// Initial target of a new quota in manual allocation
const DEFAULT_MANUAL_TARGET: &str = "0";

/// Entry of the condition question dropdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionChoice {
    /// Bound control value
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionForm {
    question: FormField,
    answer: FormField,
}

impl ConditionForm {
    pub fn question(&self) -> &FormField {
        &self.question
    }

    pub fn answer(&self) -> &FormField {
        &self.answer
    }

    pub fn question_id(&self) -> Option<QuestionId> {
        read_id(self.question.value())
    }

    pub fn answer_id(&self) -> Option<OptionId> {
        read_id(self.answer.value())
    }

    /// Options offered for this condition: the selected options of its
    /// question, or nothing if that question is no longer in the summary
    pub fn available_options<'a>(&self, summary: &'a [SummaryItem]) -> &'a [UiOption] {
        summary
            .iter()
            .find(|item| id_matches(self.question.value(), item.question_id))
            .map(|item| item.options.as_slice())
            .unwrap_or(&[])
    }

    pub fn errors(&self, summary: &[SummaryItem]) -> Vec<FieldError> {
        let mut errors = Vec::new();

        match self.question.validate("question", "Question", REQUIRED) {
            Err(e) => errors.push(e),
            Ok(()) => {
                let resolves = summary
                    .iter()
                    .any(|item| id_matches(self.question.value(), item.question_id));
                if !resolves {
                    errors.push(FieldError {
                        field: "question",
                        message: "Question is not a selected qualification".to_string(),
                    });
                }
            }
        }

        match self.answer.validate("answer", "Answer", REQUIRED) {
            Err(e) => errors.push(e),
            Ok(()) => {
                let resolves = self
                    .available_options(summary)
                    .iter()
                    .any(|o| id_matches(self.answer.value(), o.id));
                if !resolves {
                    errors.push(FieldError {
                        field: "answer",
                        message: "Answer is not a selected option of the question".to_string(),
                    });
                }
            }
        }

        errors
    }

    fn mark_touched(&mut self) {
        self.question.mark_touched();
        self.answer.mark_touched();
    }

    pub fn record(&self) -> ConditionRecord {
        ConditionRecord {
            qs_id: self.question_id(),
            opt_id: self.answer_id(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaForm {
    name: FormField,
    target: FormField,
    conditions: Vec<ConditionForm>,
}

impl QuotaForm {
    fn new(mode: AllocationMode) -> Self {
        Self {
            name: FormField::new(),
            target: FormField::with_value(default_target(mode)),
            conditions: Vec::new(),
        }
    }

    pub fn name(&self) -> &FormField {
        &self.name
    }

    pub fn target(&self) -> &FormField {
        &self.target
    }

    pub fn conditions(&self) -> &[ConditionForm] {
        &self.conditions
    }

    /// Name and target errors, ignoring conditions.
    ///
    /// Automatic allocation skips the numeric target check.
    pub fn own_errors(&self, mode: AllocationMode) -> Vec<FieldError> {
        let target = match mode {
            AllocationMode::Manual => self.target.validate("target", "Target", MANUAL_TARGET_RULES),
            AllocationMode::Auto => Ok(()),
        };
        [self.name.validate("name", "Quota name", NAME_RULES), target]
            .into_iter()
            .filter_map(Result::err)
            .collect()
    }

    pub fn is_valid(&self, mode: AllocationMode, summary: &[SummaryItem]) -> bool {
        self.own_errors(mode).is_empty() && self.conditions.iter().all(|c| c.errors(summary).is_empty())
    }

    fn mark_all_touched(&mut self) {
        self.name.mark_touched();
        self.target.mark_touched();
        self.conditions.iter_mut().for_each(ConditionForm::mark_touched);
    }

    fn record(&self, mode: AllocationMode) -> QuotaRecord {
        let target = match mode {
            AllocationMode::Auto => Some(Target::Auto),
            AllocationMode::Manual => Target::parse(self.target.value()),
        };
        QuotaRecord {
            quota_name: self.name.value().trim().to_string(),
            target,
            conditions: self.conditions.iter().map(ConditionForm::record).collect(),
        }
    }
}

/// Error located in a quota, or in one of its conditions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaError {
    pub quota: usize,
    pub condition: Option<usize>,
    pub error: FieldError,
}

fn default_target(mode: AllocationMode) -> &'static str {
    match mode {
        AllocationMode::Manual => DEFAULT_MANUAL_TARGET,
        AllocationMode::Auto => AUTO_TARGET,
    }
}

/// Ordered list of quotas. Index-based operations outside the current
/// bounds do nothing and report `false`/`None`.
#[derive(Debug, Clone)]
pub struct QuotaEditor {
    quotas: Vec<QuotaForm>,
    mode: AllocationMode,
}

impl QuotaEditor {
    pub fn new(mode: AllocationMode) -> Self {
        Self {
            quotas: Vec::new(),
            mode,
        }
    }

    pub fn mode(&self) -> AllocationMode {
        self.mode
    }

    /// Switch allocation mode; automatic mode pins every target to `Auto`
    pub fn set_mode(&mut self, mode: AllocationMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        for quota in &mut self.quotas {
            quota.target.set_value(default_target(mode));
        }
    }

    pub fn quotas(&self) -> &[QuotaForm] {
        &self.quotas
    }

    pub fn len(&self) -> usize {
        self.quotas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotas.is_empty()
    }

    /// Append an empty quota and return its index
    pub fn add_quota(&mut self) -> usize {
        self.quotas.push(QuotaForm::new(self.mode));
        self.quotas.len() - 1
    }

    pub fn remove_quota(&mut self, index: usize) -> bool {
        if index >= self.quotas.len() {
            return false;
        }
        self.quotas.remove(index);
        true
    }

    /// Append an empty condition to a quota and return its index
    pub fn add_condition(&mut self, quota: usize) -> Option<usize> {
        let quota = self.quotas.get_mut(quota)?;
        quota.conditions.push(ConditionForm::default());
        Some(quota.conditions.len() - 1)
    }

    pub fn remove_condition(&mut self, quota: usize, condition: usize) -> bool {
        match self.quotas.get_mut(quota) {
            Some(q) if condition < q.conditions.len() => {
                q.conditions.remove(condition);
                true
            }
            _ => false,
        }
    }

    pub fn set_name(&mut self, quota: usize, name: impl Into<String>) -> bool {
        match self.quotas.get_mut(quota) {
            Some(q) => {
                q.name.set_value(name);
                true
            }
            None => false,
        }
    }

    /// Ignored in automatic allocation
    pub fn set_target(&mut self, quota: usize, target: impl Into<String>) -> bool {
        if self.mode.is_auto() {
            return false;
        }
        match self.quotas.get_mut(quota) {
            Some(q) => {
                q.target.set_value(target);
                true
            }
            None => false,
        }
    }

    fn condition_mut(&mut self, quota: usize, condition: usize) -> Option<&mut ConditionForm> {
        self.quotas.get_mut(quota)?.conditions.get_mut(condition)
    }

    pub fn set_condition_question(&mut self, quota: usize, condition: usize, question_id: QuestionId) -> bool {
        match self.condition_mut(quota, condition) {
            Some(c) => {
                c.question.set_value(bind_id(question_id));
                true
            }
            None => false,
        }
    }

    pub fn set_condition_answer(&mut self, quota: usize, condition: usize, option_id: OptionId) -> bool {
        match self.condition_mut(quota, condition) {
            Some(c) => {
                c.answer.set_value(bind_id(option_id));
                true
            }
            None => false,
        }
    }

    /// Questions a condition may target: exactly the current summary
    pub fn available_questions(summary: &[SummaryItem]) -> Vec<QuestionChoice> {
        summary
            .iter()
            .map(|item| QuestionChoice {
                value: bind_id(item.question_id),
                label: item.question_title.clone(),
            })
            .collect()
    }

    pub fn options_for_condition(&self, quota: usize, condition: usize, summary: &[SummaryItem]) -> Vec<UiOption> {
        self.quotas
            .get(quota)
            .and_then(|q| q.conditions.get(condition))
            .map(|c| c.available_options(summary).to_vec())
            .unwrap_or_default()
    }

    pub fn errors(&self, summary: &[SummaryItem]) -> Vec<QuotaError> {
        let mut errors = Vec::new();
        for (quota_index, quota) in self.quotas.iter().enumerate() {
            for error in quota.own_errors(self.mode) {
                errors.push(QuotaError { quota: quota_index, condition: None, error });
            }
            for (condition_index, condition) in quota.conditions.iter().enumerate() {
                for error in condition.errors(summary) {
                    errors.push(QuotaError {
                        quota: quota_index,
                        condition: Some(condition_index),
                        error,
                    });
                }
            }
        }
        errors
    }

    pub fn is_valid(&self, summary: &[SummaryItem]) -> bool {
        self.quotas.iter().all(|q| q.is_valid(self.mode, summary))
    }

    /// Touch every quota and condition field so all errors surface at once
    pub fn mark_all_touched(&mut self) {
        self.quotas.iter_mut().for_each(QuotaForm::mark_all_touched);
    }

    pub fn clear(&mut self) {
        self.quotas.clear();
    }

    /// Rebuild quotas from their saved form; ids are bound as text
    pub fn restore(&mut self, records: &[QuotaRecord]) {
        debug!("Restoring {} saved quotas", records.len());
        self.quotas = records
            .iter()
            .map(|record| {
                let target = match (self.mode, record.target) {
                    (AllocationMode::Auto, _) => AUTO_TARGET.to_string(),
                    (AllocationMode::Manual, Some(target)) => target.to_string(),
                    (AllocationMode::Manual, None) => DEFAULT_MANUAL_TARGET.to_string(),
                };
                QuotaForm {
                    name: FormField::with_value(record.quota_name.clone()),
                    target: FormField::with_value(target),
                    conditions: record
                        .conditions
                        .iter()
                        .map(|cond| ConditionForm {
                            question: FormField::with_value(bind_opt_id(cond.qs_id)),
                            answer: FormField::with_value(bind_opt_id(cond.opt_id)),
                        })
                        .collect(),
                }
            })
            .collect();
    }

    pub fn records(&self) -> Vec<QuotaRecord> {
        self.quotas.iter().map(|q| q.record(self.mode)).collect()
    }
}
