//! Qualification selection state
//!
//! Tracks which questions are added as qualifications and which options are
//! selected per question. Every mutation publishes a fresh immutable
//! snapshot; readers holding an older `Arc<SelectionSnapshot>` keep seeing the
//! state they captured.

use super::catalog::{Catalog, UiOption};
use super::ids::{OptionId, QuestionId};
use crate::api::models::Qualification;
use indexmap::IndexSet;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSnapshot {
    /// Added questions in the order they were added
    added: IndexSet<QuestionId>,
    selected: BTreeMap<QuestionId, BTreeSet<OptionId>>,
}

impl SelectionSnapshot {
    pub fn added(&self) -> impl Iterator<Item = QuestionId> + '_ {
        self.added.iter().copied()
    }

    pub fn is_added(&self, question_id: QuestionId) -> bool {
        self.added.contains(&question_id)
    }

    pub fn selected_options(&self, question_id: QuestionId) -> Option<&BTreeSet<OptionId>> {
        self.selected.get(&question_id)
    }

    pub fn selections(&self) -> &BTreeMap<QuestionId, BTreeSet<OptionId>> {
        &self.selected
    }
}

/// One completed qualification: an added question with at least one option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryItem {
    pub question_id: QuestionId,
    pub question_title: String,
    pub options: Vec<UiOption>,
}

impl SummaryItem {
    pub fn option_labels(&self) -> String {
        self.options
            .iter()
            .map(|o| o.label.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    current: Arc<SelectionSnapshot>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state; cheap to clone and never mutated afterwards
    pub fn snapshot(&self) -> Arc<SelectionSnapshot> {
        Arc::clone(&self.current)
    }

    fn publish(&mut self, apply: impl FnOnce(&mut SelectionSnapshot)) {
        let mut next = SelectionSnapshot::clone(&self.current);
        apply(&mut next);
        self.current = Arc::new(next);
    }

    /// Add or remove a question as a qualification.
    ///
    /// Removing drops its option selection entirely. Adding selects every
    /// catalog option unless a non-empty selection already exists, in which
    /// case that selection is kept. Questions missing from the catalog are
    /// ignored.
    pub fn toggle_add_question(&mut self, catalog: &Catalog, question_id: QuestionId) {
        if self.current.is_added(question_id) {
            debug!("Removing qualification question {}", question_id);
            self.publish(|state| {
                state.added.shift_remove(&question_id);
                state.selected.remove(&question_id);
            });
            return;
        }

        if !catalog.contains(question_id) {
            debug!("Ignoring unknown qualification question {}", question_id);
            return;
        }

        let all_options: BTreeSet<OptionId> = catalog.options_for(question_id).iter().map(|o| o.id).collect();
        debug!("Adding qualification question {}", question_id);
        self.publish(|state| {
            state.added.insert(question_id);
            let has_prior = state
                .selected
                .get(&question_id)
                .is_some_and(|set| !set.is_empty());
            if !has_prior {
                state.selected.insert(question_id, all_options);
            }
        });
    }

    /// Flip one option. Never changes which questions are added, so a
    /// question can stay added with zero options selected.
    pub fn toggle_option(&mut self, question_id: QuestionId, option_id: OptionId) {
        self.publish(|state| {
            let set = state.selected.entry(question_id).or_default();
            if !set.remove(&option_id) {
                set.insert(option_id);
            }
        });
    }

    pub fn is_question_added(&self, question_id: QuestionId) -> bool {
        self.current.is_added(question_id)
    }

    pub fn is_option_selected(&self, question_id: QuestionId, option_id: OptionId) -> bool {
        self.current
            .selected_options(question_id)
            .is_some_and(|set| set.contains(&option_id))
    }

    /// Added questions with a non-empty selection, options in catalog order.
    ///
    /// Added questions whose selection was emptied are left out.
    pub fn selected_summary(&self, catalog: &Catalog) -> Vec<SummaryItem> {
        self.current
            .added()
            .filter_map(|question_id| {
                let selected = self.current.selected_options(question_id)?;
                if selected.is_empty() {
                    return None;
                }
                let question = catalog.question(question_id)?;
                let options = catalog
                    .options_for(question_id)
                    .iter()
                    .filter(|opt| selected.contains(&opt.id))
                    .cloned()
                    .collect();
                Some(SummaryItem {
                    question_id,
                    question_title: question.label.clone(),
                    options,
                })
            })
            .collect()
    }

    /// Id-only projection of the summary for submission
    pub fn qualifications(&self, catalog: &Catalog) -> Vec<Qualification> {
        self.selected_summary(catalog)
            .into_iter()
            .map(|item| Qualification {
                qs_id: item.question_id,
                option_ids: item.options.iter().map(|o| o.id).collect(),
            })
            .collect()
    }

    /// Replace the state with previously saved qualifications
    pub fn restore(&mut self, qualifications: &[Qualification]) {
        debug!("Restoring {} saved qualifications", qualifications.len());
        self.current = Arc::new(SelectionSnapshot {
            added: qualifications.iter().map(|q| q.qs_id).collect(),
            selected: qualifications
                .iter()
                .map(|q| (q.qs_id, q.option_ids.iter().copied().collect()))
                .collect(),
        });
    }

    pub fn reset(&mut self) {
        self.current = Arc::new(SelectionSnapshot::default());
    }
}
