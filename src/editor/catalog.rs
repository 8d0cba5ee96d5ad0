//! Projection of the raw question catalog into editor-facing shapes

use super::ids::{OptionId, QuestionId};
use crate::api::models::ApiQuestion;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiQuestion {
    pub id: QuestionId,
    pub label: String,
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiOption {
    pub id: OptionId,
    pub label: String,
}

/// Question catalog indexed for the editor.
///
/// Questions keep the order the backend delivered them in; each question's
/// options keep their order too.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    questions: Vec<UiQuestion>,
    options: HashMap<QuestionId, Vec<UiOption>>,
}

impl Catalog {
    pub fn project(raw: &[ApiQuestion]) -> Self {
        let questions = raw
            .iter()
            .map(|q| UiQuestion {
                id: q.qs_id,
                label: q.question.clone(),
                kind: q.kind.clone(),
            })
            .collect();

        let options = raw
            .iter()
            .map(|q| {
                let options = q
                    .options
                    .iter()
                    .map(|opt| UiOption {
                        id: opt.opt_id,
                        label: opt.option_value.clone(),
                    })
                    .collect();
                (q.qs_id, options)
            })
            .collect();

        Self { questions, options }
    }

    pub fn questions(&self) -> &[UiQuestion] {
        &self.questions
    }

    pub fn question(&self, id: QuestionId) -> Option<&UiQuestion> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Options of a question, empty for unknown ids
    pub fn options_for(&self, id: QuestionId) -> &[UiOption] {
        self.options.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.options.contains_key(&id)
    }

    pub fn option_map(&self) -> &HashMap<QuestionId, Vec<UiOption>> {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Case-insensitive search over question label and kind
    pub fn filter(&self, term: &str) -> Vec<&UiQuestion> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return self.questions.iter().collect();
        }
        self.questions
            .iter()
            .filter(|q| q.label.to_lowercase().contains(&term) || q.kind.to_lowercase().contains(&term))
            .collect()
    }
}
