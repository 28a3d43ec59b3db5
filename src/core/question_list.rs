//! Ordering and selection over an assessment's questions.
//!
//! The controller borrows the orchestrator's working copy and never mutates it.
//! Every operation returns a [`ListChange`] proposal carrying the full new
//! sequence, or a [`StaleOperation`] when the request no longer matches the
//! list (drag events racing each other, double deletes). Stale operations are
//! expected during fast UI interaction and callers treat them as no-ops.

use crate::domain::model::{renumber, Question};

/// Proposed new state for the orchestrator to apply.
#[derive(Debug, Clone, PartialEq)]
pub struct ListChange {
    /// Full replacement sequence; `None` when only the selection moved.
    pub questions: Option<Vec<Question>>,
    pub selection: Option<String>,
}

/// Why a list operation was ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleOperation {
    UnknownQuestion(String),
    SamePosition { question_id: String, index: usize },
}

impl std::fmt::Display for StaleOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StaleOperation::UnknownQuestion(id) => write!(f, "unknown question '{}'", id),
            StaleOperation::SamePosition { question_id, index } => {
                write!(f, "question '{}' already at index {}", question_id, index)
            }
        }
    }
}

pub struct QuestionListController<'a> {
    questions: &'a [Question],
    selected: Option<&'a str>,
}

impl<'a> QuestionListController<'a> {
    pub fn new(questions: &'a [Question], selected: Option<&'a str>) -> Self {
        Self {
            questions,
            selected,
        }
    }

    fn position(&self, question_id: &str) -> Option<usize> {
        self.questions.iter().position(|q| q.id == question_id)
    }

    fn current_selection(&self) -> Option<String> {
        self.selected.map(str::to_string)
    }

    /// Move `dragged_id` to `target_index`; indices past the end append.
    pub fn reorder(
        &self,
        dragged_id: &str,
        target_index: usize,
    ) -> Result<ListChange, StaleOperation> {
        let from = self
            .position(dragged_id)
            .ok_or_else(|| StaleOperation::UnknownQuestion(dragged_id.to_string()))?;
        let to = target_index.min(self.questions.len() - 1);

        if from == to {
            return Err(StaleOperation::SamePosition {
                question_id: dragged_id.to_string(),
                index: from,
            });
        }

        let mut questions = self.questions.to_vec();
        let dragged = questions.remove(from);
        questions.insert(to, dragged);
        renumber(&mut questions);

        Ok(ListChange {
            questions: Some(questions),
            selection: self.current_selection(),
        })
    }

    pub fn select(&self, question_id: &str) -> Result<ListChange, StaleOperation> {
        if self.position(question_id).is_none() {
            return Err(StaleOperation::UnknownQuestion(question_id.to_string()));
        }

        Ok(ListChange {
            questions: None,
            selection: Some(question_id.to_string()),
        })
    }

    /// Append a default question, which becomes the selection.
    pub fn add(&self) -> (Question, ListChange) {
        let mut questions = self.questions.to_vec();
        let question = Question::new_default(questions.len() as u32 + 1);
        let selection = Some(question.id.clone());
        questions.push(question.clone());
        renumber(&mut questions);

        let change = ListChange {
            questions: Some(questions),
            selection,
        };
        (question, change)
    }

    pub fn delete(&self, question_id: &str) -> Result<ListChange, StaleOperation> {
        let index = self
            .position(question_id)
            .ok_or_else(|| StaleOperation::UnknownQuestion(question_id.to_string()))?;

        let mut questions = self.questions.to_vec();
        questions.remove(index);
        renumber(&mut questions);

        let selection = match self.selected {
            Some(selected) if selected == question_id => questions.first().map(|q| q.id.clone()),
            other => other.map(str::to_string),
        };

        Ok(ListChange {
            questions: Some(questions),
            selection,
        })
    }
}
