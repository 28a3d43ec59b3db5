//! Single-question editing.
//!
//! The editor holds a view of one question keyed by its id. Every operation is
//! expressed through [`QuestionEditor::set_field`] and returns the full updated
//! question, which the caller hands to the orchestrator as a replacement.

use crate::domain::model::{
    Question, QuestionOption, QuestionType, DEFAULT_SLIDER_SCORE, MAX_SLIDER_SCORE,
    MIN_SLIDER_SCORE,
};

/// Minimum options a choice question keeps while edited.
pub const MIN_CHOICE_OPTIONS: usize = 2;

/// Shallow partial update of a question.
///
/// The nested `Option` on `options` and `max_score` distinguishes "leave as is"
/// (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionPatch {
    pub text: Option<String>,
    pub question_type: Option<QuestionType>,
    pub required: Option<bool>,
    pub options: Option<Option<Vec<QuestionOption>>>,
    pub max_score: Option<Option<u32>>,
}

impl QuestionPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn required(required: bool) -> Self {
        Self {
            required: Some(required),
            ..Self::default()
        }
    }

    pub fn options(options: Option<Vec<QuestionOption>>) -> Self {
        Self {
            options: Some(options),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuestionEditor {
    question: Question,
}

impl QuestionEditor {
    pub fn new(question: Question) -> Self {
        Self { question }
    }

    /// Id of the question this editor targets.
    pub fn key(&self) -> &str {
        &self.question.id
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    /// Point the editor at `question`, discarding the previous view entirely.
    pub fn load(&mut self, question: &Question) {
        if self.question.id != question.id {
            tracing::debug!(from = %self.question.id, to = %question.id, "editor switched question");
        }
        self.question = question.clone();
    }

    pub fn set_field(&mut self, patch: QuestionPatch) -> Question {
        let QuestionPatch {
            text,
            question_type,
            required,
            options,
            max_score,
        } = patch;

        if let Some(text) = text {
            self.question.text = text;
        }
        if let Some(question_type) = question_type {
            self.question.question_type = question_type;
        }
        if let Some(required) = required {
            self.question.required = required;
        }
        if let Some(options) = options {
            self.question.options = options;
        }
        if let Some(max_score) = max_score {
            self.question.max_score = max_score;
        }

        self.question.clone()
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> Question {
        self.set_field(QuestionPatch::text(text))
    }

    pub fn set_required(&mut self, required: bool) -> Question {
        self.set_field(QuestionPatch::required(required))
    }

    /// Switch the question type, seeding or dropping options as needed.
    ///
    /// Entering a choice type without options seeds two defaults scored 10 and
    /// 20; moving between choice types keeps the existing options. Leaving for
    /// text or slider drops options immediately.
    pub fn change_type(&mut self, new_type: QuestionType) -> Question {
        let options = if new_type.is_choice() {
            match &self.question.options {
                Some(_) => None,
                None => Some(Some(vec![
                    QuestionOption::new("Option 1", 10),
                    QuestionOption::new("Option 2", 20),
                ])),
            }
        } else {
            Some(None)
        };

        let max_score = match (new_type, self.question.max_score) {
            (QuestionType::Slider, None) => Some(Some(DEFAULT_SLIDER_SCORE)),
            (QuestionType::Slider, Some(_)) => None,
            (_, _) => Some(None),
        };

        self.set_field(QuestionPatch {
            question_type: Some(new_type),
            options,
            max_score,
            ..QuestionPatch::default()
        })
    }

    /// Set the slider ceiling, clamped to the allowed range.
    ///
    /// Returns `None` when the question is not a slider.
    pub fn set_max_score(&mut self, max_score: u32) -> Option<Question> {
        if self.question.question_type != QuestionType::Slider {
            tracing::debug!(question_id = %self.question.id, "max score ignored for non-slider");
            return None;
        }
        let clamped = max_score.clamp(MIN_SLIDER_SCORE, MAX_SLIDER_SCORE);
        Some(self.set_field(QuestionPatch {
            max_score: Some(Some(clamped)),
            ..QuestionPatch::default()
        }))
    }

    /// Append an "Option N" choice scored 0.
    ///
    /// Returns `None` for text and slider questions, which carry no options.
    pub fn add_option(&mut self) -> Option<Question> {
        if !self.question.question_type.is_choice() {
            tracing::debug!(question_id = %self.question.id, "add option ignored for non-choice question");
            return None;
        }
        let mut options = self.question.options.clone().unwrap_or_default();
        let label = format!("Option {}", options.len() + 1);
        options.push(QuestionOption::new(label, 0));
        Some(self.set_field(QuestionPatch::options(Some(options))))
    }

    /// Whether removing an option keeps a choice question at two or more.
    pub fn can_remove_option(&self) -> bool {
        !self.question.question_type.is_choice() || self.question.option_count() > MIN_CHOICE_OPTIONS
    }

    /// Remove an option by id.
    ///
    /// Returns `None` when the option is unknown or when removal would leave a
    /// choice question with fewer than two options.
    pub fn remove_option(&mut self, option_id: &str) -> Option<Question> {
        let options = self.question.options.as_ref()?;
        if !options.iter().any(|o| o.id == option_id) {
            tracing::debug!(option_id, "remove ignored for unknown option");
            return None;
        }
        if !self.can_remove_option() {
            tracing::debug!(
                question_id = %self.question.id,
                "remove ignored, choice question keeps {} options",
                MIN_CHOICE_OPTIONS
            );
            return None;
        }

        let remaining: Vec<QuestionOption> = options
            .iter()
            .filter(|o| o.id != option_id)
            .cloned()
            .collect();
        Some(self.set_field(QuestionPatch::options(Some(remaining))))
    }

    pub fn update_option(
        &mut self,
        option_id: &str,
        text: Option<String>,
        score: Option<i64>,
    ) -> Option<Question> {
        let mut options = self.question.options.clone()?;
        let option = options.iter_mut().find(|o| o.id == option_id)?;
        if let Some(text) = text {
            option.text = text;
        }
        if let Some(score) = score {
            option.score = score;
        }
        Some(self.set_field(QuestionPatch::options(Some(options))))
    }
}
