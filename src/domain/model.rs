use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound for a slider question's score.
pub const MAX_SLIDER_SCORE: u32 = 100;
/// Lower bound for a slider question's score.
pub const MIN_SLIDER_SCORE: u32 = 1;
/// Score given to a slider question that has none.
pub const DEFAULT_SLIDER_SCORE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentStatus {
    #[default]
    Draft,
    Published,
    Unpublished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[default]
    SingleChoice,
    MultipleChoice,
    Text,
    Slider,
}

impl QuestionType {
    /// Choice questions carry options; the others never do.
    pub fn is_choice(self) -> bool {
        matches!(self, QuestionType::SingleChoice | QuestionType::MultipleChoice)
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            QuestionType::SingleChoice => "single_choice",
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::Text => "text",
            QuestionType::Slider => "slider",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single_choice" => Ok(QuestionType::SingleChoice),
            "multiple_choice" => Ok(QuestionType::MultipleChoice),
            "text" => Ok(QuestionType::Text),
            "slider" => Ok(QuestionType::Slider),
            other => Err(format!(
                "unknown question type '{}' (expected single_choice, multiple_choice, text or slider)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: String,
    pub text: String,
    pub score: i64,
}

impl QuestionOption {
    pub fn new(text: impl Into<String>, score: i64) -> Self {
        Self {
            id: generate_id(),
            text: text.into(),
            score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    /// 1-based position, always `index + 1` inside the owning assessment.
    pub order: u32,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<QuestionOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_score: Option<u32>,
}

impl Question {
    /// Placeholder question appended by the list controller.
    pub fn new_default(order: u32) -> Self {
        Self {
            id: generate_id(),
            order,
            text: "New question".to_string(),
            question_type: QuestionType::SingleChoice,
            required: true,
            options: Some(vec![
                QuestionOption::new("Option 1", 0),
                QuestionOption::new("Option 2", 0),
            ]),
            max_score: None,
        }
    }

    pub fn option_count(&self) -> usize {
        self.options.as_ref().map(Vec::len).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: AssessmentStatus,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Assessment {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tenant_id: None,
            title: title.into(),
            description: String::new(),
            status: AssessmentStatus::Draft,
            questions: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// The fields auto-save owns, as a full snapshot.
    pub fn autosave_payload(&self) -> AssessmentUpdate {
        AssessmentUpdate {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            status: None,
            questions: Some(self.questions.clone()),
        }
    }
}

/// Partial update body sent to the persistence service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AssessmentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<Question>>,
}

pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Rewrite `order` so it mirrors each question's index.
pub fn renumber(questions: &mut [Question]) {
    for (index, question) in questions.iter_mut().enumerate() {
        question.order = index as u32 + 1;
    }
}
