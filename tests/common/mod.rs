#![allow(dead_code)]

use assessment_builder::core::{
    Assessment, AssessmentService, AssessmentUpdate, Question, QuestionOption, QuestionType,
};
use assessment_builder::utils::error::{BuilderError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Semaphore;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct RecordedSave {
    pub at: Instant,
    pub update: AssessmentUpdate,
}

/// In-memory assessment service that records every save.
///
/// With `gated()`, each save blocks until the test releases a permit, which
/// keeps a save in flight for as long as the test needs.
pub struct RecordingService {
    assessment: Mutex<Assessment>,
    saves: Mutex<Vec<RecordedSave>>,
    gate: Option<Semaphore>,
    fail_saves: AtomicBool,
    pub publishes: AtomicUsize,
    pub unpublishes: AtomicUsize,
}

impl RecordingService {
    pub fn new(assessment: Assessment) -> Self {
        Self {
            assessment: Mutex::new(assessment),
            saves: Mutex::new(Vec::new()),
            gate: None,
            fail_saves: AtomicBool::new(false),
            publishes: AtomicUsize::new(0),
            unpublishes: AtomicUsize::new(0),
        }
    }

    pub fn gated(assessment: Assessment) -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new(assessment)
        }
    }

    pub fn release_one(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_saves.store(failing, Ordering::SeqCst);
    }

    pub fn saves(&self) -> Vec<RecordedSave> {
        self.saves.lock().unwrap().clone()
    }

    pub fn stored(&self) -> Assessment {
        self.assessment.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssessmentService for RecordingService {
    async fn get(&self, _tenant_id: &str, assessment_id: &str) -> Result<Assessment> {
        let assessment = self.stored();
        if assessment.id != assessment_id {
            return Err(BuilderError::ApiStatusError {
                status: 404,
                message: "not found".to_string(),
            });
        }
        Ok(assessment)
    }

    async fn update(
        &self,
        _tenant_id: &str,
        _assessment_id: &str,
        update: AssessmentUpdate,
    ) -> Result<Assessment> {
        self.saves.lock().unwrap().push(RecordedSave {
            at: Instant::now(),
            update: update.clone(),
        });

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(BuilderError::ApiStatusError {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }

        let mut stored = self.assessment.lock().unwrap();
        if let Some(title) = update.title {
            stored.title = title;
        }
        if let Some(description) = update.description {
            stored.description = description;
        }
        if let Some(questions) = update.questions {
            stored.questions = questions;
        }
        Ok(stored.clone())
    }

    async fn publish(&self, _tenant_id: &str, _assessment_id: &str) -> Result<()> {
        self.publishes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn unpublish(&self, _tenant_id: &str, _assessment_id: &str) -> Result<()> {
        self.unpublishes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn choice_question(id: &str, order: u32, text: &str) -> Question {
    Question {
        id: id.to_string(),
        order,
        text: text.to_string(),
        question_type: QuestionType::SingleChoice,
        required: true,
        options: Some(vec![
            QuestionOption {
                id: format!("{}-yes", id),
                text: "Yes".to_string(),
                score: 10,
            },
            QuestionOption {
                id: format!("{}-no", id),
                text: "No".to_string(),
                score: 0,
            },
        ]),
        max_score: None,
    }
}

/// Assessment `a1` holding Q1 and Q2.
pub fn two_question_assessment() -> Assessment {
    let mut assessment = Assessment::new("a1", "Lead quiz");
    assessment.questions = vec![
        choice_question("Q1", 1, "Do you have a budget?"),
        choice_question("Q2", 2, "Are you the decision maker?"),
    ];
    assessment
}
