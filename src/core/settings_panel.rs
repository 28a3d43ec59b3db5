//! Publish eligibility and publish/unpublish intents.
//!
//! The panel reads a snapshot of the assessment and never touches questions.
//! It does not update the local status either: whoever awaits the request
//! records the new status on the orchestrator once the call resolves.

use crate::domain::model::Assessment;
use crate::domain::ports::AssessmentService;
use crate::utils::error::{BuilderError, Result};
use crate::utils::validation::{assessment_issues, ValidationIssue, ValidationPolicy};

pub struct SettingsPanel<'a> {
    assessment: &'a Assessment,
    policy: ValidationPolicy,
}

impl<'a> SettingsPanel<'a> {
    pub fn new(assessment: &'a Assessment, policy: ValidationPolicy) -> Self {
        Self { assessment, policy }
    }

    pub fn can_publish(&self) -> bool {
        !self.assessment.questions.is_empty()
    }

    pub fn publish_issues(&self) -> Vec<ValidationIssue> {
        assessment_issues(self.assessment)
    }

    /// Reject a publish before any network call is made.
    pub fn check_publish(&self) -> Result<()> {
        if !self.can_publish() {
            return Err(BuilderError::PublishPreconditionError {
                reason: "the assessment has no questions".to_string(),
            });
        }

        if self.policy == ValidationPolicy::Strict {
            let issues = self.publish_issues();
            if let Some(first) = issues.first() {
                return Err(BuilderError::PublishPreconditionError {
                    reason: format!("{} validation issue(s), first: {}", issues.len(), first),
                });
            }
        }

        Ok(())
    }

    pub async fn request_publish<S>(&self, service: &S, tenant_id: &str) -> Result<()>
    where
        S: AssessmentService + ?Sized,
    {
        self.check_publish()?;
        tracing::info!(assessment_id = %self.assessment.id, "requesting publish");
        service.publish(tenant_id, &self.assessment.id).await
    }

    pub async fn request_unpublish<S>(&self, service: &S, tenant_id: &str) -> Result<()>
    where
        S: AssessmentService + ?Sized,
    {
        tracing::info!(assessment_id = %self.assessment.id, "requesting unpublish");
        service.unpublish(tenant_id, &self.assessment.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{AssessmentStatus, AssessmentUpdate, Question};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingService {
        publishes: AtomicUsize,
        unpublishes: AtomicUsize,
    }

    #[async_trait]
    impl AssessmentService for CountingService {
        async fn get(&self, _tenant_id: &str, assessment_id: &str) -> Result<Assessment> {
            Ok(Assessment::new(assessment_id, "Quiz"))
        }

        async fn update(
            &self,
            _tenant_id: &str,
            assessment_id: &str,
            _update: AssessmentUpdate,
        ) -> Result<Assessment> {
            Ok(Assessment::new(assessment_id, "Quiz"))
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

    #[test]
    fn test_can_publish_requires_questions() {
        let mut assessment = Assessment::new("a1", "Quiz");
        assert!(!SettingsPanel::new(&assessment, ValidationPolicy::Lenient).can_publish());

        assessment.questions.push(Question::new_default(1));
        assert!(SettingsPanel::new(&assessment, ValidationPolicy::Lenient).can_publish());
    }

    #[tokio::test]
    async fn test_publish_without_questions_never_calls_service() {
        let service = CountingService::default();
        let assessment = Assessment::new("a1", "Quiz");
        let panel = SettingsPanel::new(&assessment, ValidationPolicy::Lenient);

        let result = panel.request_publish(&service, "tenant-1").await;

        assert!(matches!(
            result,
            Err(BuilderError::PublishPreconditionError { .. })
        ));
        assert_eq!(service.publishes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_publish_leaves_local_status_alone() {
        let service = CountingService::default();
        let mut assessment = Assessment::new("a1", "Quiz");
        assessment.questions.push(Question::new_default(1));
        let panel = SettingsPanel::new(&assessment, ValidationPolicy::Lenient);

        panel.request_publish(&service, "tenant-1").await.unwrap();
        panel.request_unpublish(&service, "tenant-1").await.unwrap();

        assert_eq!(service.publishes.load(Ordering::SeqCst), 1);
        assert_eq!(service.unpublishes.load(Ordering::SeqCst), 1);
        assert_eq!(assessment.status, AssessmentStatus::Draft);
    }

    #[test]
    fn test_strict_policy_blocks_invalid_questions() {
        let mut assessment = Assessment::new("a1", "Quiz");
        let mut question = Question::new_default(1);
        question.text = String::new();
        assessment.questions.push(question);

        assert!(SettingsPanel::new(&assessment, ValidationPolicy::Lenient)
            .check_publish()
            .is_ok());
        assert!(SettingsPanel::new(&assessment, ValidationPolicy::Strict)
            .check_publish()
            .is_err());
    }
}
