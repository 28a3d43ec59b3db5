//! The assessment builder session.
//!
//! `AssessmentBuilder` owns the working copy of one assessment. The list
//! controller, the question editor and the settings panel only ever see
//! borrowed snapshots and hand back proposals; the builder applies them,
//! marks the session dirty and wakes the auto-save driver task.
//!
//! The driver sleeps until the debounce deadline, sends the full working copy
//! through the [`AssessmentService`], and reports back into the [`AutoSave`]
//! machine. Failures are logged and swallowed: the session simply stays dirty
//! until a later save goes through. Dropping the builder cancels a pending
//! timer but lets a save that is already in flight run to completion.

use crate::core::autosave::{AutoSave, SaveIndicator, DEFAULT_DEBOUNCE};
use crate::core::question_editor::QuestionEditor;
use crate::core::question_list::{ListChange, QuestionListController, StaleOperation};
use crate::core::settings_panel::SettingsPanel;
use crate::domain::model::{renumber, Assessment, AssessmentStatus, Question};
use crate::domain::ports::AssessmentService;
use crate::utils::error::{BuilderError, Result};
use crate::utils::validation::{ValidationIssue, ValidationPolicy};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct BuilderSettings {
    pub debounce: Duration,
    /// Upper bound on a single save request; `None` waits indefinitely.
    pub save_timeout: Option<Duration>,
    /// Consecutive failures after which save errors are logged at error level.
    pub failure_warning_threshold: u32,
    pub validation_policy: ValidationPolicy,
}

impl Default for BuilderSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            save_timeout: Some(Duration::from_secs(30)),
            failure_warning_threshold: 3,
            validation_policy: ValidationPolicy::Lenient,
        }
    }
}

/// Observable auto-save progress.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveStatus {
    pub indicator: SaveIndicator,
    pub settled: bool,
    pub consecutive_failures: u32,
}

struct Session {
    assessment: Assessment,
    selected: Option<String>,
    autosave: AutoSave,
}

impl Session {
    fn status(&self) -> SaveStatus {
        SaveStatus {
            indicator: self.autosave.indicator(),
            settled: self.autosave.is_settled(),
            consecutive_failures: self.autosave.consecutive_failures(),
        }
    }
}

struct Shared {
    session: Mutex<Session>,
    wake: Notify,
    closed: AtomicBool,
    status: watch::Sender<SaveStatus>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, session: &Session) {
        self.status.send_replace(session.status());
    }
}

pub struct AssessmentBuilder<S: AssessmentService + ?Sized + 'static> {
    shared: Arc<Shared>,
    service: Arc<S>,
    tenant_id: String,
    settings: BuilderSettings,
}

impl<S: AssessmentService + ?Sized + 'static> AssessmentBuilder<S> {
    /// Fetch the assessment and open a builder session on it.
    pub async fn load(
        service: Arc<S>,
        tenant_id: impl Into<String>,
        assessment_id: &str,
        settings: BuilderSettings,
    ) -> Result<Self> {
        let tenant_id = tenant_id.into();
        let assessment = service.get(&tenant_id, assessment_id).await?;
        tracing::info!(
            assessment_id,
            questions = assessment.questions.len(),
            "loaded assessment into builder"
        );
        Ok(Self::from_assessment(service, tenant_id, assessment, settings))
    }

    /// Open a session on an already fetched assessment.
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_assessment(
        service: Arc<S>,
        tenant_id: impl Into<String>,
        mut assessment: Assessment,
        settings: BuilderSettings,
    ) -> Self {
        let tenant_id = tenant_id.into();
        renumber(&mut assessment.questions);
        let session = Session {
            selected: assessment.questions.first().map(|q| q.id.clone()),
            assessment,
            autosave: AutoSave::new(settings.debounce),
        };
        let (status, _) = watch::channel(session.status());
        let shared = Arc::new(Shared {
            session: Mutex::new(session),
            wake: Notify::new(),
            closed: AtomicBool::new(false),
            status,
        });

        tokio::spawn(run_autosave(
            Arc::clone(&shared),
            Arc::clone(&service),
            tenant_id.clone(),
            settings.clone(),
        ));

        Self {
            shared,
            service,
            tenant_id,
            settings,
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn settings(&self) -> &BuilderSettings {
        &self.settings
    }

    pub fn snapshot(&self) -> Assessment {
        self.shared.lock().assessment.clone()
    }

    pub fn questions(&self) -> Vec<Question> {
        self.shared.lock().assessment.questions.clone()
    }

    pub fn selected_question_id(&self) -> Option<String> {
        self.shared.lock().selected.clone()
    }

    pub fn selected_question(&self) -> Option<Question> {
        let session = self.shared.lock();
        let selected = session.selected.as_deref()?;
        session
            .assessment
            .questions
            .iter()
            .find(|q| q.id == selected)
            .cloned()
    }

    pub fn is_dirty(&self) -> bool {
        self.shared.lock().autosave.is_dirty()
    }

    pub fn is_saving(&self) -> bool {
        self.shared.lock().autosave.is_saving()
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.shared.lock().autosave.last_saved_at()
    }

    pub fn indicator(&self) -> SaveIndicator {
        self.shared.lock().autosave.indicator()
    }

    pub fn save_status(&self) -> SaveStatus {
        self.shared.lock().status()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.shared.status.subscribe()
    }

    /// Wait until no save is pending or in flight.
    ///
    /// Does not force a save: an armed debounce timer still runs its course.
    pub async fn settled(&self) {
        let mut status = self.shared.status.subscribe();
        // The sender lives as long as `self`, so the wait cannot fail.
        let _ = status.wait_for(|s| s.settled).await;
    }

    fn apply_list_change(&self, result: std::result::Result<ListChange, StaleOperation>) -> bool {
        let change = match result {
            Ok(change) => change,
            Err(stale) => {
                tracing::debug!(%stale, "ignored stale question list operation");
                return false;
            }
        };

        let edited = {
            let mut session = self.shared.lock();
            session.selected = change.selection;
            let edited = match change.questions {
                Some(questions) => {
                    session.assessment.questions = questions;
                    session.autosave.record_edit(Instant::now());
                    true
                }
                None => false,
            };
            self.shared.publish(&session);
            edited
        };

        if edited {
            self.shared.wake.notify_one();
        }
        true
    }

    /// Returns `false` when the id is unknown.
    pub fn select_question(&self, question_id: &str) -> bool {
        let result = {
            let session = self.shared.lock();
            QuestionListController::new(&session.assessment.questions, session.selected.as_deref())
                .select(question_id)
        };
        self.apply_list_change(result)
    }

    pub fn add_question(&self) -> Question {
        let (question, change) = {
            let session = self.shared.lock();
            QuestionListController::new(&session.assessment.questions, session.selected.as_deref())
                .add()
        };
        self.apply_list_change(Ok(change));
        tracing::debug!(question_id = %question.id, order = question.order, "added question");
        question
    }

    pub fn delete_question(&self, question_id: &str) -> bool {
        let result = {
            let session = self.shared.lock();
            QuestionListController::new(&session.assessment.questions, session.selected.as_deref())
                .delete(question_id)
        };
        self.apply_list_change(result)
    }

    pub fn reorder_question(&self, dragged_id: &str, target_index: usize) -> bool {
        let result = {
            let session = self.shared.lock();
            QuestionListController::new(&session.assessment.questions, session.selected.as_deref())
                .reorder(dragged_id, target_index)
        };
        self.apply_list_change(result)
    }

    /// A fresh editor on the selected question.
    pub fn editor(&self) -> Option<QuestionEditor> {
        self.selected_question().map(QuestionEditor::new)
    }

    pub fn editor_for(&self, question_id: &str) -> Option<QuestionEditor> {
        let session = self.shared.lock();
        session
            .assessment
            .questions
            .iter()
            .find(|q| q.id == question_id)
            .cloned()
            .map(QuestionEditor::new)
    }

    /// Replace a question with an editor emission, matched by id.
    ///
    /// The question keeps its current position. Returns `false` when the
    /// question was deleted in the meantime.
    pub fn apply_question_edit(&self, mut question: Question) -> bool {
        {
            let mut session = self.shared.lock();
            let Some(slot) = session
                .assessment
                .questions
                .iter_mut()
                .find(|q| q.id == question.id)
            else {
                tracing::debug!(question_id = %question.id, "ignored edit for removed question");
                return false;
            };

            question.order = slot.order;
            if *slot == question {
                return true;
            }
            *slot = question;
            session.autosave.record_edit(Instant::now());
            self.shared.publish(&session);
        }

        self.shared.wake.notify_one();
        true
    }

    /// Edit the display metadata.
    pub fn rename(&self, title: Option<String>, description: Option<String>) {
        {
            let mut session = self.shared.lock();
            let mut changed = false;
            if let Some(title) = title {
                changed |= session.assessment.title != title;
                session.assessment.title = title;
            }
            if let Some(description) = description {
                changed |= session.assessment.description != description;
                session.assessment.description = description;
            }
            if !changed {
                return;
            }
            session.autosave.record_edit(Instant::now());
            self.shared.publish(&session);
        }

        self.shared.wake.notify_one();
    }

    /// Record a status the service has confirmed. Not an edit.
    pub fn set_status(&self, status: AssessmentStatus) {
        self.shared.lock().assessment.status = status;
    }

    pub fn can_publish(&self) -> bool {
        let session = self.shared.lock();
        SettingsPanel::new(&session.assessment, self.settings.validation_policy).can_publish()
    }

    pub fn publish_issues(&self) -> Vec<ValidationIssue> {
        let session = self.shared.lock();
        SettingsPanel::new(&session.assessment, self.settings.validation_policy).publish_issues()
    }

    /// Publish through the service and record the new status once confirmed.
    pub async fn publish(&self) -> Result<()> {
        let assessment = self.snapshot();
        SettingsPanel::new(&assessment, self.settings.validation_policy)
            .request_publish(self.service.as_ref(), &self.tenant_id)
            .await?;
        self.set_status(AssessmentStatus::Published);
        Ok(())
    }

    pub async fn unpublish(&self) -> Result<()> {
        let assessment = self.snapshot();
        SettingsPanel::new(&assessment, self.settings.validation_policy)
            .request_unpublish(self.service.as_ref(), &self.tenant_id)
            .await?;
        self.set_status(AssessmentStatus::Unpublished);
        Ok(())
    }
}

impl<S: AssessmentService + ?Sized + 'static> Drop for AssessmentBuilder<S> {
    fn drop(&mut self) {
        self.shared.closed.store(true, Ordering::SeqCst);
        self.shared.wake.notify_one();
        let session = self.shared.lock();
        if session.autosave.is_dirty() {
            tracing::warn!(
                assessment_id = %session.assessment.id,
                "builder closed with unsaved changes"
            );
        }
    }
}

async fn run_autosave<S: AssessmentService + ?Sized>(
    shared: Arc<Shared>,
    service: Arc<S>,
    tenant_id: String,
    settings: BuilderSettings,
) {
    loop {
        // Only checked between saves, so an issued request always completes.
        if shared.closed.load(Ordering::SeqCst) {
            tracing::debug!("auto-save driver stopped");
            return;
        }
        let deadline = shared.lock().autosave.deadline();
        match deadline {
            None => {
                shared.wake.notified().await;
                continue;
            }
            Some(deadline) => {
                tokio::select! {
                    _ = tokio::time::sleep_until(deadline) => {}
                    _ = shared.wake.notified() => continue,
                }
            }
        }
        if shared.closed.load(Ordering::SeqCst) {
            continue;
        }

        let fired = {
            let mut session = shared.lock();
            let fired = session.autosave.fire(Instant::now()).map(|ticket| {
                (
                    ticket,
                    session.assessment.id.clone(),
                    session.assessment.autosave_payload(),
                )
            });
            shared.publish(&session);
            fired
        };
        let Some((ticket, assessment_id, payload)) = fired else {
            continue;
        };

        tracing::debug!(
            %assessment_id,
            questions = payload.questions.as_ref().map(Vec::len).unwrap_or(0),
            "auto-save started"
        );

        let request = service.update(&tenant_id, &assessment_id, payload);
        let outcome = match settings.save_timeout {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .unwrap_or(Err(BuilderError::SaveTimeoutError(limit))),
            None => request.await,
        };

        {
            let mut session = shared.lock();
            session
                .autosave
                .complete(ticket, outcome.is_ok(), Utc::now());

            match outcome {
                Ok(_) => {
                    tracing::info!(%assessment_id, dirty = session.autosave.is_dirty(), "auto-save succeeded");
                }
                Err(e) => {
                    let failures = session.autosave.consecutive_failures();
                    if failures >= settings.failure_warning_threshold {
                        tracing::error!(
                            %assessment_id,
                            failures,
                            "auto-save keeps failing: {} ({})",
                            e,
                            e.recovery_suggestion()
                        );
                    } else {
                        tracing::warn!(%assessment_id, failures, "auto-save failed: {}", e);
                    }
                }
            }
            shared.publish(&session);
        }
    }
}
