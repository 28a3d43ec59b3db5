use assessment_builder::{AssessmentBuilder, BuilderSettings, RestAssessmentService, SaveIndicator};
use anyhow::Result;
use httpmock::prelude::*;
use httpmock::Method::PATCH;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

fn stored_assessment() -> serde_json::Value {
    serde_json::json!({
        "id": "a1",
        "title": "Lead quiz",
        "description": "",
        "status": "draft",
        "questions": []
    })
}

fn fast_settings() -> BuilderSettings {
    BuilderSettings {
        debounce: Duration::from_millis(50),
        save_timeout: Some(Duration::from_secs(5)),
        ..BuilderSettings::default()
    }
}

#[tokio::test]
async fn test_burst_of_edits_sends_single_patch() -> Result<()> {
    let server = MockServer::start();
    let get_mock = server.mock(|when, then| {
        when.method(GET).path("/tenants/acme/assessments/a1");
        then.status(200).json_body(stored_assessment());
    });
    let patch_mock = server.mock(|when, then| {
        when.method(PATCH)
            .path("/tenants/acme/assessments/a1")
            .body_contains("Budget?");
        then.status(200).json_body(stored_assessment());
    });

    let service = Arc::new(RestAssessmentService::new(&server.base_url())?);
    let builder = AssessmentBuilder::load(service, "acme", "a1", fast_settings()).await?;

    let question = builder.add_question();
    let mut editor = builder
        .editor_for(&question.id)
        .ok_or_else(|| anyhow::anyhow!("added question has no editor"))?;
    builder.apply_question_edit(editor.set_text("Budget?"));
    builder.apply_question_edit(editor.add_option().unwrap());

    builder.settled().await;

    get_mock.assert();
    patch_mock.assert_hits(1);
    assert!(!builder.is_dirty());
    assert!(matches!(builder.indicator(), SaveIndicator::Saved { at: Some(_) }));
    Ok(())
}

#[tokio::test]
async fn test_server_failure_leaves_unsaved_changes() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/tenants/acme/assessments/a1");
        then.status(200).json_body(stored_assessment());
    });
    let patch_mock = server.mock(|when, then| {
        when.method(PATCH).path("/tenants/acme/assessments/a1");
        then.status(500).body("database unavailable");
    });

    let service = Arc::new(RestAssessmentService::new(&server.base_url())?);
    let builder = AssessmentBuilder::load(service, "acme", "a1", fast_settings()).await?;

    builder.rename(Some("Renamed quiz".to_string()), None);
    builder.settled().await;

    patch_mock.assert_hits(1);
    assert!(builder.is_dirty());
    assert_eq!(builder.indicator(), SaveIndicator::Unsaved);
    assert_eq!(builder.snapshot().title, "Renamed quiz");
    Ok(())
}

#[tokio::test]
async fn test_publish_over_http_after_adding_question() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/tenants/acme/assessments/a1");
        then.status(200).json_body(stored_assessment());
    });
    let publish_mock = server.mock(|when, then| {
        when.method(POST).path("/tenants/acme/assessments/a1/publish");
        then.status(200);
    });

    let service = Arc::new(RestAssessmentService::new(&server.base_url())?);
    let builder = AssessmentBuilder::load(service, "acme", "a1", fast_settings()).await?;

    assert_err!(builder.publish().await);
    publish_mock.assert_hits(0);

    builder.add_question();
    assert_ok!(builder.publish().await);
    publish_mock.assert_hits(1);
    Ok(())
}
