use assessment_builder::core::Assessment;
use assessment_builder::utils::validation::{Validate, ValidationIssue};
use assessment_builder::utils::{error::BuilderError, logger};
use assessment_builder::{
    AssessmentBuilder, CliConfig, RestAssessmentService, Result, SaveIndicator,
};
use assessment_builder::config::Command;
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting assessment-builder CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    match run(&cli).await {
        Ok(true) => {}
        Ok(false) => {
            eprintln!("⚠️  Changes are still unsaved; the assessment service did not accept them");
            std::process::exit(2);
        }
        Err(e) => {
            tracing::error!("❌ Command failed: {}", e);
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(exit_code(&e));
        }
    }
}

fn exit_code(error: &BuilderError) -> i32 {
    if error.is_config_error() {
        3
    } else if error.is_transient() {
        2
    } else {
        1
    }
}

/// Runs one command; `Ok(false)` means edits were made but not persisted.
async fn run(cli: &CliConfig) -> Result<bool> {
    let config = cli.resolve()?;
    config.validate()?;
    let tenant_id = cli.tenant_id(&config)?;

    let service = Arc::new(RestAssessmentService::from_config(&config)?);
    let builder =
        AssessmentBuilder::load(service, tenant_id, &cli.assessment, config.builder_settings())
            .await?;

    match &cli.command {
        Command::Show => {
            print_assessment(&builder.snapshot(), &builder.publish_issues());
        }
        Command::AddQuestion {
            text,
            question_type,
            optional,
        } => {
            let question = builder.add_question();
            let mut editor = assessment_builder::QuestionEditor::new(question);
            if let Some(question_type) = question_type {
                builder.apply_question_edit(editor.change_type(*question_type));
            }
            if let Some(text) = text {
                builder.apply_question_edit(editor.set_text(text.clone()));
            }
            if *optional {
                builder.apply_question_edit(editor.set_required(false));
            }
            println!("➕ Added question {} at position {}", editor.key(), editor.question().order);
        }
        Command::EditQuestion {
            id,
            text,
            question_type,
            required,
            max_score,
        } => {
            let mut editor = builder.editor_for(id).ok_or_else(|| BuilderError::ValidationError {
                message: format!("question '{}' does not exist", id),
            })?;
            if let Some(question_type) = question_type {
                builder.apply_question_edit(editor.change_type(*question_type));
            }
            if let Some(text) = text {
                builder.apply_question_edit(editor.set_text(text.clone()));
            }
            if let Some(required) = required {
                builder.apply_question_edit(editor.set_required(*required));
            }
            if let Some(max_score) = max_score {
                match editor.set_max_score(*max_score) {
                    Some(question) => {
                        builder.apply_question_edit(question);
                    }
                    None => tracing::warn!("--max-score only applies to slider questions"),
                }
            }
        }
        Command::MoveQuestion { id, to } => {
            if *to == 0 {
                return Err(BuilderError::ValidationError {
                    message: "positions start at 1".to_string(),
                });
            }
            if !builder.reorder_question(id, to - 1) {
                println!("Question {} left in place", id);
            }
        }
        Command::DeleteQuestion { id } => {
            if !builder.delete_question(id) {
                println!("Question {} was not found", id);
            }
        }
        Command::Rename { title, description } => {
            builder.rename(title.clone(), description.clone());
        }
        Command::Publish => {
            builder.publish().await?;
            println!("✅ Assessment {} published", cli.assessment);
        }
        Command::Unpublish => {
            builder.unpublish().await?;
            println!("✅ Assessment {} unpublished", cli.assessment);
        }
    }

    builder.settled().await;
    let indicator = builder.indicator();
    if matches!(indicator, SaveIndicator::Saved { at: Some(_) }) {
        println!("💾 {}", indicator);
    }
    Ok(!builder.is_dirty())
}

fn print_assessment(assessment: &Assessment, issues: &[ValidationIssue]) {
    println!("📋 {} [{:?}]", assessment.title, assessment.status);
    if !assessment.description.is_empty() {
        println!("   {}", assessment.description);
    }

    for question in &assessment.questions {
        let required = if question.required { "*" } else { "" };
        println!(
            "{:>3}. {}{} ({}) id={}",
            question.order, question.text, required, question.question_type, question.id
        );
        if let Some(options) = &question.options {
            for option in options {
                println!("       - {} [{}]", option.text, option.score);
            }
        }
        if let Some(max_score) = question.max_score {
            println!("       max score {}", max_score);
        }
    }

    if issues.is_empty() {
        println!("✅ No validation issues");
    } else {
        println!("⚠️  {} validation issue(s):", issues.len());
        for issue in issues {
            println!("   - {}", issue);
        }
    }
}
