use crate::domain::model::{Assessment, Question, QuestionType, MAX_SLIDER_SCORE, MIN_SLIDER_SCORE};
use crate::utils::error::{BuilderError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(BuilderError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(BuilderError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(BuilderError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(BuilderError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| BuilderError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BuilderError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(BuilderError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Whether question problems only inform or also block publishing.
///
/// Auto-save never consults this: drafts with invalid questions are always
/// persisted so no edit is lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    #[default]
    Lenient,
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub question_id: Option<String>,
    pub message: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.question_id {
            Some(id) => write!(f, "question {}: {}", id, self.message),
            None => f.write_str(&self.message),
        }
    }
}

pub fn question_issues(question: &Question) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut report = |message: String| {
        issues.push(ValidationIssue {
            question_id: Some(question.id.clone()),
            message,
        })
    };

    if question.text.trim().is_empty() {
        report("text is empty".to_string());
    }

    match (question.question_type, &question.options) {
        (t, Some(options)) if t.is_choice() => {
            if options.len() < 2 {
                report(format!("needs at least 2 options, has {}", options.len()));
            }
            let mut seen = HashSet::new();
            for option in options {
                if option.text.trim().is_empty() {
                    report(format!("option {} has no label", option.id));
                }
                if !seen.insert(option.id.as_str()) {
                    report(format!("duplicate option id {}", option.id));
                }
            }
        }
        (t, None) if t.is_choice() => report("choice question has no options".to_string()),
        (t, Some(_)) => report(format!("{} question must not carry options", t)),
        (_, None) => {}
    }

    match (question.question_type, question.max_score) {
        (QuestionType::Slider, None) => report("slider has no max score".to_string()),
        (QuestionType::Slider, Some(score))
            if !(MIN_SLIDER_SCORE..=MAX_SLIDER_SCORE).contains(&score) =>
        {
            report(format!(
                "max score {} outside {}..={}",
                score, MIN_SLIDER_SCORE, MAX_SLIDER_SCORE
            ))
        }
        (QuestionType::Slider, Some(_)) => {}
        (t, Some(_)) => report(format!("{} question must not carry a max score", t)),
        (_, None) => {}
    }

    issues
}

pub fn assessment_issues(assessment: &Assessment) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for (index, question) in assessment.questions.iter().enumerate() {
        if !seen.insert(question.id.as_str()) {
            issues.push(ValidationIssue {
                question_id: Some(question.id.clone()),
                message: "duplicate question id".to_string(),
            });
        }
        if question.order as usize != index + 1 {
            issues.push(ValidationIssue {
                question_id: Some(question.id.clone()),
                message: format!("order {} does not match position {}", question.order, index + 1),
            });
        }
        issues.extend(question_issues(question));
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::QuestionOption;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("api.base_url", "https://example.com").is_ok());
        assert!(validate_url("api.base_url", "http://example.com").is_ok());
        assert!(validate_url("api.base_url", "").is_err());
        assert!(validate_url("api.base_url", "invalid-url").is_err());
        assert!(validate_url("api.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("autosave.debounce_ms", 3000, 1).is_ok());
        assert!(validate_positive_number("autosave.debounce_ms", 0, 1).is_err());
    }

    #[test]
    fn test_default_question_is_valid() {
        assert!(question_issues(&Question::new_default(1)).is_empty());
    }

    #[test]
    fn test_question_issues() {
        let mut question = Question::new_default(1);
        question.text = "  ".to_string();
        question.options = Some(vec![QuestionOption::new("", 0)]);

        let issues = question_issues(&question);
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(|i| i.question_id.as_deref() == Some(question.id.as_str())));
    }

    #[test]
    fn test_slider_issues() {
        let mut question = Question::new_default(1);
        question.question_type = QuestionType::Slider;
        question.options = None;
        question.max_score = Some(150);

        let issues = question_issues(&question);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("outside"));
    }

    #[test]
    fn test_assessment_issues_detects_order_mismatch() {
        let mut assessment = Assessment::new("a1", "Quiz");
        assessment.questions.push(Question::new_default(1));
        assessment.questions.push(Question::new_default(5));

        let issues = assessment_issues(&assessment);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("position 2"));
    }
}
