use crate::config::toml_config::BuilderConfig;
use crate::domain::model::QuestionType;
use crate::utils::error::{BuilderError, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "assessment-builder")]
#[command(about = "Edit and publish tenant assessments through the builder auto-save loop")]
pub struct CliConfig {
    #[arg(long, short, default_value = "assessment-builder.toml")]
    pub config: PathBuf,

    #[arg(long, help = "Override api.base_url from the config file")]
    pub api_base_url: Option<String>,

    #[arg(long, help = "Override api.tenant_id from the config file")]
    pub tenant: Option<String>,

    #[arg(long, short)]
    pub assessment: String,

    #[arg(long, help = "Override autosave.debounce_ms")]
    pub debounce_ms: Option<u64>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit JSON logs")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the assessment and its validation issues
    Show,
    /// Append a question
    AddQuestion {
        #[arg(long)]
        text: Option<String>,
        #[arg(long = "type", value_parser = parse_question_type)]
        question_type: Option<QuestionType>,
        #[arg(long)]
        optional: bool,
    },
    /// Edit an existing question
    EditQuestion {
        #[arg(long)]
        id: String,
        #[arg(long)]
        text: Option<String>,
        #[arg(long = "type", value_parser = parse_question_type)]
        question_type: Option<QuestionType>,
        #[arg(long)]
        required: Option<bool>,
        #[arg(long)]
        max_score: Option<u32>,
    },
    /// Move a question to a 1-based position
    MoveQuestion {
        #[arg(long)]
        id: String,
        #[arg(long)]
        to: usize,
    },
    /// Delete a question
    DeleteQuestion {
        #[arg(long)]
        id: String,
    },
    /// Change the title or description
    Rename {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Publish,
    Unpublish,
}

fn parse_question_type(value: &str) -> std::result::Result<QuestionType, String> {
    value.parse()
}

impl CliConfig {
    /// Load the TOML file and apply command-line overrides.
    pub fn resolve(&self) -> Result<BuilderConfig> {
        let mut config = if self.config.exists() {
            BuilderConfig::from_file(&self.config)?
        } else {
            let base_url = self.api_base_url.clone().ok_or_else(|| BuilderError::MissingConfigError {
                field: format!("api.base_url (no config file at {})", self.config.display()),
            })?;
            BuilderConfig::with_base_url(base_url)
        };

        if let Some(base_url) = &self.api_base_url {
            config.api.base_url = base_url.clone();
        }
        if let Some(tenant) = &self.tenant {
            config.api.tenant_id = Some(tenant.clone());
        }
        if let Some(debounce_ms) = self.debounce_ms {
            config.autosave.debounce_ms = debounce_ms;
        }

        Ok(config)
    }

    pub fn tenant_id(&self, config: &BuilderConfig) -> Result<String> {
        crate::utils::validation::validate_required_field("api.tenant_id", &config.api.tenant_id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_question() {
        let cli = CliConfig::try_parse_from([
            "assessment-builder",
            "--assessment",
            "a1",
            "--tenant",
            "acme",
            "add-question",
            "--text",
            "Team size?",
            "--type",
            "slider",
        ])
        .unwrap();

        match cli.command {
            Command::AddQuestion {
                text,
                question_type,
                optional,
            } => {
                assert_eq!(text.as_deref(), Some("Team size?"));
                assert_eq!(question_type, Some(QuestionType::Slider));
                assert!(!optional);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_resolve_without_file_uses_flags() {
        let cli = CliConfig::try_parse_from([
            "assessment-builder",
            "--config",
            "/nonexistent/assessment-builder.toml",
            "--api-base-url",
            "https://api.example.com",
            "--tenant",
            "acme",
            "--debounce-ms",
            "500",
            "--assessment",
            "a1",
            "show",
        ])
        .unwrap();

        let config = cli.resolve().unwrap();
        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.autosave.debounce_ms, 500);
        assert_eq!(cli.tenant_id(&config).unwrap(), "acme");
    }

    #[test]
    fn test_missing_tenant_is_reported() {
        let cli = CliConfig::try_parse_from([
            "assessment-builder",
            "--config",
            "/nonexistent/assessment-builder.toml",
            "--api-base-url",
            "https://api.example.com",
            "--assessment",
            "a1",
            "publish",
        ])
        .unwrap();

        let config = cli.resolve().unwrap();
        assert!(matches!(
            cli.tenant_id(&config),
            Err(BuilderError::MissingConfigError { .. })
        ));
    }
}
