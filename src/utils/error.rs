use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuilderError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    ApiStatusError { status: u16, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Cannot publish: {reason}")]
    PublishPreconditionError { reason: String },

    #[error("Save did not complete within {0:?}")]
    SaveTimeoutError(Duration),

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

impl BuilderError {
    /// Failures the auto-save loop recovers from by staying dirty.
    pub fn is_transient(&self) -> bool {
        match self {
            BuilderError::ApiError(_) | BuilderError::SaveTimeoutError(_) => true,
            BuilderError::ApiStatusError { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            BuilderError::ConfigError { .. }
                | BuilderError::ConfigValidationError { .. }
                | BuilderError::InvalidConfigValueError { .. }
                | BuilderError::MissingConfigError { .. }
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            BuilderError::ApiError(_) | BuilderError::SaveTimeoutError(_) => {
                "Could not reach the assessment service".to_string()
            }
            BuilderError::ApiStatusError { status: 404, .. } => {
                "Assessment not found for this tenant".to_string()
            }
            BuilderError::ApiStatusError { status, .. } if *status == 401 || *status == 403 => {
                "The assessment service rejected the credentials".to_string()
            }
            BuilderError::PublishPreconditionError { reason } => {
                format!("The assessment cannot be published yet: {}", reason)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            BuilderError::ApiError(_) | BuilderError::SaveTimeoutError(_) => {
                "Check network connectivity and api.base_url, then retry"
            }
            BuilderError::ApiStatusError { status, .. } if *status >= 500 => {
                "The service is failing; unsaved edits are kept, retry later"
            }
            BuilderError::ApiStatusError { .. } => {
                "Verify the tenant id, assessment id and auth token"
            }
            BuilderError::PublishPreconditionError { .. } => {
                "Add at least one question (and fix validation issues in strict mode)"
            }
            BuilderError::ValidationError { .. } => "Fix the reported question fields",
            BuilderError::IoError(_) => "Check file paths and permissions",
            BuilderError::SerializationError(_) => {
                "The service returned data in an unexpected shape"
            }
            _ => "Review the configuration file and command-line flags",
        }
    }
}

pub type Result<T> = std::result::Result<T, BuilderError>;
