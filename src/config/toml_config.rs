use crate::core::builder::BuilderSettings;
use crate::core::ConfigProvider;
use crate::utils::error::{BuilderError, Result};
use crate::utils::validation::{Validate, ValidationPolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuilderConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub autosave: AutoSaveConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub request_timeout_seconds: Option<u64>,
    pub tenant_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoSaveConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// 0 disables the timeout.
    #[serde(default = "default_save_timeout_seconds")]
    pub save_timeout_seconds: u64,
    #[serde(default = "default_failure_warning_threshold")]
    pub failure_warning_threshold: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default)]
    pub policy: ValidationPolicy,
}

fn default_debounce_ms() -> u64 {
    3000
}

fn default_save_timeout_seconds() -> u64 {
    30
}

fn default_failure_warning_threshold() -> u32 {
    3
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            save_timeout_seconds: default_save_timeout_seconds(),
            failure_warning_threshold: default_failure_warning_threshold(),
        }
    }
}

impl BuilderConfig {
    /// Config pointing at `base_url` with every other setting defaulted.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                base_url: base_url.into(),
                auth_token: None,
                request_timeout_seconds: None,
                tenant_id: None,
            },
            autosave: AutoSaveConfig::default(),
            validation: ValidationConfig::default(),
        }
    }

    /// Load the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(BuilderError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parse the configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| BuilderError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR}` references with environment values.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| BuilderError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        crate::utils::validation::validate_url("api.base_url", &self.api.base_url)?;

        if let Some(timeout) = self.api.request_timeout_seconds {
            crate::utils::validation::validate_positive_number(
                "api.request_timeout_seconds",
                timeout,
                1,
            )?;
        }

        if let Some(tenant_id) = &self.api.tenant_id {
            crate::utils::validation::validate_non_empty_string("api.tenant_id", tenant_id)?;
        }

        crate::utils::validation::validate_range(
            "autosave.debounce_ms",
            self.autosave.debounce_ms,
            1,
            600_000,
        )?;
        crate::utils::validation::validate_positive_number(
            "autosave.failure_warning_threshold",
            u64::from(self.autosave.failure_warning_threshold),
            1,
        )?;

        Ok(())
    }

    pub fn builder_settings(&self) -> BuilderSettings {
        BuilderSettings {
            debounce: Duration::from_millis(self.autosave.debounce_ms),
            save_timeout: match self.autosave.save_timeout_seconds {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            failure_warning_threshold: self.autosave.failure_warning_threshold,
            validation_policy: self.validation.policy,
        }
    }
}

impl ConfigProvider for BuilderConfig {
    fn api_base_url(&self) -> &str {
        &self.api.base_url
    }

    fn auth_token(&self) -> Option<&str> {
        // An unset ${VAR} survives substitution verbatim; never send it.
        self.api
            .auth_token
            .as_deref()
            .filter(|token| !token.is_empty() && !token.starts_with("${"))
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.api.request_timeout_seconds.unwrap_or(30)
    }
}

impl Validate for BuilderConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
