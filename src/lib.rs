pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::BuilderConfig;

pub use adapters::RestAssessmentService;
pub use crate::core::autosave::SaveIndicator;
pub use crate::core::builder::{AssessmentBuilder, BuilderSettings, SaveStatus};
pub use crate::core::question_editor::{QuestionEditor, QuestionPatch};
pub use utils::error::{BuilderError, Result};
