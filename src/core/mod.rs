pub mod autosave;
pub mod builder;
pub mod question_editor;
pub mod question_list;
pub mod settings_panel;

pub use crate::domain::model::{
    Assessment, AssessmentStatus, AssessmentUpdate, Question, QuestionOption, QuestionType,
};
pub use crate::domain::ports::{AssessmentService, ConfigProvider};
pub use crate::utils::error::Result;
