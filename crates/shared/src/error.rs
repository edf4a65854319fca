use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::FieldName;

/// One field that failed its rule, with the copy shown next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: FieldName,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("{} field(s) failed validation", .0.len())]
    Validation(Vec<ValidationError>),
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    Network(String),
    #[error("{0}")]
    ConfigurationMissing(String),
    #[error("a submission is already in flight for this form")]
    Busy,
}

impl SubmissionError {
    /// Text rendered in the form-level status line.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(_) => "Please fix the highlighted fields and try again.".to_string(),
            other => other.to_string(),
        }
    }
}
