use serde::{Deserialize, Serialize};

use crate::domain::SubmissionContext;

pub const SAMPLE_SOURCE: &str = "sample_download";

/// Error body the relay returns alongside a non-2xx status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayErrorBody {
    #[serde(default)]
    pub errors: Vec<RelayErrorItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayErrorItem {
    #[serde(default)]
    pub message: Option<String>,
}

impl RelayErrorBody {
    /// Non-blank messages joined with single spaces, or `None` when the body
    /// names none.
    pub fn joined_message(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .errors
            .iter()
            .filter_map(|item| item.message.as_deref())
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRequest {
    pub email: String,
    pub source: String,
    pub source_url: String,
    pub submitted_at: String,
}

impl DeliveryRequest {
    pub fn new(email: impl Into<String>, context: &SubmissionContext) -> Self {
        Self {
            email: email.into(),
            source: SAMPLE_SOURCE.to_string(),
            source_url: context.source_url.clone(),
            submitted_at: context.submitted_at_iso(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
