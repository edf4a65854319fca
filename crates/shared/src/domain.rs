use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    Lead,
    Sample,
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lead => f.write_str("lead"),
            Self::Sample => f.write_str("sample"),
        }
    }
}

/// Input names as they appear on the page and on the relay wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    Name,
    Email,
    Phone,
    Company,
    Notes,
    Website,
}

impl FieldName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Company => "company",
            Self::Notes => "notes",
            Self::Website => "website",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw values typed into the lead form. Nothing here is trimmed or checked yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadFields {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub notes: String,
    /// Honeypot. Hidden from people, so only bots fill it in.
    #[serde(default)]
    pub website: String,
}

impl LeadFields {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    pub fn honeypot_filled(&self) -> bool {
        !self.website.trim().is_empty()
    }
}

/// Raw values typed into the sample-download form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleFields {
    pub email: String,
    #[serde(default)]
    pub website: String,
}

impl SampleFields {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            website: String::new(),
        }
    }

    pub fn honeypot_filled(&self) -> bool {
        !self.website.trim().is_empty()
    }
}

/// Where and when a submission was made. Attached to every outbound payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionContext {
    pub source_url: String,
    pub source_page: String,
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionContext {
    /// Millisecond precision with a `Z` suffix, the shape browsers produce.
    pub fn submitted_at_iso(&self) -> String {
        self.submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// A validated lead with its context, ready for the relay or the mailto fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
    pub website: String,
    pub context: SubmissionContext,
}

impl LeadSubmission {
    pub fn from_fields(fields: &LeadFields, context: SubmissionContext) -> Self {
        Self {
            name: fields.name.trim().to_string(),
            email: fields.email.trim().to_string(),
            phone: non_empty(&fields.phone),
            company: non_empty(&fields.company),
            notes: non_empty(&fields.notes),
            website: fields.website.trim().to_string(),
            context,
        }
    }

    /// Multipart field list in page order. Missing optionals go out empty,
    /// the same way a browser serialises an untouched input.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            (FieldName::Name.as_str(), self.name.clone()),
            (FieldName::Email.as_str(), self.email.clone()),
            (FieldName::Phone.as_str(), self.phone.clone().unwrap_or_default()),
            (
                FieldName::Company.as_str(),
                self.company.clone().unwrap_or_default(),
            ),
            (FieldName::Notes.as_str(), self.notes.clone().unwrap_or_default()),
            (FieldName::Website.as_str(), self.website.clone()),
            ("source_url", self.context.source_url.clone()),
            ("source_page", self.context.source_page.clone()),
            ("submitted_at", self.context.submitted_at_iso()),
        ]
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Outcome of one submit attempt, handed straight to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    Success { used_fallback: bool },
    Failure { message: String },
}

impl SubmissionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Visual tone of the form-level status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Neutral,
    Success,
    Error,
}
