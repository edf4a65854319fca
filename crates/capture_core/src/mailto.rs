//! `mailto:` drafts for the lead form when no relay is set up yet.

use shared::domain::LeadSubmission;
use url::form_urlencoded;

pub const LEAD_MAIL_SUBJECT: &str = "New lead — FinSync Solutions";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailDraft {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl MailDraft {
    pub fn for_lead(lead: &LeadSubmission, to: impl Into<String>) -> Self {
        let mut lines = vec![
            format!("Name: {}", lead.name),
            format!("Email: {}", lead.email),
        ];
        if let Some(phone) = &lead.phone {
            lines.push(format!("Phone: {phone}"));
        }
        if let Some(company) = &lead.company {
            lines.push(format!("Company: {company}"));
        }
        lines.push("Notes:".to_string());
        lines.push(lead.notes.clone().unwrap_or_else(|| "(none)".to_string()));
        lines.push(format!("Page: {}", lead.context.source_url));

        Self {
            to: to.into(),
            subject: LEAD_MAIL_SUBJECT.to_string(),
            body: lines.join("\n"),
        }
    }

    pub fn href(&self) -> String {
        format!(
            "mailto:{}?subject={}&body={}",
            self.to,
            encode_component(&self.subject),
            encode_component(&self.body)
        )
    }
}

/// Percent-encodes for a mailto header value. Mail clients expect `%20`,
/// not the `+` that form encoding produces; a literal `+` is already `%2B`.
fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
