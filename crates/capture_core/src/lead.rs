use std::sync::Arc;

use shared::{
    domain::{FieldName, FormKind, LeadFields, LeadSubmission, StatusKind, SubmissionResult},
    error::{SubmissionError, ValidationError},
    protocol::RelayErrorBody,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    config::SiteConfig,
    mailto::MailDraft,
    page::PageContext,
    state::{FormEvent, FormState, FormStateCell, InFlight},
    transport::SubmissionTransport,
    validation::validate_lead,
    view::FormView,
};

pub const SENDING_MESSAGE: &str = "Sending…";
pub const LEAD_SUCCESS_MESSAGE: &str =
    "Thanks! We received your message and will follow up shortly.";
pub const LEAD_FALLBACK_SUCCESS_MESSAGE: &str = "Thanks — your email draft is ready to send. \
     Once you set up Formspree, messages will send automatically.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

const VALIDATED_FIELDS: [FieldName; 3] = [FieldName::Name, FieldName::Email, FieldName::Phone];

pub fn lead_network_error_message(business_email: &str) -> String {
    format!("Network error. Please try again, or email {business_email}.")
}

/// Drives one lead-capture form: validation, relay dispatch or the mailto
/// fallback, and the status line.
pub struct LeadFormController<V: FormView> {
    config: Arc<SiteConfig>,
    page: PageContext,
    transport: Arc<dyn SubmissionTransport>,
    view: Mutex<V>,
    state: FormStateCell,
}

impl<V: FormView> LeadFormController<V> {
    pub fn new(
        config: Arc<SiteConfig>,
        page: PageContext,
        transport: Arc<dyn SubmissionTransport>,
        view: V,
    ) -> Self {
        Self {
            config,
            page,
            transport,
            view: Mutex::new(view),
            state: FormStateCell::new(FormKind::Lead),
        }
    }

    pub async fn state(&self) -> FormState {
        self.state.get()
    }

    /// Typing into a field clears its error.
    pub async fn on_input(&self, field: FieldName) {
        self.view.lock().await.clear_field_error(field);
    }

    /// Re-enables the submit control after a submit was dropped mid-flight.
    fn release_abandoned(&self) {
        match self.view.try_lock() {
            Ok(mut view) => view.set_loading(false),
            Err(_) => warn!(form = %FormKind::Lead, "view busy; submit control left as is"),
        }
    }

    /// Runs one submit. `Err` means nothing was dispatched: either a field
    /// failed validation or a previous submit is still in flight. Dispatch
    /// failures come back as `Ok(SubmissionResult::Failure)` once rendered.
    pub async fn submit(&self, fields: &LeadFields) -> Result<SubmissionResult, SubmissionError> {
        let flight = self.state.begin(|| self.release_abandoned())?;

        if fields.honeypot_filled() {
            info!(form = %FormKind::Lead, "honeypot filled; accepting without dispatch");
            flight.advance(FormEvent::ValidationPassed);
            let result = SubmissionResult::Success {
                used_fallback: false,
            };
            self.finish(&flight, &result).await;
            return Ok(result);
        }

        {
            let mut view = self.view.lock().await;
            for field in VALIDATED_FIELDS {
                view.clear_field_error(field);
            }
        }

        if let Err(errors) = validate_lead(fields) {
            self.render_invalid(&errors).await;
            flight.advance(FormEvent::ValidationFailed);
            return Err(SubmissionError::Validation(errors));
        }

        flight.advance(FormEvent::ValidationPassed);
        {
            let mut view = self.view.lock().await;
            view.set_loading(true);
            view.set_status(StatusKind::Neutral, SENDING_MESSAGE);
        }

        let lead = LeadSubmission::from_fields(fields, self.page.context_now());
        let result = match self.dispatch(&lead).await {
            Ok(used_fallback) => SubmissionResult::Success { used_fallback },
            Err(err) => SubmissionResult::Failure {
                message: err.user_message(),
            },
        };

        self.finish(&flight, &result).await;
        Ok(result)
    }

    /// `Ok(true)` when the mailto fallback was used instead of the relay.
    async fn dispatch(&self, lead: &LeadSubmission) -> Result<bool, SubmissionError> {
        if !self.config.relay_configured() {
            info!(form = %FormKind::Lead, "relay endpoint not configured; opening mail draft");
            let draft = MailDraft::for_lead(lead, self.config.business_email.as_str());
            self.view.lock().await.open_mailto(&draft.href());
            return Ok(true);
        }

        debug!(form = %FormKind::Lead, email = %lead.email, "posting lead to relay");
        let reply = self
            .transport
            .post_lead(&self.config.relay_endpoint, lead)
            .await
            .map_err(|err| {
                warn!(form = %FormKind::Lead, error = %err, "relay request failed");
                SubmissionError::Network(lead_network_error_message(&self.config.business_email))
            })?;

        if reply.is_success() {
            info!(form = %FormKind::Lead, status = reply.status, "lead accepted by relay");
            return Ok(false);
        }

        warn!(form = %FormKind::Lead, status = reply.status, "lead rejected by relay");
        let message = serde_json::from_str::<RelayErrorBody>(&reply.body)
            .ok()
            .and_then(|body| body.joined_message())
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
        Err(SubmissionError::Rejected(message))
    }

    async fn render_invalid(&self, errors: &[ValidationError]) {
        let mut view = self.view.lock().await;
        for error in errors {
            view.show_field_error(error.field, &error.message);
        }
        if let Some(first) = errors.first() {
            view.focus(first.field);
        }
        view.set_status(
            StatusKind::Error,
            &SubmissionError::Validation(errors.to_vec()).user_message(),
        );
    }

    async fn finish(&self, flight: &InFlight<'_>, result: &SubmissionResult) {
        {
            let mut view = self.view.lock().await;
            match result {
                SubmissionResult::Success { used_fallback } => {
                    view.reset();
                    let copy = if *used_fallback {
                        LEAD_FALLBACK_SUCCESS_MESSAGE
                    } else {
                        LEAD_SUCCESS_MESSAGE
                    };
                    view.set_status(StatusKind::Success, copy);
                }
                SubmissionResult::Failure { message } => {
                    view.set_status(StatusKind::Error, message);
                }
            }
            view.set_loading(false);
        }

        flight.advance(FormEvent::Resolved {
            success: result.is_success(),
        });
    }
}

#[cfg(test)]
#[path = "tests/lead_tests.rs"]
mod tests;
