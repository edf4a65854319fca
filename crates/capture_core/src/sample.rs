use std::sync::Arc;

use shared::{
    domain::{FieldName, FormKind, SampleFields, StatusKind, SubmissionResult},
    error::SubmissionError,
    protocol::{DeliveryRequest, DeliveryResponse},
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    config::SiteConfig,
    lead::SENDING_MESSAGE,
    page::PageContext,
    state::{FormEvent, FormState, FormStateCell, InFlight},
    transport::SubmissionTransport,
    validation::validate_sample,
    view::{SamplePanel, SampleView},
};

/// Shown instead of whatever a bot typed, so it learns nothing from the page.
pub const HONEYPOT_DECOY_EMAIL: &str = "bot@detected.com";
pub const DELIVERY_FAILED_MESSAGE: &str = "Failed to send email";

pub fn sample_success_message(email: &str) -> String {
    format!("Check your inbox. The sample is on its way to {email}.")
}

pub fn delivery_unconfigured_message(business_email: &str) -> String {
    format!("Email delivery is not configured. Please contact {business_email} directly.")
}

pub fn sample_network_error_message(business_email: &str) -> String {
    format!("Network error. Please try again or contact {business_email} directly.")
}

/// Drives the sample-download dialog. Independent of any lead form on the
/// same page, and never falls back to a mail draft.
pub struct SampleFormController<V: SampleView> {
    config: Arc<SiteConfig>,
    page: PageContext,
    transport: Arc<dyn SubmissionTransport>,
    view: Mutex<V>,
    state: FormStateCell,
}

impl<V: SampleView> SampleFormController<V> {
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
            state: FormStateCell::new(FormKind::Sample),
        }
    }

    pub async fn state(&self) -> FormState {
        self.state.get()
    }

    pub async fn open(&self) {
        let mut view = self.view.lock().await;
        view.reset();
        view.clear_field_error(FieldName::Email);
        view.show_panel(SamplePanel::Form);
        view.focus(FieldName::Email);
    }

    pub async fn close(&self) {
        self.view.lock().await.show_panel(SamplePanel::Hidden);
    }

    /// Back from the error panel to the form, keeping what was typed.
    pub async fn retry(&self) {
        let mut view = self.view.lock().await;
        view.show_panel(SamplePanel::Form);
        view.focus(FieldName::Email);
    }

    pub async fn on_input(&self, field: FieldName) {
        self.view.lock().await.clear_field_error(field);
    }

    /// Re-enables the submit control after a submit was dropped mid-flight.
    fn release_abandoned(&self) {
        match self.view.try_lock() {
            Ok(mut view) => view.set_loading(false),
            Err(_) => warn!(form = %FormKind::Sample, "view busy; submit control left as is"),
        }
    }

    pub async fn submit(&self, fields: &SampleFields) -> Result<SubmissionResult, SubmissionError> {
        let flight = self.state.begin(|| self.release_abandoned())?;

        if fields.honeypot_filled() {
            info!(form = %FormKind::Sample, "honeypot filled; accepting without dispatch");
            flight.advance(FormEvent::ValidationPassed);
            let result = SubmissionResult::Success {
                used_fallback: false,
            };
            self.finish(&flight, &result, HONEYPOT_DECOY_EMAIL).await;
            return Ok(result);
        }

        if let Err(error) = validate_sample(fields) {
            {
                let mut view = self.view.lock().await;
                view.show_field_error(error.field, &error.message);
                view.focus(error.field);
            }
            flight.advance(FormEvent::ValidationFailed);
            return Err(SubmissionError::Validation(vec![error]));
        }

        flight.advance(FormEvent::ValidationPassed);
        {
            let mut view = self.view.lock().await;
            view.clear_field_error(FieldName::Email);
            view.set_loading(true);
            view.set_status(StatusKind::Neutral, SENDING_MESSAGE);
        }

        let email = fields.email.trim();
        let result = match self.deliver(email).await {
            Ok(()) => SubmissionResult::Success {
                used_fallback: false,
            },
            Err(err) => SubmissionResult::Failure {
                message: err.user_message(),
            },
        };

        self.finish(&flight, &result, email).await;
        Ok(result)
    }

    async fn deliver(&self, email: &str) -> Result<(), SubmissionError> {
        let business_email = &self.config.business_email;

        if !self.config.delivery_configured() {
            warn!(form = %FormKind::Sample, "delivery endpoint not configured");
            return Err(SubmissionError::ConfigurationMissing(
                delivery_unconfigured_message(business_email),
            ));
        }

        let request = DeliveryRequest::new(email, &self.page.context_now());
        debug!(form = %FormKind::Sample, %email, "requesting sample delivery");

        let reply = self
            .transport
            .post_delivery(&self.config.delivery_endpoint, &request)
            .await
            .map_err(|err| {
                warn!(form = %FormKind::Sample, error = %err, "delivery request failed");
                SubmissionError::Network(sample_network_error_message(business_email))
            })?;

        let response: DeliveryResponse = serde_json::from_str(&reply.body).map_err(|err| {
            warn!(
                form = %FormKind::Sample,
                status = reply.status,
                error = %err,
                "delivery response was not JSON"
            );
            SubmissionError::Network(sample_network_error_message(business_email))
        })?;

        if response.success {
            info!(form = %FormKind::Sample, "sample delivery accepted");
            return Ok(());
        }

        let message = response
            .message
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| DELIVERY_FAILED_MESSAGE.to_string());
        warn!(form = %FormKind::Sample, status = reply.status, "sample delivery refused");
        Err(SubmissionError::Rejected(message))
    }

    async fn finish(
        &self,
        flight: &InFlight<'_>,
        result: &SubmissionResult,
        shown_email: &str,
    ) {
        {
            let mut view = self.view.lock().await;
            match result {
                SubmissionResult::Success { .. } => {
                    view.show_confirmed_email(shown_email);
                    view.set_status(StatusKind::Success, &sample_success_message(shown_email));
                    view.show_panel(SamplePanel::Success);
                }
                SubmissionResult::Failure { message } => {
                    view.set_status(StatusKind::Error, message);
                    view.show_panel(SamplePanel::Error);
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
#[path = "tests/sample_tests.rs"]
mod tests;
