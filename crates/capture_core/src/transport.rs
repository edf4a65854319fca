use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    multipart::Form,
    Client,
};
use shared::{domain::LeadSubmission, protocol::DeliveryRequest};
use thiserror::Error;

const DELIVERY_CONTENT_TYPE: &str = "text/plain;charset=utf-8";
/// Upper bound for one relay or delivery exchange. A stalled service must
/// not keep the form disabled.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        source: reqwest::Error,
    },
    #[error("failed to build http client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Status and raw body of a completed exchange. Interpreting the body is the
/// controller's job, since each service has its own error shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait SubmissionTransport: Send + Sync {
    async fn post_lead(
        &self,
        endpoint: &str,
        lead: &LeadSubmission,
    ) -> Result<HttpReply, TransportError>;

    async fn post_delivery(
        &self,
        endpoint: &str,
        request: &DeliveryRequest,
    ) -> Result<HttpReply, TransportError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Build)?;
        Ok(Self { http })
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }

    async fn read_reply(
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<HttpReply, TransportError> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|source| TransportError::Request {
            endpoint: endpoint.to_string(),
            source,
        })?;
        Ok(HttpReply { status, body })
    }
}

#[async_trait]
impl SubmissionTransport for HttpTransport {
    async fn post_lead(
        &self,
        endpoint: &str,
        lead: &LeadSubmission,
    ) -> Result<HttpReply, TransportError> {
        let form = lead
            .form_fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));

        let response = self
            .http
            .post(endpoint)
            .header(ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                endpoint: endpoint.to_string(),
                source,
            })?;

        Self::read_reply(endpoint, response).await
    }

    async fn post_delivery(
        &self,
        endpoint: &str,
        request: &DeliveryRequest,
    ) -> Result<HttpReply, TransportError> {
        // Apps Script rejects CORS preflights, so the JSON goes out as plain text.
        let body = serde_json::to_vec(request)?;

        let response = self
            .http
            .post(endpoint)
            .header(CONTENT_TYPE, DELIVERY_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                endpoint: endpoint.to_string(),
                source,
            })?;

        Self::read_reply(endpoint, response).await
    }
}
