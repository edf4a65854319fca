//! Test doubles shared by the controller tests.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex as StdMutex,
};

use async_trait::async_trait;
use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Router,
};
use shared::{
    domain::{FieldName, LeadSubmission, StatusKind},
    protocol::DeliveryRequest,
};
use tokio::{net::TcpListener, sync::Mutex};

use crate::{
    config::SiteConfig,
    page::PageContext,
    transport::{HttpReply, HttpTransport, SubmissionTransport, TransportError},
    view::{FormView, SamplePanel, SampleView},
};

pub const TEST_PAGE_URL: &str = "https://finsyncsolutions.org/contact/";
pub const TEST_BUSINESS_EMAIL: &str = "owner@finsync.test";
pub const DELIVERY_PATH: &str = "/script.google.com/macros/s/test/exec";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCall {
    FieldError(FieldName, String),
    ClearFieldError(FieldName),
    Focus(FieldName),
    Status(StatusKind, String),
    Loading(bool),
    Reset,
    Mailto(String),
    Panel(SamplePanel),
    ConfirmedEmail(String),
}

#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    calls: Arc<StdMutex<Vec<ViewCall>>>,
}

impl RecordingView {
    fn record(&self, call: ViewCall) {
        self.calls.lock().expect("view lock").push(call);
    }

    pub fn calls(&self) -> Vec<ViewCall> {
        self.calls.lock().expect("view lock").clone()
    }

    pub fn last_status(&self) -> Option<(StatusKind, String)> {
        self.calls().into_iter().rev().find_map(|call| match call {
            ViewCall::Status(kind, message) => Some((kind, message)),
            _ => None,
        })
    }

    pub fn mailto_links(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ViewCall::Mailto(href) => Some(href),
                _ => None,
            })
            .collect()
    }

    pub fn field_errors(&self) -> Vec<FieldName> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ViewCall::FieldError(field, _) => Some(field),
                _ => None,
            })
            .collect()
    }

    pub fn loading_toggles(&self) -> Vec<bool> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ViewCall::Loading(loading) => Some(loading),
                _ => None,
            })
            .collect()
    }
}

impl FormView for RecordingView {
    fn show_field_error(&mut self, field: FieldName, message: &str) {
        self.record(ViewCall::FieldError(field, message.to_string()));
    }

    fn clear_field_error(&mut self, field: FieldName) {
        self.record(ViewCall::ClearFieldError(field));
    }

    fn focus(&mut self, field: FieldName) {
        self.record(ViewCall::Focus(field));
    }

    fn set_status(&mut self, kind: StatusKind, message: &str) {
        self.record(ViewCall::Status(kind, message.to_string()));
    }

    fn set_loading(&mut self, loading: bool) {
        self.record(ViewCall::Loading(loading));
    }

    fn reset(&mut self) {
        self.record(ViewCall::Reset);
    }

    fn open_mailto(&mut self, href: &str) {
        self.record(ViewCall::Mailto(href.to_string()));
    }
}

impl SampleView for RecordingView {
    fn show_panel(&mut self, panel: SamplePanel) {
        self.record(ViewCall::Panel(panel));
    }

    fn show_confirmed_email(&mut self, email: &str) {
        self.record(ViewCall::ConfirmedEmail(email.to_string()));
    }
}

/// Answers every call with the same reply and counts how often it was hit.
pub struct ScriptedTransport {
    reply: HttpReply,
    lead_calls: AtomicUsize,
    delivery_calls: AtomicUsize,
    leads: StdMutex<Vec<LeadSubmission>>,
}

impl ScriptedTransport {
    pub fn replying(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: HttpReply {
                status,
                body: body.to_string(),
            },
            lead_calls: AtomicUsize::new(0),
            delivery_calls: AtomicUsize::new(0),
            leads: StdMutex::new(Vec::new()),
        })
    }

    pub fn lead_calls(&self) -> usize {
        self.lead_calls.load(Ordering::SeqCst)
    }

    pub fn delivery_calls(&self) -> usize {
        self.delivery_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.lead_calls() + self.delivery_calls()
    }

    pub fn leads(&self) -> Vec<LeadSubmission> {
        self.leads.lock().expect("leads lock").clone()
    }
}

#[async_trait]
impl SubmissionTransport for ScriptedTransport {
    async fn post_lead(
        &self,
        _endpoint: &str,
        lead: &LeadSubmission,
    ) -> Result<HttpReply, TransportError> {
        self.lead_calls.fetch_add(1, Ordering::SeqCst);
        self.leads.lock().expect("leads lock").push(lead.clone());
        Ok(self.reply.clone())
    }

    async fn post_delivery(
        &self,
        _endpoint: &str,
        _request: &DeliveryRequest,
    ) -> Result<HttpReply, TransportError> {
        self.delivery_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

pub fn http_transport() -> Arc<HttpTransport> {
    Arc::new(HttpTransport::new().expect("http transport"))
}

pub fn page() -> PageContext {
    PageContext::parse(TEST_PAGE_URL).expect("page url")
}

pub fn site_config(relay_endpoint: &str, delivery_endpoint: &str) -> Arc<SiteConfig> {
    Arc::new(SiteConfig {
        relay_endpoint: relay_endpoint.to_string(),
        delivery_endpoint: delivery_endpoint.to_string(),
        business_email: TEST_BUSINESS_EMAIL.to_string(),
    })
}

#[derive(Debug, Clone, Default)]
pub struct CapturedRequest {
    pub accept: Option<String>,
    pub content_type: Option<String>,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Clone)]
struct MockServerState {
    status: StatusCode,
    reply: String,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

fn header_text(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn handle_relay(
    State(state): State<MockServerState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> (StatusCode, String) {
    let mut fields = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.unwrap_or_default();
        fields.push((name, value));
    }

    state.requests.lock().await.push(CapturedRequest {
        accept: header_text(&headers, header::ACCEPT),
        content_type: header_text(&headers, header::CONTENT_TYPE),
        fields,
        body: String::new(),
    });
    (state.status, state.reply.clone())
}

async fn handle_delivery(
    State(state): State<MockServerState>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    state.requests.lock().await.push(CapturedRequest {
        accept: header_text(&headers, header::ACCEPT),
        content_type: header_text(&headers, header::CONTENT_TYPE),
        fields: Vec::new(),
        body,
    });
    (state.status, state.reply.clone())
}

/// In-process stand-in for both external services. Relay posts go to `/f/test`,
/// delivery posts to [`DELIVERY_PATH`].
pub async fn spawn_mock_server(
    status: StatusCode,
    reply: &str,
) -> anyhow::Result<(String, Arc<Mutex<Vec<CapturedRequest>>>)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = MockServerState {
        status,
        reply: reply.to_string(),
        requests: requests.clone(),
    };
    let app = Router::new()
        .route("/f/test", post(handle_relay))
        .route(DELIVERY_PATH, post(handle_delivery))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), requests))
}

/// An address nothing listens on, for transport failures.
pub async fn closed_server_url() -> anyhow::Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}

/// Accepts connections and never answers them.
pub async fn spawn_stalled_server() -> anyhow::Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    Ok(format!("http://{addr}"))
}
