use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use capture_core::{
    load_site_config, FormView, HttpTransport, LeadFormController, PageContext,
    SampleFormController, SamplePanel, SampleView, SubmissionTransport,
};
use clap::{Parser, Subcommand};
use shared::{
    domain::{FieldName, LeadFields, SampleFields, StatusKind, SubmissionResult},
    error::SubmissionError,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Submit a lead or sample request the way the site forms do")]
struct Cli {
    #[arg(long, default_value = "site.toml")]
    config: PathBuf,
    /// Page the submission is attributed to.
    #[arg(long, default_value = "https://finsyncsolutions.org/contact/")]
    page_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Lead {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        company: String,
        #[arg(long, default_value = "")]
        notes: String,
        #[arg(long, default_value = "", hide = true)]
        website: String,
    },
    Sample {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "", hide = true)]
        website: String,
    },
}

/// Prints what a browser would show.
struct TerminalView;

impl FormView for TerminalView {
    fn show_field_error(&mut self, field: FieldName, message: &str) {
        println!("  {field}: {message}");
    }

    fn clear_field_error(&mut self, _field: FieldName) {}

    fn focus(&mut self, _field: FieldName) {}

    fn set_status(&mut self, kind: StatusKind, message: &str) {
        let tag = match kind {
            StatusKind::Neutral => "..",
            StatusKind::Success => "ok",
            StatusKind::Error => "error",
        };
        println!("[{tag}] {message}");
    }

    fn set_loading(&mut self, _loading: bool) {}

    fn reset(&mut self) {}

    fn open_mailto(&mut self, href: &str) {
        println!("Open this link to send the lead by email:\n{href}");
    }
}

impl SampleView for TerminalView {
    fn show_panel(&mut self, _panel: SamplePanel) {}

    fn show_confirmed_email(&mut self, _email: &str) {}
}

/// 0 on success, 1 when the service refused or was unreachable, 2 when
/// nothing was dispatched.
fn exit_status(outcome: &Result<SubmissionResult, SubmissionError>) -> u8 {
    match outcome {
        Ok(SubmissionResult::Success { .. }) => 0,
        Ok(SubmissionResult::Failure { .. }) => 1,
        Err(err) => {
            info!(error = %err, "submission not dispatched");
            2
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let config = Arc::new(load_site_config(&cli.config)?);
    let page = PageContext::parse(&cli.page_url)
        .with_context(|| format!("invalid page url '{}'", cli.page_url))?;
    let transport: Arc<dyn SubmissionTransport> =
        Arc::new(HttpTransport::new().context("failed to build http client")?);
    info!(
        relay_configured = config.relay_configured(),
        delivery_configured = config.delivery_configured(),
        "site config loaded"
    );

    let outcome = match cli.command {
        Command::Lead {
            name,
            email,
            phone,
            company,
            notes,
            website,
        } => {
            let controller = LeadFormController::new(config, page, transport, TerminalView);
            let fields = LeadFields {
                name,
                email,
                phone,
                company,
                notes,
                website,
            };
            controller.submit(&fields).await
        }
        Command::Sample { email, website } => {
            let controller = SampleFormController::new(config, page, transport, TerminalView);
            controller.open().await;
            controller.submit(&SampleFields { email, website }).await
        }
    };

    Ok(ExitCode::from(exit_status(&outcome)))
}
