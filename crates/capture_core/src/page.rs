//! The page a form lives on, and the context stamped onto each submission.

use chrono::{DateTime, Utc};
use shared::domain::SubmissionContext;
use url::Url;

const GITHUB_PAGES_SUFFIX: &str = "github.io";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    url: Url,
}

impl PageContext {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        Url::parse(raw).map(Self::new)
    }

    pub fn source_url(&self) -> &str {
        self.url.as_str()
    }

    /// Site-relative path with a trailing slash. GitHub Pages project sites
    /// serve under `/<repo>/`, and that prefix is dropped so every deployment
    /// reports the same page names.
    pub fn source_page(&self) -> String {
        normalize_path(self.url.host_str().unwrap_or_default(), self.url.path())
    }

    pub fn context_at(&self, submitted_at: DateTime<Utc>) -> SubmissionContext {
        SubmissionContext {
            source_url: self.source_url().to_string(),
            source_page: self.source_page(),
            submitted_at,
        }
    }

    pub fn context_now(&self) -> SubmissionContext {
        self.context_at(Utc::now())
    }
}

fn normalize_path(host: &str, path: &str) -> String {
    let mut normalized = path.to_string();

    if host.ends_with(GITHUB_PAGES_SUFFIX) {
        if let Some(repo) = path.split('/').find(|segment| !segment.is_empty()) {
            let prefix = format!("/{repo}");
            let rest = path.strip_prefix(prefix.as_str()).unwrap_or(path);
            normalized = if rest.starts_with('/') {
                rest.to_string()
            } else {
                format!("/{rest}")
            };
        }
    }

    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}
