//! Submission pipeline for the site's lead-capture and sample-download forms.
//!
//! Controllers validate input, dispatch to the form relay or the sample
//! delivery endpoint through a [`SubmissionTransport`], and render progress
//! through a [`FormView`]. Configuration is built once and shared by `Arc`.

pub mod config;
pub mod lead;
pub mod mailto;
pub mod page;
pub mod sample;
pub mod state;
pub mod transport;
pub mod validation;
pub mod view;

pub use config::{load_site_config, SiteConfig};
pub use lead::LeadFormController;
pub use page::PageContext;
pub use sample::SampleFormController;
pub use state::{FormEvent, FormState};
pub use transport::{HttpReply, HttpTransport, SubmissionTransport, TransportError};
pub use view::{FormView, SamplePanel, SampleView};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
