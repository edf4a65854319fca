use std::{fs, io, path::Path};

use anyhow::Context;
use serde::Deserialize;

/// Left in the relay endpoint until a real form id is pasted in.
pub const RELAY_PLACEHOLDER: &str = "YOUR_FORM_ID";
/// Only Apps Script deployments are accepted as a delivery endpoint.
pub const DELIVERY_PROVIDER_MARKER: &str = "script.google.com";

pub const DEFAULT_RELAY_ENDPOINT: &str = "https://formspree.io/f/YOUR_FORM_ID";
pub const DEFAULT_BUSINESS_EMAIL: &str = "curtis@finsyncsolutions.org";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub relay_endpoint: String,
    pub delivery_endpoint: String,
    pub business_email: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            relay_endpoint: DEFAULT_RELAY_ENDPOINT.into(),
            delivery_endpoint: String::new(),
            business_email: DEFAULT_BUSINESS_EMAIL.into(),
        }
    }
}

impl SiteConfig {
    pub fn relay_configured(&self) -> bool {
        let endpoint = self.relay_endpoint.trim();
        !endpoint.is_empty() && !endpoint.contains(RELAY_PLACEHOLDER)
    }

    pub fn delivery_configured(&self) -> bool {
        self.delivery_endpoint.contains(DELIVERY_PROVIDER_MARKER)
    }
}

#[derive(Debug, Default, Deserialize)]
struct SiteFile {
    relay_endpoint: Option<String>,
    delivery_endpoint: Option<String>,
    business_email: Option<String>,
}

/// Defaults, then `path` if it exists, then the process environment.
pub fn load_site_config(path: &Path) -> anyhow::Result<SiteConfig> {
    let mut config = SiteConfig::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            apply_toml(&mut config, &raw)
                .with_context(|| format!("invalid site config '{}'", path.display()))?;
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read site config '{}'", path.display()));
        }
    }

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

pub fn apply_toml(config: &mut SiteConfig, raw: &str) -> anyhow::Result<()> {
    let file: SiteFile = toml::from_str(raw)?;

    if let Some(v) = file.relay_endpoint {
        config.relay_endpoint = v;
    }
    if let Some(v) = file.delivery_endpoint {
        config.delivery_endpoint = v;
    }
    if let Some(v) = file.business_email {
        set_business_email(config, v);
    }
    Ok(())
}

/// `APP__`-prefixed names win over the bare ones.
pub fn apply_env_overrides(config: &mut SiteConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("RELAY_ENDPOINT") {
        config.relay_endpoint = v;
    }
    if let Some(v) = lookup("APP__RELAY_ENDPOINT") {
        config.relay_endpoint = v;
    }

    if let Some(v) = lookup("DELIVERY_ENDPOINT") {
        config.delivery_endpoint = v;
    }
    if let Some(v) = lookup("APP__DELIVERY_ENDPOINT") {
        config.delivery_endpoint = v;
    }

    if let Some(v) = lookup("BUSINESS_EMAIL") {
        set_business_email(config, v);
    }
    if let Some(v) = lookup("APP__BUSINESS_EMAIL") {
        set_business_email(config, v);
    }
}

fn set_business_email(config: &mut SiteConfig, value: String) {
    let value = value.trim();
    config.business_email = if value.is_empty() {
        DEFAULT_BUSINESS_EMAIL.to_string()
    } else {
        value.to_string()
    };
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
