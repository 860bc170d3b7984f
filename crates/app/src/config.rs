//! Environment-driven configuration.

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the hosted backend (auth and data share it).
    pub api_url: String,
    /// Publishable API key sent with every request.
    pub anon_key: String,
    /// Origin confirmation mails link back to, if any.
    pub origin: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_url = std::env::var("HIMS_API_URL")
            .unwrap_or_else(|_| "http://localhost:54321".to_string());
        let anon_key =
            std::env::var("HIMS_ANON_KEY").context("HIMS_ANON_KEY must be set")?;
        let origin = std::env::var("HIMS_ORIGIN").ok();
        Ok(Self {
            api_url,
            anon_key,
            origin,
        })
    }
}
