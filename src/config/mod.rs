use serde::Deserialize;
use std::time::Duration;

use crate::polling::PollOptions;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Base URL of the VietGuardScan backend API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Gateway bind address (e.g., "0.0.0.0:8080"). Unused by the CLI.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Where the gateway forwards contact-form submissions (a hosted
    /// intake script). The form route returns an error when unset.
    #[serde(default)]
    pub form_intake_url: Option<String>,

    /// Seconds between scan-status queries. Defaults to 30.
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,

    /// Status queries before a scan is declared timed out. Defaults to 120.
    #[serde(default)]
    pub poll_max_attempts: Option<u32>,
}

fn default_api_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Polling cadence from the environment, library defaults otherwise.
    pub fn poll_options(&self) -> PollOptions {
        let mut options = PollOptions::default();
        if let Some(secs) = self.poll_interval_secs {
            options.interval = Duration::from_secs(secs);
        }
        if let Some(n) = self.poll_max_attempts {
            options.max_attempts = n;
        }
        options
    }
}
