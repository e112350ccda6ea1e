use std::sync::Arc;

use crate::api::access_log::AccessLogClient;
use crate::api::scan::ScanApiClient;

/// Shared state for the gateway's route handlers.
#[derive(Clone)]
pub struct AppState {
    pub scan_api: Arc<ScanApiClient>,
    pub access_logs: Arc<AccessLogClient>,
    pub http: reqwest::Client,
    pub form_intake_url: Option<String>,
}

impl AppState {
    pub fn new(api_base_url: &str, form_intake_url: Option<String>) -> Self {
        let http = reqwest::Client::new();
        Self {
            scan_api: Arc::new(ScanApiClient::with_client(http.clone(), api_base_url)),
            access_logs: Arc::new(AccessLogClient::with_client(http.clone(), api_base_url)),
            http,
            form_intake_url,
        }
    }
}
