use reqwest::Client;

use super::{check_backend, ApiError};
use crate::models::access_log::{
    AccessCountStats, AccessLogQuery, GetAccessLogsResponse, RecordAccessRequest,
    RecordAccessResponse,
};

/// Client for the access-log endpoints of the VietGuardScan backend.
pub struct AccessLogClient {
    http: Client,
    base_url: String,
}

impl AccessLogClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    /// Record one page visit. Called once per portal session.
    pub async fn record_access(
        &self,
        request: &RecordAccessRequest,
    ) -> Result<RecordAccessResponse, ApiError> {
        let response = self
            .http
            .post(format!("{}/access-logs/record", self.base_url))
            .json(request)
            .send()
            .await?;
        let response = check_backend(response, "Failed to record access").await?;
        Ok(response.json().await?)
    }

    /// One page of access logs with pagination, sorting and search.
    pub async fn get_access_logs(
        &self,
        query: &AccessLogQuery,
    ) -> Result<GetAccessLogsResponse, ApiError> {
        let response = self
            .http
            .get(format!("{}/access-logs", self.base_url))
            .query(&query.to_query_pairs())
            .send()
            .await?;
        let response = check_backend(response, "Failed to get access logs").await?;
        Ok(response.json().await?)
    }

    /// Aggregate visit statistics.
    pub async fn get_access_count(&self) -> Result<AccessCountStats, ApiError> {
        let response = self
            .http
            .get(format!("{}/access-logs/count", self.base_url))
            .send()
            .await?;
        let response = check_backend(response, "Failed to get access count").await?;
        Ok(response.json().await?)
    }
}
