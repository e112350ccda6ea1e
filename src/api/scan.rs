use std::path::{Path, PathBuf};

use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use super::{check_backend, ApiError};
use crate::models::member::{
    CreateMemberWithServiceRequest, CreateMemberWithServiceResponse, MemberVerification,
    SendOtpRequest, SendOtpResponse, SubmitUserInfoRequest, SubmitUserInfoResponse,
    VerifyOtpRequest, VerifyOtpResponse,
};
use crate::models::scan::{CreateScanTaskResponse, ScanStatusResponse};

/// Client for the member-management and APK-scanning endpoints of the
/// VietGuardScan backend.
pub struct ScanApiClient {
    http: Client,
    base_url: String,
}

impl ScanApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Build on an existing `reqwest::Client` (shared pools, test setups).
    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask the backend to email a one-time password.
    pub async fn send_otp(&self, email: &str) -> Result<SendOtpResponse, ApiError> {
        let response = self
            .http
            .post(format!("{}/members/send-otp", self.base_url))
            .json(&SendOtpRequest {
                email: email.to_string(),
            })
            .send()
            .await?;
        let response = check_backend(response, "Failed to send OTP").await?;
        Ok(response.json().await?)
    }

    /// Verify a one-time password, optionally attaching the caller's
    /// public IPs for the access log.
    pub async fn verify_otp(
        &self,
        email: &str,
        otp: &str,
        ipv4: Option<&str>,
        ipv6: Option<&str>,
    ) -> Result<VerifyOtpResponse, ApiError> {
        let response = self
            .http
            .post(format!("{}/members/verify-otp", self.base_url))
            .json(&VerifyOtpRequest {
                email: email.to_string(),
                otp: otp.to_string(),
                ipv4: ipv4.map(str::to_string),
                ipv6: ipv6.map(str::to_string),
            })
            .send()
            .await?;
        let response = check_backend(response, "Failed to verify OTP").await?;
        Ok(response.json().await?)
    }

    /// Submit contact details collected by the OTP-gated form.
    pub async fn submit_user_info(
        &self,
        request: &SubmitUserInfoRequest,
    ) -> Result<SubmitUserInfoResponse, ApiError> {
        let response = self
            .http
            .post(format!("{}/members/submit-info", self.base_url))
            .json(request)
            .send()
            .await?;
        let response = check_backend(response, "Failed to submit user info").await?;
        Ok(response.json().await?)
    }

    /// Create a member record with its service subscriptions.
    pub async fn create_member_with_service(
        &self,
        request: &CreateMemberWithServiceRequest,
    ) -> Result<CreateMemberWithServiceResponse, ApiError> {
        let response = self
            .http
            .post(format!("{}/members/create-with-service", self.base_url))
            .json(request)
            .send()
            .await?;
        let response = check_backend(response, "Failed to create member with service").await?;
        Ok(response.json().await?)
    }

    /// Upload an APK and create a scan task for it.
    pub async fn create_scan_task(
        &self,
        member_name: &str,
        file_name: &str,
        file_bytes: Vec<u8>,
        client_ip: Option<&str>,
    ) -> Result<CreateScanTaskResponse, ApiError> {
        let part = Part::bytes(file_bytes)
            .file_name(file_name.to_string())
            .mime_str("application/vnd.android.package-archive")?;

        let mut form = Form::new()
            .text("memberName", member_name.to_string())
            .part("file", part);
        if let Some(ip) = client_ip.filter(|ip| !ip.is_empty()) {
            form = form.text("clientIp", ip.to_string());
        }

        let response = self
            .http
            .post(format!("{}/service/app-total-go", self.base_url))
            .multipart(form)
            .send()
            .await?;
        let response = check_backend(response, "Failed to create scan task").await?;
        Ok(response.json().await?)
    }

    /// Query the status of a scan task.
    pub async fn get_scan_status(&self, task_id: &str) -> Result<ScanStatusResponse, ApiError> {
        let response = self
            .http
            .get(format!(
                "{}/service/app-total-go/status/{}",
                self.base_url, task_id
            ))
            .send()
            .await?;
        let response = check_backend(response, "Failed to get scan status").await?;
        Ok(response.json().await?)
    }

    /// Download the analysis report into `dest_dir`, named after the
    /// `Content-Disposition` header when the backend provides one.
    /// Returns the path written.
    pub async fn download_report(
        &self,
        task_id: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, ApiError> {
        let response = self
            .http
            .get(format!(
                "{}/service/app-total-go/files/{}",
                self.base_url, task_id
            ))
            .send()
            .await?;
        let response = check_backend(response, "Failed to download report").await?;

        let file_name = report_file_name(
            response
                .headers()
                .get(CONTENT_DISPOSITION)
                .and_then(|v| v.to_str().ok()),
            task_id,
        );

        let bytes = response.bytes().await?;
        let path = dest_dir.join(file_name);
        tokio::fs::write(&path, &bytes).await?;
        Ok(path)
    }

    /// Fetch a member record by email. The payload is loosely structured
    /// and varies by service subscriptions, so it stays untyped.
    pub async fn get_member_by_email(
        &self,
        email: &str,
    ) -> Result<serde_json::Value, ApiError> {
        let response = self
            .http
            .get(format!("{}/members/{}", self.base_url, email))
            .send()
            .await?;
        let response = check_backend(response, "Failed to get member details").await?;
        Ok(response.json().await?)
    }

    /// The full member-verifications list for the admin table.
    pub async fn member_verifications(&self) -> Result<Vec<MemberVerification>, ApiError> {
        let response = self
            .http
            .get(format!("{}/members/verifications/all", self.base_url))
            .send()
            .await?;
        let response = check_backend(response, "Failed to fetch member verifications").await?;
        Ok(response.json().await?)
    }
}

/// File name for a downloaded report: the `Content-Disposition` filename
/// if present (quotes stripped), `analysis-result-<task-id>` otherwise.
fn report_file_name(content_disposition: Option<&str>, task_id: &str) -> String {
    if let Some(header) = content_disposition {
        if let Some(idx) = header.find("filename=") {
            let raw = &header[idx + "filename=".len()..];
            let raw = raw.split(';').next().unwrap_or(raw);
            let name = raw.trim().trim_matches('"').trim();
            if !name.is_empty() {
                return name.to_string();
            }
        }
    }
    format!("analysis-result-{task_id}")
}
