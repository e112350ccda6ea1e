use serde::{Deserialize, Serialize};

/// Status of a scan task as reported by the backend.
///
/// The backend's vocabulary is open and mixes casing conventions
/// (`"completed"`, `"Success"`, `"InProgress"` have all been observed),
/// so parsing normalizes case and unknown tokens are carried through
/// rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Unknown(String),
}

impl ScanStatus {
    /// Parse a raw backend token, case-insensitively.
    pub fn parse(token: &str) -> Self {
        match token.to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "processing" | "inprogress" => Self::Processing,
            "completed" | "success" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Unknown(token.to_string()),
        }
    }

    /// A terminal status ends the polling session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Nested payload of the current status-endpoint envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanTaskData {
    pub id: String,
    pub status: String,
}

/// Analysis payload attached to a status response once a scan completes.
///
/// The backend adds fields over time; anything unmodeled lands in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanResult {
    pub risk_level: Option<String>,
    pub detected_threats: Vec<String>,
    pub app_name: Option<String>,
    pub package_name: Option<String>,
    pub permissions: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Response of the scan-status endpoint.
///
/// Two shapes exist in the wild: the current `{ code, message, data: { id,
/// status } }` envelope and the flat legacy `{ taskId, status, ... }` form.
/// Both deserialize into this struct; [`status_token`](Self::status_token)
/// and [`task_id`](Self::task_id) are the only places that choose between
/// them (nested wins), so the rest of the crate never looks at the raw
/// fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanStatusResponse {
    pub code: Option<String>,
    pub message: Option<String>,
    pub data: Option<ScanTaskData>,
    pub task_id: Option<String>,
    pub status: Option<String>,
    pub progress: Option<u8>,
    pub result: Option<ScanResult>,
    pub error: Option<String>,
}

impl ScanStatusResponse {
    /// Raw status token, nested envelope taking precedence.
    pub fn status_token(&self) -> Option<&str> {
        self.data
            .as_ref()
            .map(|d| d.status.as_str())
            .or(self.status.as_deref())
    }

    /// Task id, nested envelope taking precedence.
    pub fn task_id(&self) -> Option<&str> {
        self.data
            .as_ref()
            .map(|d| d.id.as_str())
            .or(self.task_id.as_deref())
    }

    /// Parsed, case-normalized status.
    pub fn scan_status(&self) -> Option<ScanStatus> {
        self.status_token().map(ScanStatus::parse)
    }
}

/// Nested payload of the create-task envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedTask {
    pub id: String,
}

/// Response of the create-scan-task endpoint, tolerating the same
/// nested/legacy split as [`ScanStatusResponse`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateScanTaskResponse {
    pub code: Option<String>,
    pub message: Option<String>,
    pub data: Option<CreatedTask>,
    pub task_id: Option<String>,
    pub status: Option<String>,
}

impl CreateScanTaskResponse {
    /// Task id assigned by the backend, nested envelope taking precedence.
    pub fn task_id(&self) -> Option<&str> {
        self.data
            .as_ref()
            .map(|d| d.id.as_str())
            .or(self.task_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_known_tokens_case_insensitively() {
        assert_eq!(ScanStatus::parse("pending"), ScanStatus::Pending);
        assert_eq!(ScanStatus::parse("Pending"), ScanStatus::Pending);
        assert_eq!(ScanStatus::parse("processing"), ScanStatus::Processing);
        assert_eq!(ScanStatus::parse("InProgress"), ScanStatus::Processing);
        assert_eq!(ScanStatus::parse("completed"), ScanStatus::Completed);
        assert_eq!(ScanStatus::parse("Success"), ScanStatus::Completed);
        assert_eq!(ScanStatus::parse("failed"), ScanStatus::Failed);
        assert_eq!(ScanStatus::parse("Failed"), ScanStatus::Failed);
    }

    #[test]
    fn preserves_unknown_tokens() {
        assert_eq!(
            ScanStatus::parse("Quarantined"),
            ScanStatus::Unknown("Quarantined".to_string())
        );
    }

    #[test]
    fn terminal_statuses() {
        assert!(ScanStatus::Completed.is_terminal());
        assert!(ScanStatus::Failed.is_terminal());
        assert!(!ScanStatus::Pending.is_terminal());
        assert!(!ScanStatus::Processing.is_terminal());
        assert!(!ScanStatus::Unknown("x".into()).is_terminal());
    }

    #[test]
    fn deserializes_nested_envelope() {
        let response: ScanStatusResponse = serde_json::from_value(json!({
            "code": "00",
            "message": "OK",
            "data": { "id": "abc-123", "status": "processing" }
        }))
        .unwrap();

        assert_eq!(response.task_id(), Some("abc-123"));
        assert_eq!(response.status_token(), Some("processing"));
        assert_eq!(response.scan_status(), Some(ScanStatus::Processing));
    }

    #[test]
    fn deserializes_legacy_flat_shape() {
        let response: ScanStatusResponse = serde_json::from_value(json!({
            "taskId": "abc-123",
            "status": "completed",
            "progress": 100,
            "result": {
                "riskLevel": "low",
                "detectedThreats": [],
                "appName": "Demo",
                "packageName": "com.example.demo"
            }
        }))
        .unwrap();

        assert_eq!(response.task_id(), Some("abc-123"));
        assert_eq!(response.scan_status(), Some(ScanStatus::Completed));
        let result = response.result.unwrap();
        assert_eq!(result.risk_level.as_deref(), Some("low"));
        assert_eq!(result.app_name.as_deref(), Some("Demo"));
    }

    #[test]
    fn nested_envelope_wins_over_flat_fields() {
        let response: ScanStatusResponse = serde_json::from_value(json!({
            "data": { "id": "new-id", "status": "processing" },
            "taskId": "old-id",
            "status": "completed"
        }))
        .unwrap();

        assert_eq!(response.task_id(), Some("new-id"));
        assert_eq!(response.status_token(), Some("processing"));
    }

    #[test]
    fn create_task_response_reads_either_shape() {
        let nested: CreateScanTaskResponse =
            serde_json::from_value(json!({ "data": { "id": "abc" } })).unwrap();
        assert_eq!(nested.task_id(), Some("abc"));

        let legacy: CreateScanTaskResponse =
            serde_json::from_value(json!({ "taskId": "abc", "status": "pending" })).unwrap();
        assert_eq!(legacy.task_id(), Some("abc"));
    }

    #[test]
    fn scan_result_keeps_unmodeled_fields() {
        let result: ScanResult = serde_json::from_value(json!({
            "riskLevel": "high",
            "certificateIssuer": "CN=Example"
        }))
        .unwrap();

        assert_eq!(result.risk_level.as_deref(), Some("high"));
        assert_eq!(
            result.extra.get("certificateIssuer").and_then(|v| v.as_str()),
            Some("CN=Example")
        );
    }
}
