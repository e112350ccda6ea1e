use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct SendOtpRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct SendOtpResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpResponse {
    pub verified: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Contact details submitted after the OTP has been verified.
#[derive(Debug, Serialize)]
pub struct SubmitUserInfoRequest {
    pub email: String,
    pub otp: String,
    pub full_name: String,
    pub company_name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitUserInfoResponse {
    pub message: String,
}

/// One service subscription entry on a member record.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ServiceSelection {
    #[serde(rename = "serviceType")]
    pub service_type: u32,
}

impl ServiceSelection {
    /// The APK scanning service ("AppTotalGo").
    pub const APP_TOTAL_GO: ServiceSelection = ServiceSelection { service_type: 4 };
}

#[derive(Debug, Serialize)]
pub struct CreateMemberWithServiceRequest {
    pub email: String,
    pub services: Vec<ServiceSelection>,
}

#[derive(Debug, Deserialize)]
pub struct MemberSummary {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub services: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMemberWithServiceResponse {
    pub member: MemberSummary,
    #[serde(default)]
    pub message: Option<String>,
}

/// A verified member's contact record, as listed by the admin table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberVerification {
    pub id: i64,
    pub full_name: String,
    pub phone: String,
    pub company_name: String,
    #[serde(default)]
    pub note: Option<String>,
    pub member_email: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn verify_otp_request_omits_absent_ips() {
        let request = VerifyOtpRequest {
            email: "a@b.vn".into(),
            otp: "123456".into(),
            ipv4: Some("203.0.113.7".into()),
            ipv6: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["ipv4"], json!("203.0.113.7"));
        assert!(value.get("ipv6").is_none());
    }

    #[test]
    fn service_selection_serializes_backend_field_name() {
        let value = serde_json::to_value(ServiceSelection::APP_TOTAL_GO).unwrap();
        assert_eq!(value, json!({ "serviceType": 4 }));
    }

    #[test]
    fn member_verification_tolerates_missing_file_fields() {
        let record: MemberVerification = serde_json::from_value(json!({
            "id": 7,
            "full_name": "Nguyen Van A",
            "phone": "0900000000",
            "company_name": "ACME",
            "member_email": "a@acme.vn",
            "created_at": "2025-11-02T08:30:00Z"
        }))
        .unwrap();

        assert_eq!(record.id, 7);
        assert!(record.note.is_none());
        assert!(record.file_name.is_none());
    }
}
