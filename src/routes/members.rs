use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::app_state::AppState;
use crate::models::member::MemberVerification;

/// GET /api/members/verifications — the full verification list for the
/// admin table, proxied from the backend.
pub async fn member_verifications(
    State(state): State<AppState>,
) -> Result<Json<Vec<MemberVerification>>, (StatusCode, Json<Value>)> {
    match state.scan_api.member_verifications().await {
        Ok(list) => {
            metrics::counter!("gateway_member_verification_requests_total").increment(1);
            Ok(Json(list))
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch member verifications");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch member verifications" })),
            ))
        }
    }
}
