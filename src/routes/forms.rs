use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::app_state::AppState;

/// POST /api/submit-otp-form — forward the contact form payload to the
/// hosted intake endpoint and relay its JSON reply.
///
/// The reply is relayed with status 200 whatever the intake script says;
/// only a transport failure (or a missing intake URL) produces a 500.
pub async fn submit_otp_form(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let Some(url) = state.form_intake_url.as_deref() else {
        tracing::error!("FORM_INTAKE_URL is not configured, rejecting form submission");
        return intake_failure();
    };

    let result: Result<Value, reqwest::Error> = async {
        let response = state.http.post(url).json(&body).send().await?;
        response.json().await
    }
    .await;

    match result {
        Ok(data) => {
            metrics::counter!("gateway_form_submissions_total").increment(1);
            (StatusCode::OK, Json(data))
        }
        Err(e) => {
            tracing::error!(error = %e, "form intake forwarding failed");
            intake_failure()
        }
    }
}

fn intake_failure() -> (StatusCode, Json<Value>) {
    metrics::counter!("gateway_form_submission_failures_total").increment(1);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Failed to submit form" })),
    )
}
