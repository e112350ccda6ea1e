use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use vietguard_portal::app_state::AppState;
use vietguard_portal::config::AppConfig;
use vietguard_portal::routes;

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing vietguard-portal gateway");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register gateway metrics
    metrics::describe_counter!(
        "gateway_form_submissions_total",
        "Contact form submissions forwarded to the intake endpoint"
    );
    metrics::describe_counter!(
        "gateway_form_submission_failures_total",
        "Contact form submissions that could not be forwarded"
    );
    metrics::describe_counter!(
        "gateway_member_verification_requests_total",
        "Member-verification list requests served"
    );

    if config.form_intake_url.is_none() {
        tracing::warn!("FORM_INTAKE_URL not set; form submissions will be rejected");
    }

    let state = AppState::new(&config.api_base_url, config.form_intake_url.clone());

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api/submit-otp-form", post(routes::forms::submit_otp_form))
        .route(
            "/api/members/verifications",
            get(routes::members::member_verifications),
        )
        .with_state(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(64 * 1024)); // form payloads are small

    tracing::info!(
        backend = %config.api_base_url,
        "Starting vietguard-portal gateway on {}",
        config.bind_addr
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Gateway listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
