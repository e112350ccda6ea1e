//! End-to-end tests against a live VietGuardScan backend.
//!
//! These require a reachable backend; point API_BASE_URL at it (defaults
//! to http://localhost:3000/api).
//!
//! Run with: cargo test --test e2e_test -- --ignored --nocapture

use vietguard_portal::api::access_log::AccessLogClient;
use vietguard_portal::api::scan::ScanApiClient;
use vietguard_portal::models::access_log::{AccessLogQuery, SortField, SortOrder};

fn base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:3000/api".to_string())
}

#[tokio::test]
#[ignore] // Requires a running backend
async fn access_count_is_reachable() {
    let client = AccessLogClient::new(base_url());
    let stats = client
        .get_access_count()
        .await
        .expect("access count query failed");

    assert!(stats.total_access_count >= stats.total);
    println!(
        "✓ {} visitors, {} unique IPs, {} visits",
        stats.total, stats.unique_ips, stats.total_access_count
    );
}

#[tokio::test]
#[ignore] // Requires a running backend
async fn access_logs_paginate_and_sort() {
    let client = AccessLogClient::new(base_url());
    let page = client
        .get_access_logs(&AccessLogQuery {
            page: Some(1),
            limit: Some(5),
            sort_by: Some(SortField::AccessCount),
            sort_order: Some(SortOrder::Desc),
            search: None,
        })
        .await
        .expect("access log query failed");

    assert!(page.data.len() <= 5);
    assert_eq!(page.page, 1);
    for pair in page.data.windows(2) {
        assert!(pair[0].access_count >= pair[1].access_count);
    }
    println!("✓ page 1 of {} ({} rows total)", page.total_pages, page.total);
}

#[tokio::test]
#[ignore] // Requires a running backend
async fn unknown_task_status_is_a_backend_error() {
    let client = ScanApiClient::new(base_url());
    let result = client.get_scan_status("no-such-task").await;

    // The backend answers 404 or a structured error; the client must
    // surface it as ApiError::Backend, never panic.
    match result {
        Ok(response) => println!("✓ backend tolerated unknown id: {:?}", response.status_token()),
        Err(e) => println!("✓ backend rejected unknown id: {e}"),
    }
}
