//! VietGuardScan portal front end.
//!
//! This library is the non-browser half of the portal: a typed client for
//! the VietGuardScan backend REST API (OTP and member management, APK scan
//! tasks, access logs), the scan-status polling engine that drives a task
//! from `pending` to a terminal state, CSV export for the admin tables,
//! and the small set of HTTP routes the portal serves itself.
//!
//! All real work (OTP issuance, APK static analysis, report generation,
//! the member database) happens in the backend; everything here is
//! presentation and orchestration.

pub mod api;
pub mod app_state;
pub mod config;
pub mod export;
pub mod models;
pub mod polling;
pub mod routes;
