//! Scan-status polling.
//!
//! [`start_scan_polling`] drives one scan task from `pending` through to a
//! terminal state by querying the backend at a fixed cadence: the first
//! query fires immediately, subsequent queries every
//! [`PollOptions::interval`], until the task completes, fails, a query
//! errors, or the attempt ceiling is reached. Each session is independent
//! and owns nothing but its active flag and attempt counter.
//!
//! Queries are strictly sequential; the next query is only scheduled after
//! the previous response has been fully handled, so there is never more
//! than one in flight per session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use crate::api::scan::ScanApiClient;
use crate::api::ApiError;
use crate::models::scan::{ScanStatus, ScanStatusResponse};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
/// 120 attempts at the 30 s default interval is a 60 minute ceiling.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 120;

/// Message shown when the backend marks a scan `failed`. The backend's
/// own error text is deliberately discarded: a failed scan at this stage
/// means the uploaded APK was malformed or unsigned, and the raw engine
/// output is not fit for end users.
pub const SCAN_FAILED_MESSAGE: &str =
    "Đã có lỗi xảy ra. File apk của bạn sai cấu trúc hoặc chưa có chữ kí.";

/// How a polling session ends abnormally. The three kinds surface through
/// the same error callback but stay distinguishable, so callers can
/// message a timeout differently from a rejected APK.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// The attempt ceiling was reached without a terminal status.
    #[error("scan polling timed out after {attempts} status queries")]
    Timeout { attempts: u32 },

    /// The backend reported the scan itself failed.
    #[error("{}", SCAN_FAILED_MESSAGE)]
    ScanFailed,

    /// The status query failed. Fatal to the session; queries are not
    /// retried on transport errors, only non-terminal statuses are.
    #[error("status query failed: {0}")]
    Api(#[from] ApiError),
}

/// Tuning knobs for one polling session.
#[derive(Debug, Clone, Copy)]
pub struct PollOptions {
    /// Delay between consecutive status queries.
    pub interval: Duration,
    /// Status queries issued before the session times out.
    pub max_attempts: u32,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Where the poller gets status responses from. Production code uses
/// [`ScanApiClient`]; tests script response sequences.
#[async_trait]
pub trait ScanStatusSource: Send + Sync {
    async fn scan_status(&self, task_id: &str) -> Result<ScanStatusResponse, ApiError>;
}

#[async_trait]
impl ScanStatusSource for ScanApiClient {
    async fn scan_status(&self, task_id: &str) -> Result<ScanStatusResponse, ApiError> {
        self.get_scan_status(task_id).await
    }
}

/// Cancellation handle for a polling session.
///
/// [`cancel`](Self::cancel) is idempotent and safe after the session has
/// already terminated. It does not abort a query that is in flight; the
/// poller rechecks the flag when the response arrives, so a late response
/// never reaches a callback.
#[derive(Debug)]
pub struct PollHandle {
    active: Arc<AtomicBool>,
    task: tokio::task::JoinHandle<()>,
}

impl PollHandle {
    /// Stop the session. No callback fires after this returns and the
    /// session's task has observed the flag.
    pub fn cancel(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    /// Whether the session is still polling (or sleeping between queries).
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Wait for the session's task to finish.
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

/// Start polling the status of `task_id`.
///
/// `on_status_update` fires once per completed query, before the status is
/// classified. Exactly one of `on_success` / `on_error` then ends the
/// session: `completed`/`success` → `on_success` with the final response;
/// `failed` → `on_error` with [`PollError::ScanFailed`]; a query error →
/// `on_error` with [`PollError::Api`]; the attempt ceiling → `on_error`
/// with [`PollError::Timeout`], issued without a further query. Any other
/// status keeps the session polling; unrecognized tokens are logged, the
/// backend's vocabulary is not a closed set.
///
/// Callbacks run on the session's task. The poller is not resilient to a
/// panicking callback: the panic tears the task down and the session ends
/// without further notification.
pub fn start_scan_polling<Src, U, S, E>(
    source: Arc<Src>,
    task_id: impl Into<String>,
    options: PollOptions,
    mut on_status_update: U,
    on_success: S,
    on_error: E,
) -> PollHandle
where
    Src: ScanStatusSource + 'static,
    U: FnMut(&ScanStatusResponse) + Send + 'static,
    S: FnOnce(ScanStatusResponse) + Send + 'static,
    E: FnOnce(PollError) + Send + 'static,
{
    let task_id = task_id.into();
    let active = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&active);

    let task = tokio::spawn(async move {
        let mut attempts: u32 = 0;

        loop {
            if !flag.load(Ordering::SeqCst) {
                return;
            }
            if attempts >= options.max_attempts {
                flag.store(false, Ordering::SeqCst);
                on_error(PollError::Timeout { attempts });
                return;
            }
            attempts += 1;

            match source.scan_status(&task_id).await {
                Ok(response) => {
                    // A cancel may have landed while the query was in
                    // flight; its response must not reach any callback.
                    if !flag.load(Ordering::SeqCst) {
                        return;
                    }
                    on_status_update(&response);

                    match response.scan_status() {
                        Some(ScanStatus::Completed) => {
                            flag.store(false, Ordering::SeqCst);
                            on_success(response);
                            return;
                        }
                        Some(ScanStatus::Failed) => {
                            flag.store(false, Ordering::SeqCst);
                            on_error(PollError::ScanFailed);
                            return;
                        }
                        Some(ScanStatus::Pending) | Some(ScanStatus::Processing) => {}
                        Some(ScanStatus::Unknown(token)) => {
                            tracing::warn!(
                                task_id = %task_id,
                                token = %token,
                                "unrecognized scan status, continuing to poll"
                            );
                        }
                        None => {
                            tracing::warn!(
                                task_id = %task_id,
                                "status response carried no status token, continuing to poll"
                            );
                        }
                    }
                }
                Err(err) => {
                    if !flag.load(Ordering::SeqCst) {
                        return;
                    }
                    flag.store(false, Ordering::SeqCst);
                    on_error(PollError::Api(err));
                    return;
                }
            }

            sleep(options.interval).await;
        }
    });

    PollHandle { active, task }
}

/// Fixed progress percentage for a raw status token. Coarse by design: a
/// UI affordance, not a measured metric.
pub fn calculate_scan_progress(status: &str) -> u8 {
    match status {
        "pending" => 20,
        "processing" => 60,
        "completed" => 100,
        "failed" => 100,
        _ => 0,
    }
}

/// Display text for a raw status token. Unrecognized tokens pass through
/// unchanged.
pub fn format_status_text(status: &str) -> &str {
    match status {
        "pending" => "Waiting to start...",
        "processing" => "Scanning app...",
        "completed" => "Scan completed",
        "failed" => "Scan failed",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_mapping_is_exact() {
        assert_eq!(calculate_scan_progress("pending"), 20);
        assert_eq!(calculate_scan_progress("processing"), 60);
        assert_eq!(calculate_scan_progress("completed"), 100);
        assert_eq!(calculate_scan_progress("failed"), 100);
    }

    #[test]
    fn progress_falls_back_to_zero_for_other_tokens() {
        assert_eq!(calculate_scan_progress("Pending"), 0);
        assert_eq!(calculate_scan_progress("InProgress"), 0);
        assert_eq!(calculate_scan_progress(""), 0);
        assert_eq!(calculate_scan_progress("quarantined"), 0);
    }

    #[test]
    fn status_text_maps_known_tokens() {
        assert_eq!(format_status_text("pending"), "Waiting to start...");
        assert_eq!(format_status_text("processing"), "Scanning app...");
        assert_eq!(format_status_text("completed"), "Scan completed");
        assert_eq!(format_status_text("failed"), "Scan failed");
    }

    #[test]
    fn status_text_passes_unknown_tokens_through() {
        assert_eq!(format_status_text("Quarantined"), "Quarantined");
        assert_eq!(format_status_text(""), "");
    }

    #[test]
    fn default_options_cover_an_hour() {
        let options = PollOptions::default();
        assert_eq!(options.interval * options.max_attempts, Duration::from_secs(3600));
    }
}
