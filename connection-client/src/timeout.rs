//! Per-call deadlines.
//!
//! Each dispatched call races against a fixed deadline. If the deadline wins,
//! the caller receives the synthetic timeout response and the real call is
//! dropped, so exactly one outcome is ever observed per call.

use std::future::Future;
use std::time::Duration;

use common::response::ResultSet;

/// Standard per-call deadline.
pub const CALL_TIMEOUT: Duration = Duration::from_millis(20_000);
/// Deadline for the known long-running procedures.
pub const LONG_CALL_TIMEOUT: Duration = Duration::from_millis(6_000_000);

/// Procedures allowed to run far past the standard deadline.
pub fn is_long_running(procedure: &str) -> bool {
    matches!(procedure, "@SnapshotRestore" | "@AdHoc")
}

/// Resolves to the call's real response, or to the synthetic
/// `"Query timeout."` response if the deadline elapses first.
pub async fn with_call_timeout<F>(call: F, long: bool) -> ResultSet
where
    F: Future<Output = ResultSet>,
{
    let deadline = if long { LONG_CALL_TIMEOUT } else { CALL_TIMEOUT };
    match tokio::time::timeout(deadline, call).await {
        Ok(response) => response,
        Err(_) => ResultSet::timeout(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::response::{QUERY_TIMEOUT_MESSAGE, STATUS_ERROR};

    #[tokio::test(start_paused = true)]
    async fn slow_call_yields_timeout_payload_once() {
        let call = async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            ResultSet {
                status: 1,
                statusstring: String::new(),
                results: Vec::new(),
            }
        };
        let response = with_call_timeout(call, false).await;
        assert_eq!(response.status, STATUS_ERROR);
        assert_eq!(response.statusstring, QUERY_TIMEOUT_MESSAGE);
    }

    #[tokio::test(start_paused = true)]
    async fn fast_call_passes_through_untouched() {
        let call = async {
            ResultSet {
                status: 1,
                statusstring: "ok".into(),
                results: Vec::new(),
            }
        };
        let response = with_call_timeout(call, false).await;
        assert!(response.is_success());
        assert_eq!(response.statusstring, "ok");
    }

    #[tokio::test(start_paused = true)]
    async fn long_running_procedures_get_the_extended_deadline() {
        assert!(is_long_running("@SnapshotRestore"));
        assert!(is_long_running("@AdHoc"));
        assert!(!is_long_running("@Statistics"));

        let call = async {
            tokio::time::sleep(Duration::from_secs(120)).await;
            ResultSet {
                status: 1,
                statusstring: String::new(),
                results: Vec::new(),
            }
        };
        let response = with_call_timeout(call, true).await;
        assert!(response.is_success());
    }
}
