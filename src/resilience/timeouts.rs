//! Deadline enforcement.
//!
//! # Responsibilities
//! - Wrap node calls and watches with an optional deadline
//! - Cancel the wrapped future cleanly on expiry
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - `None` means no deadline; the future runs to completion
//! - Expiry is reported as the limit that elapsed, so callers can build
//!   their own error variant

use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;

/// Run `fut` to completion, or give up after `limit`.
pub async fn within<F>(limit: Option<Duration>, fut: F) -> Result<F::Output, Duration>
where
    F: Future,
{
    match limit {
        Some(limit) => timeout(limit, fut).await.map_err(|_| limit),
        None => Ok(fut.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_within_limit() {
        let result = within(Some(Duration::from_secs(1)), async { 7 }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn test_reports_elapsed_limit() {
        let limit = Duration::from_millis(20);
        let result = within(Some(limit), std::future::pending::<()>()).await;
        assert_eq!(result, Err(limit));
    }

    #[tokio::test]
    async fn test_no_limit() {
        let result = within(None, async { "done" }).await;
        assert_eq!(result, Ok("done"));
    }
}
