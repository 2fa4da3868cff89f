//! Retry helper for transient backend failures.

use std::fmt::Display;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Run `operation`, retrying after each delay in `delays` (seconds).
///
/// Total attempts are `delays.len() + 1`. Returns the first success or the
/// last error once the delays are exhausted.
pub async fn retry_with_backoff<F, Fut, T, E>(mut operation: F, delays: &[u64]) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = delays.len() + 1;
    for (i, delay_secs) in delays.iter().enumerate() {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                warn!(
                    "request failed (attempt {}/{attempts}): {e}. Retrying after {delay_secs}s...",
                    i + 1
                );
                sleep(Duration::from_secs(*delay_secs)).await;
            }
        }
    }
    operation().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn first_success_short_circuits() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let result = retry_with_backoff(
            || {
                let attempts = attempts.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), String>(())
                }
            },
            &[1, 1],
        )
        .await;
        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_transient_failures() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let result: Result<(), String> = retry_with_backoff(
            || {
                let attempts = attempts.clone();
                async move {
                    if attempts.fetch_add(1, Ordering::SeqCst) + 1 < 3 {
                        Err(String::from("transient"))
                    } else {
                        Ok(())
                    }
                }
            },
            &[1, 2],
        )
        .await;
        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_delays_return_last_error() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let result: Result<(), String> = retry_with_backoff(
            || {
                let attempts = attempts.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err(String::from("down"))
                }
            },
            &[1, 2],
        )
        .await;
        assert_eq!(result, Err(String::from("down")));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
