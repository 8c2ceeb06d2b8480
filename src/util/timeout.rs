//! Timeout helper.

use std::future::Future;
use std::time::Duration;

use crate::error::CuriaError;

/// Wrap a future with a timeout.
pub async fn with_timeout<T>(
    duration: Duration,
    future: impl Future<Output = Result<T, CuriaError>>,
) -> Result<T, CuriaError> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(CuriaError::Timeout(duration.as_millis() as u64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn slow_future_times_out() {
        let result: Result<(), CuriaError> = with_timeout(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(CuriaError::Timeout(50))));
    }

    #[tokio::test]
    async fn fast_future_passes_through() {
        let result = with_timeout(Duration::from_secs(1), async { Ok::<_, CuriaError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
