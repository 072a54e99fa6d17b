use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Raised when a supervising task cancelled the current routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Waits for `duration` unless `token` fires first.
///
/// A zero duration still yields to the runtime so that tight polling loops
/// cannot starve the task that would cancel them.
pub async fn pause(duration: Duration, token: &CancellationToken) -> Result<(), Cancelled> {
    if token.is_cancelled() {
        return Err(Cancelled);
    }

    if duration.is_zero() {
        tokio::task::yield_now().await;
        return if token.is_cancelled() { Err(Cancelled) } else { Ok(()) };
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => Err(Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}

/// Fails fast when the token already fired.
pub fn check(token: &CancellationToken) -> Result<(), Cancelled> {
    if token.is_cancelled() {
        Err(Cancelled)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pause_returns_early_on_cancel() {
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let result = pause(Duration::from_secs(30), &token).await;
        assert_eq!(result, Err(Cancelled));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn zero_pause_completes() {
        let token = CancellationToken::new();
        assert_eq!(pause(Duration::ZERO, &token).await, Ok(()));
        token.cancel();
        assert_eq!(pause(Duration::ZERO, &token).await, Err(Cancelled));
    }
}
