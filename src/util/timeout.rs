//! Timeout helper.

use std::future::Future;
use std::time::Duration;

use crate::error::HarvestError;

/// Wrap a future with an optional deadline; `None` awaits it unbounded.
pub async fn with_timeout<T>(
    deadline: Option<Duration>,
    future: impl Future<Output = Result<T, HarvestError>>,
) -> Result<T, HarvestError> {
    let Some(duration) = deadline else {
        return future.await;
    };
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(HarvestError::Timeout(duration.as_millis() as u64)),
    }
}
