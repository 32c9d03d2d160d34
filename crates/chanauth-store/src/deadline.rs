//! Caller-imposed deadlines on store calls.

use std::future::Future;
use std::time::Duration;

use crate::error::{Result, StoreError};

/// Await `fut`, failing with [`StoreError::Timeout`] if `limit` elapses first.
/// With no limit the future is awaited as-is.
pub async fn with_deadline<T, F>(limit: Option<Duration>, op: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match limit {
        None => fut.await,
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(format!(
                "{} exceeded {}ms",
                op,
                limit.as_millis()
            ))),
        },
    }
}
