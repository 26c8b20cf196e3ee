//! Joining per-post background tasks

use tokio::task::JoinHandle;

use crate::error::{Error, Result};

/// Await every handle in order, keeping each result next to its key.
///
/// A task that panicked or was cancelled becomes [`Error::TaskFailed`] for
/// its own key; the other tasks are unaffected.
pub async fn join_keyed<K, T>(handles: Vec<(K, JoinHandle<Result<T>>)>) -> Vec<(K, Result<T>)> {
    let mut results = Vec::with_capacity(handles.len());
    for (key, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Task failed: {}", e);
                Err(Error::TaskFailed(e.to_string()))
            }
        };
        results.push((key, result));
    }
    results
}
