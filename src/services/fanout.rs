use std::future::Future;

use tokio::task::JoinSet;

use crate::error::{AppError, AppResult};

/// Runs every future concurrently and returns their outputs in input order
///
/// Completion order never affects the output order. The first failure to
/// complete is returned as soon as it is observed; dropping the `JoinSet`
/// aborts whatever is still running.
pub async fn gather<T, F>(futures: Vec<F>) -> AppResult<Vec<T>>
where
    T: Send + 'static,
    F: Future<Output = AppResult<T>> + Send + 'static,
{
    let total = futures.len();
    let mut tasks = JoinSet::new();

    for (index, future) in futures.into_iter().enumerate() {
        tasks.spawn(async move { (index, future.await) });
    }

    let mut slots: Vec<Option<T>> = (0..total).map(|_| None).collect();

    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined.map_err(|e| {
            tracing::error!(error = %e, "Task join error");
            AppError::Internal(e.to_string())
        })?;
        slots[index] = Some(result?);
    }

    slots
        .into_iter()
        .map(|slot| slot.ok_or_else(|| AppError::Internal("Fan-out task vanished".to_string())))
        .collect()
}
