//! Idempotent run guard
//!
//! Wraps a side-effecting action (tests, a deploy) with a cache lookup so
//! the same key tuple is only executed successfully once.

use crate::cache::{CacheKey, CacheStore, PutOutcome};
use crate::error::CicacheResult;
use std::future::Future;
use tracing::{info, warn};

/// What the guard did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Already recorded; holds the stored reference verbatim
    Skipped(String),
    /// Action ran and succeeded
    Executed { recorded: PutOutcome },
}

/// Run `action` unless `key` is already recorded in `store`
///
/// On success `result_value` is written at `key`. A failed action leaves the
/// store untouched and its error is returned unchanged. A lost cache write
/// does not turn a successful action into a failure.
pub async fn run_once<S, F, Fut>(
    store: &S,
    key: &CacheKey,
    result_value: &str,
    action: F,
) -> CicacheResult<RunOutcome>
where
    S: CacheStore + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = CicacheResult<()>>,
{
    if let Some(prior) = store.get(key).await? {
        info!("{} already recorded: {}", key, prior);
        return Ok(RunOutcome::Skipped(prior));
    }

    action().await?;

    let recorded = store.put(key, result_value).await;
    if !recorded.is_committed() {
        warn!("Could not record {}; a later run may repeat this work", key);
    }
    Ok(RunOutcome::Executed { recorded })
}
