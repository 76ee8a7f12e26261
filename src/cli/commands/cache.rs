//! Cache command - read and write entries directly

use super::attach_store;
use crate::cache::{CacheKey, CacheStore, PutOutcome};
use crate::cli::args::{CacheAction, CacheArgs};
use crate::config::Config;
use crate::error::{CicacheError, CicacheResult};
use crate::ui::{self, UiContext};

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> CicacheResult<()> {
    let ctx = UiContext::detect();

    match args.action {
        CacheAction::Key { tokens } => {
            let key = key_from(tokens)?;
            println!("{}", key.encode());
            Ok(())
        }
        CacheAction::Get { tokens } => {
            let key = key_from(tokens)?;
            let store = attach_store(config, &ctx, true).await?;
            match store.get(&key).await? {
                Some(value) => {
                    println!("{}", value);
                    Ok(())
                }
                None => Err(CicacheError::CacheMiss(key.encode())),
            }
        }
        CacheAction::Put { tokens, value } => {
            let key = key_from(tokens)?;
            let store = attach_store(config, &ctx, false).await?;
            match store.put(&key, &value).await {
                PutOutcome::Committed => ui::step_ok_detail(&ctx, "Recorded", &key.encode()),
                PutOutcome::Lost => ui::step_warn_hint(
                    &ctx,
                    &format!("Cache write for {} lost", key),
                    "the remote kept changing; the value was not pushed",
                ),
            }
            Ok(())
        }
    }
}

fn key_from(tokens: Vec<String>) -> CicacheResult<CacheKey> {
    let key = CacheKey::new(tokens);
    if key.is_empty() {
        return Err(CicacheError::User(
            "A cache key needs at least one non-empty token".to_string(),
        ));
    }
    Ok(key)
}
