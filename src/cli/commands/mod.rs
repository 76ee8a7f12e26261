//! CLI command implementations

pub mod cache;
pub mod completions;
pub mod config;
pub mod coverage;
pub mod guarded;
pub mod status;

pub use cache::execute as cache;
pub use completions::execute as completions;
pub use config::execute as config;
pub use coverage::execute as coverage;
pub use guarded::{deploy, test};
pub use status::execute as status;

use crate::cache::{CacheStore, GitCacheStore};
use crate::config::Config;
use crate::error::CicacheResult;
use crate::ui::{TaskSpinner, UiContext};

/// Attach to the configured cache repository
///
/// With `quiet` set nothing is printed, so stdout stays clean for values.
pub(crate) async fn attach_store(
    config: &Config,
    ctx: &UiContext,
    quiet: bool,
) -> CicacheResult<GitCacheStore> {
    if quiet {
        return GitCacheStore::attach(&config.cache).await;
    }

    let mut spinner = TaskSpinner::new(ctx);
    spinner.start("Syncing cache repository...");
    match GitCacheStore::attach(&config.cache).await {
        Ok(store) => {
            spinner.stop(&format!(
                "{} cache ready at {}",
                store.backend_name(),
                store.work_tree().display()
            ));
            Ok(store)
        }
        Err(e) => {
            spinner.stop_error("Cache repository unavailable");
            Err(e)
        }
    }
}
