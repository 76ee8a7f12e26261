//! Cache store abstraction
//!
//! The production store is a synchronized git working tree
//! ([`GitCacheStore`](crate::cache::GitCacheStore)); tests substitute
//! [`MemoryCacheStore`](crate::cache::MemoryCacheStore).

use crate::cache::key::CacheKey;
use crate::error::CicacheResult;
use async_trait::async_trait;
use std::fmt;

/// Result of a cache write
///
/// Writes are advisory: a lost write is reported, never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// Value is committed to the shared store
    Committed,
    /// Value could not be persisted after the conflict retry
    Lost,
}

impl PutOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed)
    }
}

impl fmt::Display for PutOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Committed => write!(f, "committed"),
            Self::Lost => write!(f, "lost"),
        }
    }
}

/// Shared key/value cache
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up a key; `None` covers "missed", "never written" and an
    /// empty or unreadable entry
    async fn get(&self, key: &CacheKey) -> CicacheResult<Option<String>>;

    /// Write a value, overwriting any existing one
    async fn put(&self, key: &CacheKey, value: &str) -> PutOutcome;

    /// Backend name shown when the store is attached
    fn backend_name(&self) -> &'static str;
}

/// Strip the single trailing newline a stored value is written with
pub(crate) fn normalize_value(raw: &str) -> String {
    raw.strip_suffix('\n')
        .map(|s| s.strip_suffix('\r').unwrap_or(s))
        .unwrap_or(raw)
        .to_string()
}
