//! In-memory cache store

use crate::cache::key::CacheKey;
use crate::cache::store::{CacheStore, PutOutcome};
use crate::error::CicacheResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Map-backed store for tests
///
/// Keys are stored by their encoded path, so two keys that encode to the
/// same path collide exactly as they would in the git tree.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, String>>,
    lose_writes: bool,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes are always reported as lost
    pub fn losing_writes() -> Self {
        Self {
            entries: Mutex::default(),
            lose_writes: true,
        }
    }

    /// Pre-populate an entry
    pub fn with_entry(self, key: &CacheKey, value: impl Into<String>) -> Self {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.encode(), value.into());
        }
        self
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &CacheKey) -> CicacheResult<Option<String>> {
        Ok(self
            .entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(&key.encode()).cloned())
            .filter(|value| !value.is_empty()))
    }

    async fn put(&self, key: &CacheKey, value: &str) -> PutOutcome {
        if self.lose_writes {
            return PutOutcome::Lost;
        }
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(key.encode(), value.to_string());
                PutOutcome::Committed
            }
            Err(_) => PutOutcome::Lost,
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
