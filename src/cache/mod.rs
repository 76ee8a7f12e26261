//! Shared run cache
//!
//! A key/value store whose source of truth is a remote git repository.
//! Every CI job holds its own clone; the remote trunk branch orders all
//! writes.
//!
//! # Layout
//!
//! Each entry is a text file at its key's encoded path:
//!
//! | Key | Path |
//! |-----|------|
//! | `tested, org/repo, <sha>` | `tested/org/repo/01/23…` |
//! | `coverage, org/repo, master` | `coverage/org/repo/master` |
//!
//! # Write discipline
//!
//! New keys only, optimistic single retry on a rejected push, otherwise the
//! write is dropped. Writes to different keys never conflict; writes to the
//! same key are last-push-wins.

pub mod git;
pub mod key;
pub mod memory;
pub mod store;

pub use git::GitCacheStore;
pub use key::CacheKey;
pub use memory::MemoryCacheStore;
pub use store::{CacheStore, PutOutcome};
