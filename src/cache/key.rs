//! Cache key encoding
//!
//! A cache key is an ordered tuple of tokens. Encoding turns it into a
//! relative path inside the cache working tree: tokens longer than
//! [`SHARD_THRESHOLD`] characters (commit SHAs) are split into a two
//! character fan-out directory plus the remainder, everything else is kept
//! as a single path segment.

use std::fmt;
use std::path::PathBuf;

/// Tokens longer than this are sharded
pub const SHARD_THRESHOLD: usize = 35;

/// Length of the fan-out directory for sharded tokens
const SHARD_PREFIX: usize = 2;

/// Ordered sequence of key tokens
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    tokens: Vec<String>,
}

impl CacheKey {
    /// Build a key from tokens, dropping empty ones
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(Into::into)
                .filter(|t: &String| !t.is_empty())
                .collect(),
        }
    }

    /// Return a new key with `token` appended
    pub fn child(&self, token: impl Into<String>) -> Self {
        let mut key = self.clone();
        let token = token.into();
        if !token.is_empty() {
            key.tokens.push(token);
        }
        key
    }

    /// Key tokens in order
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Encode as a `/`-joined relative path
    pub fn encode(&self) -> String {
        self.tokens
            .iter()
            .map(|token| shard(token))
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Encoded path as a `PathBuf` relative to the store root
    pub fn relative_path(&self) -> PathBuf {
        self.encode().split('/').collect()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

fn shard(token: &str) -> String {
    if token.chars().count() > SHARD_THRESHOLD {
        let split = token
            .char_indices()
            .nth(SHARD_PREFIX)
            .map_or(token.len(), |(i, _)| i);
        format!("{}/{}", &token[..split], &token[split..])
    } else {
        token.to_string()
    }
}
