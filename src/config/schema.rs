//! Configuration schema for cicache
//!
//! Configuration is stored at `~/.config/cicache/config.toml`, optionally
//! overlaid by a project-local `.cicache.toml`.

use super::ConfigManager;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Shared cache repository
    pub cache: CacheConfig,

    /// Coverage gate settings
    pub coverage: CoverageConfig,

    /// Default commands for guarded actions
    pub actions: ActionsConfig,

    /// CI provider settings
    pub ci: CiConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Append guard and gate decisions to the run journal
    pub journal: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            journal: true,
        }
    }
}

/// Cache repository settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Remote URL of the cache repository
    pub remote: String,

    /// Local clone location (defaults to the state directory)
    pub dir: Option<PathBuf>,

    /// Trunk branch entries are pushed to
    pub branch: String,

    /// Commit author name for cache writes
    pub author_name: String,

    /// Commit author email for cache writes
    pub author_email: String,
}

impl CacheConfig {
    /// Resolved path of the local clone
    pub fn work_tree(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| ConfigManager::state_dir().join("cache-repo"))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            remote: String::new(),
            dir: None,
            branch: "master".to_string(),
            author_name: "cicache".to_string(),
            author_email: "cicache@localhost".to_string(),
        }
    }
}

/// Coverage gate settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    /// Command printing the coverage report
    pub command: Vec<String>,

    /// First key token of coverage records
    pub key_prefix: String,

    /// Branch whose coverage is the baseline
    pub trunk: String,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            command: vec!["coverage".to_string(), "report".to_string()],
            key_prefix: "coverage".to_string(),
            trunk: "master".to_string(),
        }
    }
}

/// Default action commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionsConfig {
    /// Test command
    pub test: Vec<String>,

    /// Deploy command; `{mode}` is replaced with the deploy mode
    pub deploy: Vec<String>,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            test: vec!["make".to_string(), "test".to_string()],
            deploy: vec![
                "make".to_string(),
                "deploy".to_string(),
                "MODE={mode}".to_string(),
            ],
        }
    }
}

/// CI provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CiConfig {
    /// Base URL used to build job links when none is supplied
    pub job_url_base: String,
}

impl Default for CiConfig {
    fn default() -> Self {
        Self {
            job_url_base: "https://travis-ci.org".to_string(),
        }
    }
}
