//! Error types for cicache
//!
//! All modules use `CicacheResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cicache operations
pub type CicacheResult<T> = Result<T, CicacheError>;

/// All errors that can occur in cicache
#[derive(Error, Debug)]
pub enum CicacheError {
    // Cache store errors
    #[error("Cache repository unavailable ({remote}): {reason}")]
    CacheUnavailable { remote: String, reason: String },

    #[error("No cache entry for {0}")]
    CacheMiss(String),

    #[error("No cache remote configured")]
    CacheRemoteMissing,

    // Coverage gate errors
    #[error("Coverage report unusable: {0}")]
    CoverageUnavailable(String),

    #[error("Coverage regression: {current}% is below the recorded baseline of {baseline}%")]
    CoverageRegression { current: u8, baseline: u8 },

    // Guarded action errors
    #[error("Action failed: {command} (exit code: {})", describe_exit(.code))]
    ActionFailure { command: String, code: Option<i32> },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution error: {command}, stderr: {stderr}")]
    CommandExecution { command: String, stderr: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("{0}")]
    User(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |c| c.to_string())
}

impl CicacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution error
    pub fn command_exec(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CacheUnavailable { .. } => {
                Some("Check network access and credentials for the cache remote")
            }
            Self::CacheRemoteMissing => {
                Some("Pass --remote, set CICACHE_REMOTE, or run: cicache config init")
            }
            Self::CoverageUnavailable(_) => {
                Some("Check that the coverage command ran and produced a total line")
            }
            Self::CoverageRegression { .. } => Some("Add tests to bring coverage back up"),
            _ => None,
        }
    }
}
