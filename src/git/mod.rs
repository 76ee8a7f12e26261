//! Git command execution
//!
//! Every git operation the cache store performs goes through the
//! [`GitRunner`] trait. Production uses [`SystemGit`], which shells out to
//! the `git` binary; tests script responses with a fake runner.

mod system;

pub use system::SystemGit;

use crate::error::{CicacheError, CicacheResult};
use async_trait::async_trait;
use std::path::Path;

/// Captured result of a git invocation
#[derive(Debug, Clone, Default)]
pub struct GitOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Abstract git command runner
#[async_trait]
pub trait GitRunner: Send + Sync {
    /// Run `git <args>`, inside `dir` when given
    ///
    /// A non-zero exit is reported through [`GitOutput::success`]; only a
    /// failure to spawn git at all is an error.
    async fn run(&self, dir: Option<&Path>, args: &[&str]) -> CicacheResult<GitOutput>;

    /// Run and turn a non-zero exit into [`CicacheError::CommandExecution`]
    async fn run_checked(&self, dir: Option<&Path>, args: &[&str]) -> CicacheResult<GitOutput> {
        let output = self.run(dir, args).await?;
        if output.success {
            Ok(output)
        } else {
            Err(CicacheError::command_exec(
                format!("git {}", args.join(" ")),
                output.stderr.trim(),
            ))
        }
    }
}
