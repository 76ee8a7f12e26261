//! External actions run under the guard

use crate::error::{CicacheError, CicacheResult};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Replace `{mode}` placeholders in a command template
pub fn render_command(template: &[String], mode: &str) -> Vec<String> {
    template
        .iter()
        .map(|part| part.replace("{mode}", mode))
        .collect()
}

/// Run a command with inherited stdio; a non-zero exit is an action failure
pub async fn run_command(command: &[String]) -> CicacheResult<()> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| CicacheError::User("no command to run".to_string()))?;
    let command_line = command.join(" ");
    debug!("Executing: {}", command_line);

    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| CicacheError::command_failed(&command_line, e))?;

    if status.success() {
        Ok(())
    } else {
        Err(CicacheError::ActionFailure {
            command: command_line,
            code: status.code(),
        })
    }
}
