//! Coverage report parsing
//!
//! The coverage tool prints a table whose last line is the total row, e.g.
//!
//! ```text
//! Name           Stmts   Miss  Cover
//! ----------------------------------
//! app/views.py     120     12    90%
//! ----------------------------------
//! TOTAL            340     61    82%
//! ```
//!
//! The total percentage is the last whitespace-delimited field of the last
//! non-empty line.

use crate::error::{CicacheError, CicacheResult};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Extract the integer total percentage from a report
///
/// Fractional totals (`87.5%`) are floored.
pub fn parse_total_percent(report: &str) -> CicacheResult<u8> {
    let last_line = report
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .ok_or_else(|| CicacheError::CoverageUnavailable("report is empty".to_string()))?;

    let field = last_line.split_whitespace().last().unwrap_or_default();
    let number = field.strip_suffix('%').ok_or_else(|| {
        CicacheError::CoverageUnavailable(format!(
            "last field '{}' of '{}' is not a percentage",
            field, last_line
        ))
    })?;

    let value: f64 = number.parse().map_err(|_| {
        CicacheError::CoverageUnavailable(format!("'{}' is not a number", number))
    })?;

    if !(0.0..=100.0).contains(&value) {
        return Err(CicacheError::CoverageUnavailable(format!(
            "{}% is outside 0-100",
            number
        )));
    }

    Ok(value.floor() as u8)
}

/// Read a saved report from disk
pub async fn read_report(path: &Path) -> CicacheResult<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CicacheError::io(format!("reading coverage report {}", path.display()), e))
}

/// Run the coverage command and capture its report
pub async fn run_report_command(command: &[String]) -> CicacheResult<String> {
    let (program, args) = command.split_first().ok_or_else(|| {
        CicacheError::CoverageUnavailable("no coverage command configured".to_string())
    })?;
    let command_line = command.join(" ");
    debug!("Executing: {}", command_line);

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| CicacheError::command_failed(&command_line, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CicacheError::CoverageUnavailable(format!(
            "'{}' failed: {}",
            command_line,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
