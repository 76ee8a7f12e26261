//! Status line output
//!
//! Uses `cliclack` log lines in an interactive terminal and plain
//! `[OK]`/`[WARN]`/`[FAIL]` prefixed lines in CI, where most runs happen.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{
    key_value, section, step_error_detail, step_info, step_ok, step_ok_detail, step_warn,
    step_warn_hint,
};
pub use progress::TaskSpinner;
