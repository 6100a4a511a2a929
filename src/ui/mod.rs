//! Terminal feedback for stepcache commands
//!
//! Status lines go to stderr so stdout only carries results (paths, tables,
//! JSON) that a CI script can capture. Interactive terminals get `cliclack`
//! spinners; CI logs get plain prefixed lines.

mod context;
mod output;
mod progress;
mod prompts;

pub use context::UiContext;
pub use output::{step_info, step_ok, step_warn_hint};
pub use progress::TaskSpinner;
pub use prompts::confirm;
