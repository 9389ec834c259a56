//! CLI command handlers, one file per command.

mod completions;
mod forget_session;
mod man;
mod run;
mod status;

pub use completions::run_completions;
pub use forget_session::run_forget_session;
pub use man::run_man;
pub use run::{run_mirror_command, RunOverrides};
pub use status::run_status;
