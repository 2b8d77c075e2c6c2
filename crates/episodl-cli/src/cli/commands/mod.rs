//! CLI command handlers, one file per command.

mod completions;
mod download;
mod report;
mod serve;
mod status;

pub use completions::run_completions;
pub use download::run_download;
pub use serve::run_serve;
pub use status::run_status;
