//! CLI command handlers. Each command is in its own file.

mod checksum;
mod completions;
mod exists;
mod fetch;
mod key;

pub use checksum::run_checksum;
pub use completions::run_completions;
pub use exists::run_exists;
pub use fetch::{run_fetch, FetchArgs};
pub use key::run_key;
