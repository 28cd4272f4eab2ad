//! CLI command implementations
//!
//! Register commands are written against the [`ymfbus_core::Transport`]
//! trait so they work with any backend combination the binary was built
//! with.

mod info;
mod list;
mod transaction;

pub use info::print_info;
pub use list::list_backends;
pub use transaction::{run_burst_write, run_read, run_reset, run_write};
