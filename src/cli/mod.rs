//! CLI module
//!
//! Provides command-line interface for:
//! - start: load resources and serve HTTP
//! - check: validate configuration and resource definitions

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, load_resources, run, run_command, start};
pub use errors::{CliError, CliErrorCode, CliResult};
