//! JSON output for CLI commands

use std::io::{self, Write};

use serde::Serialize;

use super::errors::CliResult;

/// Write one JSON value as a line on stdout
pub fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer(&mut handle, value)?;
    writeln!(handle)?;
    handle.flush()?;
    Ok(())
}
