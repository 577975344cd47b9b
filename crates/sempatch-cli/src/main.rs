//! CLI entrypoint for the sempatch semantic patch tool.
//!
//! The binary delegates to [`sempatch_cli::run`], which loads configuration,
//! installs telemetry, and runs the requested command against files on disk.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    sempatch_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
