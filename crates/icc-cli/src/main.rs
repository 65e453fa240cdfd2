//! CLI entrypoint for the `iccdrvr.tsk` session client.
//!
//! The binary delegates to [`icc_cli::run`], which loads configuration,
//! spawns one driver session, runs a single verb and prints its result.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    icc_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
