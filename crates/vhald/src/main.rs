//! Entrypoint for the vehicle property service.
//!
//! Delegates to [`vhald::run_service`], which runs until a termination signal
//! arrives.

use std::io::{self, StderrLock, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    let Err(error) = vhald::run_service() else {
        return ExitCode::SUCCESS;
    };
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    // Nothing else can report a failed write to stderr.
    drop(writeln!(stderr, "vhald: {error}"));
    ExitCode::FAILURE
}
