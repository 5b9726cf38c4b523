//! Binary entrypoint for the Burnish pipeline driver.

use std::process::ExitCode;

fn main() -> ExitCode {
    burnish_cli::run(std::env::args_os())
}
