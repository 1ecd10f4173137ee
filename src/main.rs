//! Levelsrc - Command-line tool for compiling plain-text level maps into level data

use std::process::ExitCode;

use levelsrc::cli;

fn main() -> ExitCode {
    cli::run()
}
