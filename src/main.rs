//! Mapsmith - Command-line tool for inspecting, rendering and editing PNG game maps

use std::process::ExitCode;

use mapsmith::cli;

fn main() -> ExitCode {
    cli::run()
}
