use std::process::ExitCode;

use clap::Parser;
use super32_cli::Cli;

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match super32_cli::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
