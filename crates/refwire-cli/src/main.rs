mod cli;
mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::Parser;
use refwire_server::logging;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    let log_dir = match &cli.command {
        Command::Serve(config) => config.file_log_dir(),
        _ => None,
    };
    let _guard = logging::init(log_dir.as_deref())?;

    commands::run(&cli.command).await
}
