mod cli;
mod config;
mod output;
mod watch;

use std::process::ExitCode;

use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    info!("Starting lumberjack");

    match cli.execute().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::print_error(&err);
            ExitCode::FAILURE
        }
    }
}
