use std::process::ExitCode;

use ansi_term::Colour;
use tracing::error;
use tracktime::cli::run_cli;

#[tokio::main]
async fn main() -> ExitCode {
    match run_cli().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error running cli {e:?}");
            eprintln!("{} {e:#}", Colour::Red.bold().paint("error:"));
            ExitCode::FAILURE
        }
    }
}
