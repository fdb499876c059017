//! `ramdisk` binary.

use std::process::ExitCode;

use clap::Parser;
use ramdisk_cli::{Cli, Output, logging, run};

fn main() -> ExitCode {
    // clap handles --help and --version
    let cli = Cli::parse();
    logging::init_logging(cli.log_format);

    match run(&cli) {
        Ok(Output::Json(value)) => match serde_json::to_string_pretty(&value) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            },
            Err(e) => {
                eprintln!("error: failed to render output: {e}");
                ExitCode::FAILURE
            },
        },
        Ok(Output::Text(text)) => {
            print!("{text}");
            ExitCode::SUCCESS
        },
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            match e.error_code() {
                Some(code) => eprintln!("error [{code}]: {e}"),
                None => eprintln!("error: {e}"),
            }
            ExitCode::FAILURE
        },
    }
}
