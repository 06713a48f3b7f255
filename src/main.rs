// src/main.rs

use std::process::ExitCode;

use nodeflow::errors::NodeflowError;
use nodeflow::{cli, logging, run};

/// Exit status for invalid flags, config or task list.
const EXIT_CONFIG: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("nodeflow error: {err:?}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(None) => ExitCode::SUCCESS,
        Ok(Some(summary)) => ExitCode::from(summary.exit_code() as u8),
        Err(err @ NodeflowError::ConfigError(_)) | Err(err @ NodeflowError::TomlError(_)) => {
            eprintln!("nodeflow error: {err}");
            ExitCode::from(EXIT_CONFIG)
        }
        Err(err) => {
            eprintln!("nodeflow error: {:?}", anyhow::Error::from(err));
            ExitCode::FAILURE
        }
    }
}
