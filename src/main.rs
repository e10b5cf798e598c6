// src/main.rs

use std::process::ExitCode;

use gifski_command::errors::ExecError;
use gifski_command::{cli, logging, run};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("gifski-command error: {err:?}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("gifski-command error: {err:?}");
            exit_code_for(&err)
        }
    }
}

/// Mirror gifski's own exit code when it failed; 1 for everything else.
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<ExecError>() {
        Some(ExecError::ProcessFailed { code, .. }) => u8::try_from(*code)
            .ok()
            .filter(|c| *c != 0)
            .map_or(ExitCode::FAILURE, ExitCode::from),
        _ => ExitCode::FAILURE,
    }
}
