mod cli;
pub mod commands;
pub mod core;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::CliArgs;
use crate::core::state::AppState;

pub fn run() -> ExitCode {
    let args = CliArgs::parse();

    // Initialize structured logging; RUST_LOG wins over -v
    let default_filter = match args.verbose {
        0 => "warn",
        1 => "info,ideconfig_lib=debug",
        _ => "debug,ideconfig_lib=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("IDE Config Helper {} starting...", commands::APP_VERSION);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let CliArgs {
        json,
        data_dir,
        command,
        ..
    } = args;
    let result = runtime.block_on(async move {
        let mut state = AppState::new(data_dir)?;
        command.run(&mut state, json).await
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {:?}", e);
            if json {
                let body = serde_json::json!({ "error": e });
                eprintln!("{body}");
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}
