use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::prelude::*;

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        error!("Exiting with an error...\n{err:?}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    if dotenvy::dotenv().is_err() {
        eprintln!("Dotenv config was not found, ignoring this...")
    }

    let colors = std::env::var("COLORS").map_or(true, |colors| colors != "0");

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(colors)
        .with_target(false)
        .without_time();

    let filter = tracing_subscriber::EnvFilter::try_from_env("XTASK_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .init();

    xtask::run()
}
