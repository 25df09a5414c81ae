use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;

use crate::commands::Command;

#[derive(Parser, Debug)]
#[command(name = "fis")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "FIS - pack a project into one text document and apply documents back")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_tracing()?;

    info!("CLI startup: {:?}", args.command);
    commands::run(args.command)
}

fn setup_tracing() -> Result<()> {
    use std::fs;
    use tracing_subscriber::fmt;

    let home = dirs::home_dir().context("Failed to get home directory")?;
    let trace_dir = home.join(".fis").join("trace");
    fs::create_dir_all(&trace_dir)?;

    let log_file = trace_dir.join("fis.log");
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .init();

    info!("Tracing initialized to {:?}", log_file);
    Ok(())
}
