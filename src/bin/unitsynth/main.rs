//! unitsynth - terminal playing surface for the synthesis engine
//!
//! Run with: cargo run -- --preset bass

mod app;
mod keyboard;
mod ui;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing_subscriber::EnvFilter;

use app::Playground;

#[derive(Debug, Parser)]
#[command(name = "unitsynth", version, about = "Play the unit-chain synth from the terminal")]
pub struct Args {
    /// Factory preset to start with (lead, bass, pad, bell, noise_hat)
    #[arg(short, long, default_value = "lead")]
    pub preset: String,

    /// Bank image to load at start-up if present, and to save to with `s`
    #[arg(short, long, default_value = "unitsynth.bank")]
    pub bank: PathBuf,

    /// Log file; filter with RUST_LOG (default `info`)
    #[arg(short, long, default_value = "unitsynth.log")]
    pub log: PathBuf,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_tracing(&args.log)?;

    Playground::new(args)?.run()
}

/// Log to a file so the TUI owns the terminal.
fn init_tracing(path: &PathBuf) -> EyreResult<()> {
    let file = File::create(path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
