use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Interpreter for the RPAL functional language.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Path to the RPAL source file
    source: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let source = fs::read_to_string(&args.source)
        .with_context(|| format!("cannot read {}", args.source.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Err(error) = rpal::evaluate(&source, &mut out) {
        out.flush().ok();
        eprintln!("{error}");
        process::exit(1);
    }

    Ok(())
}
