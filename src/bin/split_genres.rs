use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use marquee::data::genre::split_genre_column;

/// Explode a CSV's comma-separated `genres` column into one row per genre.
#[derive(Debug, Parser)]
#[command(name = "split-genres", version, about)]
struct Cli {
    /// Input CSV with a `genres` column.
    input: PathBuf,

    /// Output CSV.
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let input = File::open(&cli.input).with_context(|| format!("opening {}", cli.input.display()))?;
    let output =
        File::create(&cli.output).with_context(|| format!("creating {}", cli.output.display()))?;

    let rows = split_genre_column(BufReader::new(input), BufWriter::new(output))
        .with_context(|| format!("splitting genres of {}", cli.input.display()))?;
    log::info!("Wrote {rows} rows to {}", cli.output.display());
    Ok(())
}
