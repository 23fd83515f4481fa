use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use eframe::egui;

use marquee::app::MarqueeApp;
use marquee::config::ViewerConfig;

/// Explore a movie dataset as a dot plot or streamgraph.
#[derive(Debug, Parser)]
#[command(name = "marquee", version, about)]
struct Cli {
    /// CSV, JSON or Parquet file to open at startup.
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// JSON file with viewer settings.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Marquee – Movie Explorer",
        options,
        Box::new(move |cc| Ok(Box::new(MarqueeApp::new(cc, config, cli.data)))),
    )
    .map_err(|e| anyhow!("eframe error: {e}"))
}
