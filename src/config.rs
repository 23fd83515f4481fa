use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::chart::scene::{DotPlotOptions, StreamOptions, IMDB_TITLE_BASE};
use crate::data::model::RatingField;

// ---------------------------------------------------------------------------
// Viewer configuration
// ---------------------------------------------------------------------------

/// Which chart the central panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    #[default]
    DotPlot,
    Streamgraph,
}

impl ChartKind {
    pub const ALL: [ChartKind; 2] = [ChartKind::DotPlot, ChartKind::Streamgraph];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::DotPlot => "Dot plot",
            ChartKind::Streamgraph => "Streamgraph",
        }
    }
}

/// Startup settings. Every field has a default, so a config file only
/// needs the keys it wants to change:
///
/// ```json
/// { "chart": "streamgraph", "stream": { "offset": "silhouette" } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Initial window size in points.
    pub window_size: [f32; 2],
    /// Dot radius in screen points.
    pub dot_radius: f32,
    pub chart: ChartKind,
    pub dot_plot: DotPlotOptions,
    pub stream: StreamOptions,
    /// Rating column the rating-range filter reads.
    pub rating_field: RatingField,
    /// Base URL for the title link opened on click.
    pub link_base: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_size: [1200.0, 800.0],
            dot_radius: 4.0,
            chart: ChartKind::default(),
            dot_plot: DotPlotOptions::default(),
            stream: StreamOptions::default(),
            rating_field: RatingField::default(),
            link_base: IMDB_TITLE_BASE.to_string(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parsing viewer config")
    }

    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
