use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui;

use crate::chart::scene::{
    build_dot_plot, build_streamgraph, DotPlotOptions, DotPlotScene, StreamOptions, StreamScene,
};
use crate::color::GenrePalette;
use crate::config::{ChartKind, ViewerConfig};
use crate::data::filter::{filtered_indices, FilterState};
use crate::data::loader::{load_file, LoadError};
use crate::data::model::{MovieDataset, RatingField};

// ---------------------------------------------------------------------------
// Load lifecycle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Nothing requested yet.
    #[default]
    Idle,
    Loading(PathBuf),
    Ready,
    Failed(String),
}

type LoadResult = (PathBuf, Result<MovieDataset, LoadError>);

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: ViewerConfig,

    /// Loaded dataset (None until a file finishes loading).
    pub dataset: Option<MovieDataset>,

    /// Current filter selection. Replaced, never edited, see [`Self::apply_filters`].
    pub filters: FilterState,

    /// Indices of records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Genre colours, fixed per dataset so colours survive filtering.
    pub palette: GenrePalette,

    pub chart: ChartKind,
    pub dot_plot: DotPlotOptions,
    pub stream: StreamOptions,

    pub load_state: LoadState,

    /// Whether the record table under the chart is open.
    pub show_table: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    pending: Option<Receiver<LoadResult>>,
    dot_scene: DotPlotScene,
    stream_scene: StreamScene,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl AppState {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            chart: config.chart,
            dot_plot: config.dot_plot,
            stream: config.stream,
            filters: FilterState::default().with_rating_field(config.rating_field),
            config,
            dataset: None,
            visible_indices: Vec::new(),
            palette: GenrePalette::new(std::iter::empty()),
            load_state: LoadState::Idle,
            show_table: true,
            status_message: None,
            pending: None,
            dot_scene: DotPlotScene::default(),
            stream_scene: StreamScene::default(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.load_state, LoadState::Loading(_))
    }

    /// Start reading `path` on a worker thread. `ctx` is poked when the
    /// result is ready so the UI wakes up to collect it.
    pub fn begin_load(&mut self, path: PathBuf, ctx: Option<egui::Context>) {
        let (tx, rx) = mpsc::channel();
        let worker_path = path.clone();
        thread::spawn(move || {
            let result = load_file(&worker_path);
            // The receiver is gone if another load replaced this one.
            let _ = tx.send((worker_path, result));
            if let Some(ctx) = ctx {
                ctx.request_repaint();
            }
        });

        log::info!("Loading {}", path.display());
        self.pending = Some(rx);
        self.load_state = LoadState::Loading(path);
        self.status_message = None;
    }

    /// Collect a finished load, if any. Returns `true` when the state changed.
    pub fn poll_load(&mut self) -> bool {
        let Some(rx) = &self.pending else {
            return false;
        };
        let (path, result) = match rx.try_recv() {
            Ok(done) => done,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                self.pending = None;
                self.fail("Loader stopped without a result".to_string());
                return true;
            }
        };
        self.pending = None;

        match result {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} movies with {} genres from {}",
                    dataset.len(),
                    dataset.genres.len(),
                    path.display()
                );
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.fail(format!("Error: {e}"));
            }
        }
        true
    }

    fn fail(&mut self, message: String) {
        self.status_message = Some(message.clone());
        self.load_state = LoadState::Failed(message);
    }

    /// Ingest a newly loaded dataset, initialise filters and colour.
    pub fn set_dataset(&mut self, dataset: MovieDataset) {
        self.filters = FilterState::for_dataset(&dataset, self.filters.rating_field);
        self.palette = GenrePalette::new(&dataset.genres);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.load_state = LoadState::Ready;
        self.refilter();
    }

    /// Swap in a new filter selection and rerun the pipeline.
    pub fn apply_filters(&mut self, filters: FilterState) {
        if filters == self.filters {
            return;
        }
        log::debug!("filters changed: {filters:?}");
        self.filters = filters;
        self.refilter();
    }

    /// Change the rating column, resetting the range to that column's extent.
    pub fn set_rating_field(&mut self, field: RatingField) {
        let Some(ds) = &self.dataset else {
            self.filters = self.filters.with_rating_field(field);
            return;
        };
        let fresh = FilterState::for_dataset(ds, field);
        let next = self
            .filters
            .with_rating_field(field)
            .with_rating_range(fresh.rating_range.min(), fresh.rating_range.max());
        self.apply_filters(next);
    }

    /// Select every genre of the dataset.
    pub fn select_all_genres(&mut self) {
        if let Some(ds) = &self.dataset {
            let next = self.filters.with_genres(ds.genres.iter().cloned());
            self.apply_filters(next);
        }
    }

    /// Empty the genre selection (no genre constraint).
    pub fn clear_genres(&mut self) {
        let next = self.filters.with_genres(Vec::<String>::new());
        self.apply_filters(next);
    }

    /// Recompute `visible_indices` and the scenes after any change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_indices = filtered_indices(&ds.records, &self.filters);
        }
        self.rebuild_scenes();
    }

    /// Rebuild both scenes from the cached indices. Call after changing
    /// chart options.
    pub fn rebuild_scenes(&mut self) {
        let Some(ds) = &self.dataset else {
            self.dot_scene = DotPlotScene::default();
            self.stream_scene = StreamScene::default();
            return;
        };
        self.dot_scene = build_dot_plot(&ds.records, &self.visible_indices, &self.palette, &self.dot_plot);
        self.stream_scene =
            build_streamgraph(&ds.records, &self.visible_indices, &self.palette, &self.stream);
    }

    pub fn dot_scene(&self) -> &DotPlotScene {
        &self.dot_scene
    }

    pub fn stream_scene(&self) -> &StreamScene {
        &self.stream_scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use crate::data::model::MovieRecord;

    fn dataset() -> MovieDataset {
        let movie = |title: &str, year, rating, genres: &[&str]| MovieRecord {
            id: format!("tt-{title}"),
            title: title.to_string(),
            year: Some(year),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            average_rating: rating,
            weighted_rating: rating,
            ..Default::default()
        };
        MovieDataset::from_records(vec![
            movie("a", 2000, 7.2, &["Drama"]),
            movie("b", 2000, 3.0, &["Comedy"]),
            movie("c", 2001, 8.0, &["Drama", "Comedy"]),
        ])
    }

    #[test]
    fn test_set_dataset_shows_everything() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        assert_eq!(state.load_state, LoadState::Ready);
        assert_eq!(state.visible_indices, vec![0, 1, 2]);
        assert_eq!(state.dot_scene().marks.len(), 3);
        assert_eq!(state.stream_scene().bands.len(), 2);
    }

    #[test]
    fn test_apply_filters_rebuilds_scenes() {
        let mut state = AppState::default();
        state.set_dataset(dataset());

        let next = state.filters.with_genres(["Comedy"]);
        state.apply_filters(next);
        assert_eq!(state.visible_indices, vec![1, 2]);
        assert_eq!(state.dot_scene().marks.len(), 2);

        state.apply_filters(state.filters.with_title("zzz"));
        assert!(state.visible_indices.is_empty());
        assert!(state.dot_scene().marks.is_empty());
        assert!(state.stream_scene().bands.is_empty());
    }

    #[test]
    fn test_genre_buttons() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        state.select_all_genres();
        assert_eq!(state.filters.genres.len(), 2);
        assert_eq!(state.visible_indices.len(), 3);
        state.clear_genres();
        assert!(state.filters.genres.is_empty());
        assert_eq!(state.visible_indices.len(), 3);
    }

    #[test]
    fn test_background_load() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("movies.csv");
        std::fs::write(&good, "primaryTitle,startYear,genres\nHeat,1995,\"Action,Crime\"\n").unwrap();

        let mut state = AppState::default();
        state.begin_load(good.clone(), None);
        assert!(state.is_loading());
        wait(&mut state);
        assert_eq!(state.load_state, LoadState::Ready);
        assert_eq!(state.dataset.as_ref().map(MovieDataset::len), Some(1));

        state.begin_load(dir.path().join("missing.csv"), None);
        wait(&mut state);
        assert!(matches!(state.load_state, LoadState::Failed(_)));
        assert!(state.status_message.is_some());
        // The previous dataset stays on screen.
        assert!(state.dataset.is_some());
    }

    fn wait(state: &mut AppState) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !state.poll_load() {
            assert!(Instant::now() < deadline, "load did not finish");
            std::thread::sleep(Duration::from_millis(5));
        }
    }
}
