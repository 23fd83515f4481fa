use std::path::PathBuf;

use eframe::egui;

use crate::config::ViewerConfig;
use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct MarqueeApp {
    pub state: AppState,
}

impl MarqueeApp {
    /// Build the app, starting a load of `initial` if given.
    pub fn new(cc: &eframe::CreationContext<'_>, config: ViewerConfig, initial: Option<PathBuf>) -> Self {
        let mut state = AppState::new(config);
        if let Some(path) = initial {
            state.begin_load(path, Some(cc.egui_ctx.clone()));
        }
        Self { state }
    }
}

impl eframe::App for MarqueeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_load();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: record table ----
        if self.state.show_table && self.state.dataset.is_some() {
            egui::TopBottomPanel::bottom("record_table")
                .default_height(220.0)
                .resizable(true)
                .show(ctx, |ui| {
                    table::record_table(ui, &self.state);
                });
        }

        // ---- Central panel: chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::movie_chart(ui, &self.state);
        });
    }
}
