use eframe::egui::{self, Color32, ComboBox, RichText, ScrollArea, Slider, TextEdit, Ui};

use crate::chart::scene::YAxisMode;
use crate::chart::stack::{StackOffset, StackOrder};
use crate::config::ChartKind;
use crate::data::aggregate::{Measure, WithinYearOrder};
use crate::data::model::{NumericField, RatingField};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            chart_options(ui, state);
            ui.separator();
            filter_widgets(ui, state);
        });
}

/// Chart kind and layout options. Changes rebuild the scenes.
fn chart_options(ui: &mut Ui, state: &mut AppState) {
    let before = (state.chart, state.dot_plot, state.stream);

    ui.strong("Chart");
    ComboBox::from_id_salt("chart_kind")
        .selected_text(state.chart.label())
        .show_ui(ui, |ui: &mut Ui| {
            for kind in ChartKind::ALL {
                ui.selectable_value(&mut state.chart, kind, kind.label());
            }
        });

    match state.chart {
        ChartKind::DotPlot => {
            ui.label("Y axis");
            ComboBox::from_id_salt("y_axis")
                .selected_text(state.dot_plot.y_axis.label())
                .show_ui(ui, |ui: &mut Ui| {
                    let mut modes = vec![YAxisMode::Stacked];
                    modes.extend(NumericField::ALL.map(YAxisMode::Field));
                    for mode in modes {
                        ui.selectable_value(&mut state.dot_plot.y_axis, mode, mode.label());
                    }
                });
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Order in year");
                ui.radio_value(&mut state.dot_plot.order, WithinYearOrder::Title, "Title");
                ui.radio_value(&mut state.dot_plot.order, WithinYearOrder::Insertion, "File");
            });
        }
        ChartKind::Streamgraph => {
            ui.label("Value");
            ComboBox::from_id_salt("stream_measure")
                .selected_text(state.stream.measure.label())
                .show_ui(ui, |ui: &mut Ui| {
                    let mut measures = vec![Measure::Count];
                    measures.extend(NumericField::ALL.map(Measure::Sum));
                    for measure in measures {
                        ui.selectable_value(&mut state.stream.measure, measure, measure.label());
                    }
                });
            ui.label("Baseline");
            ComboBox::from_id_salt("stream_offset")
                .selected_text(state.stream.offset.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for offset in StackOffset::ALL {
                        ui.selectable_value(&mut state.stream.offset, offset, offset.label());
                    }
                });
            ui.label("Layer order");
            ComboBox::from_id_salt("stream_order")
                .selected_text(state.stream.order.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for order in StackOrder::ALL {
                        ui.selectable_value(&mut state.stream.order, order, order.label());
                    }
                });
        }
    }

    if before != (state.chart, state.dot_plot, state.stream) {
        state.rebuild_scenes();
    }
}

/// Values read back from the filter widgets in one frame.
#[derive(Debug, Clone, PartialEq)]
struct FilterEdits {
    years: (i32, i32),
    rating_field: RatingField,
    rating: (f64, f64),
    director: String,
    title: String,
    adult: Option<bool>,
}

/// Fold one frame of widget edits into the state. A rating-field switch is
/// applied first (it resets the rating range to the new column's extent);
/// the other edits still land in the same frame.
fn apply_edits(state: &mut AppState, edits: &FilterEdits) {
    let mut rating = edits.rating;
    if edits.rating_field != state.filters.rating_field {
        state.set_rating_field(edits.rating_field);
        rating = (state.filters.rating_range.min(), state.filters.rating_range.max());
    }
    let next = state
        .filters
        .with_year_range(edits.years.0, edits.years.1)
        .with_rating_range(rating.0, rating.1)
        .with_director(&edits.director)
        .with_title(&edits.title)
        .with_adult(edits.adult);
    state.apply_filters(next);
}

/// Every filter widget edits a local copy; the edits are handed to the state
/// once, before the genre list is drawn.
fn filter_widgets(ui: &mut Ui, state: &mut AppState) {
    let Some(ds) = &state.dataset else {
        return;
    };
    let (y_min, y_max) = ds.year_extent.unwrap_or((1900, 2030));
    let current = &state.filters;
    let mut edits = FilterEdits {
        years: (
            current.year_range.min().clamp(y_min, y_max),
            current.year_range.max().clamp(y_min, y_max),
        ),
        rating_field: current.rating_field,
        rating: (current.rating_range.min(), current.rating_range.max()),
        director: current.director.as_str().to_string(),
        title: current.title.as_str().to_string(),
        adult: current.adult,
    };

    // ---- Year range ----
    ui.strong("Year");
    ui.add(Slider::new(&mut edits.years.0, y_min..=y_max).text("from"));
    ui.add(Slider::new(&mut edits.years.1, y_min..=y_max).text("to"));

    // ---- Rating range ----
    ui.add_space(4.0);
    ui.strong("Rating");
    ui.horizontal(|ui: &mut Ui| {
        ui.radio_value(&mut edits.rating_field, RatingField::Weighted, "Weighted");
        ui.radio_value(&mut edits.rating_field, RatingField::Average, "Average");
    });
    ui.add(Slider::new(&mut edits.rating.0, 0.0..=10.0).step_by(0.1).text("min"));
    ui.add(Slider::new(&mut edits.rating.1, 0.0..=10.0).step_by(0.1).text("max"));

    // ---- Text searches ----
    ui.add_space(4.0);
    ui.strong("Director");
    ui.add(TextEdit::singleline(&mut edits.director).hint_text("e.g. nolan"));
    ui.strong("Title");
    ui.add(TextEdit::singleline(&mut edits.title).hint_text("search titles"));

    // ---- Adult flag ----
    ui.add_space(4.0);
    ui.strong("Adult titles");
    ComboBox::from_id_salt("adult_filter")
        .selected_text(adult_label(edits.adult))
        .show_ui(ui, |ui: &mut Ui| {
            for choice in [None, Some(false), Some(true)] {
                ui.selectable_value(&mut edits.adult, choice, adult_label(choice));
            }
        });

    apply_edits(state, &edits);

    // ---- Genres ----
    ui.add_space(4.0);
    ui.separator();
    let genres = state.palette.legend_entries();
    let header = format!("Genres  ({}/{})", state.filters.genres.len(), genres.len());
    ui.strong(header);
    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.select_all_genres();
        }
        if ui
            .small_button("Clear")
            .on_hover_text("No selection shows every genre.")
            .clicked()
        {
            state.clear_genres();
        }
    });

    for (genre, color) in &genres {
        let mut checked = state.filters.genres.contains(genre);
        if ui.checkbox(&mut checked, RichText::new(genre).color(*color)).changed() {
            let next = state.filters.with_genre_toggled(genre);
            state.apply_filters(next);
        }
    }
}

fn adult_label(adult: Option<bool>) -> &'static str {
    match adult {
        None => "Any",
        Some(false) => "Exclude",
        Some(true) => "Only",
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(ui.ctx(), state);
                ui.close_menu();
            }
        });

        ui.separator();

        if state.is_loading() {
            ui.spinner();
            ui.label("Loading…");
        } else if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} movies loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        ui.separator();

        ui.toggle_value(&mut state.show_table, "Table");

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(ctx: &egui::Context, state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open movie data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.begin_load(path, Some(ctx.clone()));
    }
}
