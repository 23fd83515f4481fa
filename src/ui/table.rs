use eframe::egui::{Align, Hyperlink, Layout, Ui};
use egui_extras::{Column, TableBuilder};

use super::plot::{compact_number, format_rating};
use crate::chart::scene::title_url;
use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

/// Table of the records passing the current filters.
pub fn record_table(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };
    let rows = &state.visible_indices;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .column(Column::initial(240.0).at_least(120.0).clip(true))
        .column(Column::auto().at_least(40.0))
        .column(Column::initial(180.0).clip(true))
        .column(Column::initial(160.0).clip(true))
        .column(Column::auto().at_least(50.0))
        .column(Column::auto().at_least(60.0))
        .column(Column::remainder().at_least(70.0))
        .header(20.0, |mut header| {
            for name in ["Title", "Year", "Genres", "Director", "Rating", "Votes", "Box office"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                let Some(rec) = rows.get(row.index()).and_then(|&i| dataset.records.get(i)) else {
                    return;
                };
                row.col(|ui: &mut Ui| match title_url(&state.config.link_base, &rec.id) {
                    Some(url) => {
                        ui.add(Hyperlink::from_label_and_url(&rec.title, url).open_in_new_tab(true));
                    }
                    None => {
                        ui.label(&rec.title);
                    }
                });
                row.col(|ui: &mut Ui| {
                    ui.label(rec.year.map(|y| y.to_string()).unwrap_or_default());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(rec.genres_label());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&rec.director);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(format_rating(state.filters.rating_field.value(rec)));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(compact_number(rec.num_ratings as f64));
                });
                row.col(|ui: &mut Ui| {
                    if rec.box_office > 0.0 {
                        ui.label(format!("${}", compact_number(rec.box_office)));
                    }
                });
            });
        });
}
