use std::collections::HashMap;

use eframe::egui::{self, Align2, Color32, RichText, Stroke, Ui};
use egui_plot::{GridMark, Legend, MarkerShape, Plot, PlotPoint, PlotPoints, Points, Polygon, Text};

use crate::chart::scene::{title_url, DotPlotScene, StreamPoint, StreamScene};
use crate::config::ChartKind;
use crate::data::model::{MovieDataset, MovieRecord};
use crate::state::AppState;

/// Most year labels drawn under a chart before they are thinned out.
const MAX_YEAR_LABELS: usize = 25;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the active chart in the central panel.
pub fn movie_chart(ui: &mut Ui, state: &AppState) {
    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a file to explore movies  (File → Open…)");
            });
            return;
        }
    };

    if state.visible_indices.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No movies match the current filters.");
        });
        return;
    }

    match state.chart {
        ChartKind::DotPlot => dot_plot(ui, state, dataset, state.dot_scene()),
        ChartKind::Streamgraph => streamgraph(ui, state.stream_scene()),
    }
}

// ---------------------------------------------------------------------------
// Dot plot
// ---------------------------------------------------------------------------

fn dot_plot(ui: &mut Ui, state: &AppState, dataset: &MovieDataset, scene: &DotPlotScene) {
    let radius = state.config.dot_radius;
    let y_scale = scene.y_scale;

    let response = Plot::new("dot_plot")
        .legend(Legend::default())
        .y_axis_label(scene.y_label.clone())
        .show_axes([false, true])
        .show_x(false)
        .show_y(false)
        .include_x(0.0)
        .include_x(scene.extent.width)
        .include_y(0.0)
        .include_y(scene.extent.height)
        .y_axis_formatter(move |mark: GridMark, _range: &std::ops::RangeInclusive<f64>| {
            y_scale
                .map(|s| compact_number(s.invert(mark.value)))
                .unwrap_or_default()
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            // One Points item per genre so the legend can toggle them.
            let mut slot: HashMap<&str, usize> = HashMap::new();
            let mut series: Vec<(&str, Color32, Vec<[f64; 2]>)> = Vec::new();
            for mark in &scene.marks {
                let genre = dataset.records[mark.record].primary_genre().unwrap_or("(no genre)");
                let i = *slot.entry(genre).or_insert_with(|| {
                    series.push((genre, mark.color, Vec::new()));
                    series.len() - 1
                });
                series[i].2.push([mark.x, mark.y]);
            }
            for (genre, color, points) in series {
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(genre)
                        .color(color)
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(radius),
                );
            }

            for (x, year) in thinned(&scene.year_ticks) {
                plot_ui.text(
                    Text::new(PlotPoint::new(x, 0.0), year.to_string())
                        .anchor(Align2::CENTER_TOP)
                        .color(Color32::GRAY),
                );
            }

            let pointer = plot_ui.pointer_coordinate()?;
            let [dx, dy] = plot_ui.transform().dvalue_dpos();
            let reach = f64::from(radius + 2.0);
            let hovered = scene.hit_test([pointer.x, pointer.y], [reach * dx.abs(), reach * dy.abs()])?;
            let mark = scene.marks[hovered];
            plot_ui.points(
                Points::new(PlotPoints::from(vec![[mark.x, mark.y]]))
                    .color(mark.color)
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius(radius * 1.8),
            );
            Some(mark.record)
        });

    let Some(record) = response.inner.map(|i| &dataset.records[i]) else {
        return;
    };
    let plot_response = response.response;
    if plot_response.clicked() {
        match title_url(&state.config.link_base, &record.id) {
            Some(url) => {
                log::info!("Opening {url}");
                ui.ctx().open_url(egui::OpenUrl::new_tab(url));
            }
            None => log::warn!("{} has no title id to link to", record.title),
        }
    }
    plot_response.on_hover_ui_at_pointer(|ui: &mut Ui| movie_tooltip(ui, record));
}

fn movie_tooltip(ui: &mut Ui, record: &MovieRecord) {
    ui.strong(&record.title);
    if let Some(year) = record.year {
        ui.label(year.to_string());
    }
    if !record.genres.is_empty() {
        ui.label(record.genres_label());
    }
    if !record.director.is_empty() {
        ui.label(format!("Directed by {}", record.director));
    }
    ui.label(format!(
        "Rating {} (weighted {}) from {} votes",
        format_rating(record.average_rating),
        format_rating(record.weighted_rating),
        compact_number(record.num_ratings as f64),
    ));
    if record.box_office > 0.0 {
        ui.label(format!("Box office ${}", compact_number(record.box_office)));
    }
    if !record.id.is_empty() {
        ui.label(RichText::new("Click to open the title page").weak());
    }
}

// ---------------------------------------------------------------------------
// Streamgraph
// ---------------------------------------------------------------------------

fn streamgraph(ui: &mut Ui, scene: &StreamScene) {
    let x_scale = scene.x_scale;
    // Single-year bands become a narrow bar of this half-width.
    let half_width = scene.extent.width * 0.01;

    let response = Plot::new("streamgraph")
        .legend(Legend::default())
        .x_axis_label("Year")
        .show_axes([true, false])
        .show_x(false)
        .show_y(false)
        .x_axis_formatter(move |mark: GridMark, _range: &std::ops::RangeInclusive<f64>| {
            x_scale
                .map(|s| format!("{:.0}", s.invert(mark.value)))
                .unwrap_or_default()
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let hovered = plot_ui
                .pointer_coordinate()
                .and_then(|p| scene.hit_test([p.x, p.y]));

            for (b, band) in scene.bands.iter().enumerate() {
                let highlight = hovered.is_some_and(|(hb, _)| hb == b);
                for quad in band_quads(&band.points, half_width) {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(quad.to_vec()))
                            .name(&band.genre)
                            .fill_color(band.color)
                            .stroke(Stroke::new(1.0, band.color))
                            .highlight(highlight),
                    );
                }
            }
            hovered
        });

    let Some((b, column)) = response.inner else {
        return;
    };
    let band = &scene.bands[b];
    let Some(point) = band.points.get(column) else {
        return;
    };
    let label = scene.measure_label.clone();
    response.response.on_hover_ui_at_pointer(|ui: &mut Ui| {
        ui.strong(RichText::new(&band.genre).color(band.color));
        ui.label(point.year.to_string());
        ui.label(format!("{label}: {}", compact_number(point.value)));
    });
}

/// Split a band into one convex quad per pair of adjacent years. A band with
/// a single year becomes a rectangle of `half_width` either side.
fn band_quads(points: &[StreamPoint], half_width: f64) -> Vec<[[f64; 2]; 4]> {
    if let [p] = points {
        if p.y1 <= p.y0 {
            return Vec::new();
        }
        return vec![[
            [p.x - half_width, p.y0],
            [p.x + half_width, p.y0],
            [p.x + half_width, p.y1],
            [p.x - half_width, p.y1],
        ]];
    }
    points
        .windows(2)
        .filter(|w| w[0].y1 > w[0].y0 || w[1].y1 > w[1].y0)
        .map(|w| {
            let (a, b) = (w[0], w[1]);
            [[a.x, a.y0], [b.x, b.y0], [b.x, b.y1], [a.x, a.y1]]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Keep at most [`MAX_YEAR_LABELS`] evenly spaced ticks.
fn thinned(ticks: &[(f64, i32)]) -> impl Iterator<Item = (f64, i32)> + '_ {
    let stride = ticks.len().div_ceil(MAX_YEAR_LABELS).max(1);
    ticks.iter().copied().step_by(stride)
}

/// `1234567.0` → `"1.2M"`.
pub fn compact_number(v: f64) -> String {
    if !v.is_finite() {
        return "–".to_string();
    }
    let abs = v.abs();
    let (scaled, suffix) = if abs >= 1e9 {
        (v / 1e9, "B")
    } else if abs >= 1e6 {
        (v / 1e6, "M")
    } else if abs >= 1e3 {
        (v / 1e3, "k")
    } else {
        (v, "")
    };
    let text = format!("{scaled:.1}");
    let text = text.strip_suffix(".0").unwrap_or(&text);
    format!("{text}{suffix}")
}

pub fn format_rating(v: f64) -> String {
    if v.is_finite() {
        format!("{v:.1}")
    } else {
        "–".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_number() {
        assert_eq!(compact_number(0.0), "0");
        assert_eq!(compact_number(7.24), "7.2");
        assert_eq!(compact_number(1500.0), "1.5k");
        assert_eq!(compact_number(2_000_000.0), "2M");
        assert_eq!(compact_number(1_004_558_444.0), "1B");
        assert_eq!(compact_number(-3_400_000.0), "-3.4M");
        assert_eq!(compact_number(f64::NAN), "–");
    }

    #[test]
    fn test_format_rating() {
        assert_eq!(format_rating(8.04), "8.0");
        assert_eq!(format_rating(f64::NAN), "–");
    }

    #[test]
    fn test_thinned_ticks() {
        let ticks: Vec<(f64, i32)> = (0..100).map(|i| (i as f64, 1900 + i)).collect();
        let kept: Vec<_> = thinned(&ticks).collect();
        assert_eq!(kept.len(), 25);
        assert_eq!(kept[1], (4.0, 1904));

        let few = [(0.0, 2000), (1.0, 2001)];
        assert_eq!(thinned(&few).count(), 2);
    }

    #[test]
    fn test_band_quads() {
        let point = |x: f64, y0: f64, y1: f64| StreamPoint { year: x as i32, value: y1 - y0, x, y0, y1 };

        let quads = band_quads(&[point(0.0, 0.0, 1.0), point(1.0, 0.0, 0.0), point(2.0, 0.0, 0.0)], 0.5);
        assert_eq!(quads, vec![[[0.0, 0.0], [1.0, 0.0], [1.0, 0.0], [0.0, 1.0]]]);

        let single = band_quads(&[point(3.0, 1.0, 2.0)], 0.5);
        assert_eq!(single, vec![[[2.5, 1.0], [3.5, 1.0], [3.5, 2.0], [2.5, 2.0]]]);
        assert!(band_quads(&[point(3.0, 1.0, 1.0)], 0.5).is_empty());
    }
}
