use serde::{Deserialize, Serialize};

use eframe::egui::Color32;

use super::scale::{BandScale, Extent, LinearScale};
use super::stack::{stack_table, StackOffset, StackOrder};
use crate::color::GenrePalette;
use crate::data::aggregate::{
    group_by_genre_then_year, group_indices_by_year, Measure, WithinYearOrder,
};
use crate::data::model::{MovieRecord, NumericField};

/// Base of the outbound title links.
pub const IMDB_TITLE_BASE: &str = "https://www.imdb.com/title/";

/// `https://www.imdb.com/title/<id>/`, or `None` for records without an id.
pub fn title_url(base: &str, id: &str) -> Option<String> {
    let id = id.trim();
    if id.is_empty() {
        return None;
    }
    Some(format!("{}/{id}/", base.trim_end_matches('/')))
}

pub fn imdb_url(id: &str) -> Option<String> {
    title_url(IMDB_TITLE_BASE, id)
}

// ---------------------------------------------------------------------------
// Dot plot
// ---------------------------------------------------------------------------

/// Vertical placement of dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "field")]
pub enum YAxisMode {
    /// Dots piled up in their year column.
    #[default]
    Stacked,
    /// Dots at the value of a numeric field.
    Field(NumericField),
}

impl YAxisMode {
    pub fn label(self) -> String {
        match self {
            YAxisMode::Stacked => "Movies per year".to_string(),
            YAxisMode::Field(field) => field.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DotPlotOptions {
    pub extent: Extent,
    pub y_axis: YAxisMode,
    pub order: WithinYearOrder,
    /// Fraction of each year column left empty.
    pub band_padding: f64,
}

impl Default for DotPlotOptions {
    fn default() -> Self {
        Self {
            extent: Extent::default(),
            y_axis: YAxisMode::default(),
            order: WithinYearOrder::default(),
            band_padding: 0.1,
        }
    }
}

/// One circle, standing for one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotMark {
    /// Index into the dataset's records.
    pub record: usize,
    pub x: f64,
    pub y: f64,
    pub color: Color32,
}

#[derive(Debug, Clone, Default)]
pub struct DotPlotScene {
    pub marks: Vec<DotMark>,
    /// Band centre and label for each year column.
    pub year_ticks: Vec<(f64, i32)>,
    /// Maps values (or pile height in `Stacked` mode) to y.
    pub y_scale: Option<LinearScale>,
    pub y_label: String,
    pub extent: Extent,
}

/// Lay out one dot per filtered record.
///
/// `indices` selects the records to draw (the filter output). Records without
/// a year have no column and are skipped; in `Field` mode a non-finite value
/// sits on the baseline.
pub fn build_dot_plot(
    records: &[MovieRecord],
    indices: &[usize],
    palette: &GenrePalette,
    options: &DotPlotOptions,
) -> DotPlotScene {
    let Extent { width, height } = options.extent;
    let groups = group_indices_by_year(records, indices, options.order);
    let band = BandScale::new(groups.keys().copied(), [0.0, width], options.band_padding);

    let mut scene = DotPlotScene {
        y_label: options.y_axis.label(),
        extent: options.extent,
        year_ticks: groups
            .keys()
            .filter_map(|y| band.center(y).map(|c| (c, *y)))
            .collect(),
        ..DotPlotScene::default()
    };
    if groups.is_empty() {
        return scene;
    }

    let y_of: Box<dyn Fn(usize, &MovieRecord) -> f64> = match options.y_axis {
        YAxisMode::Stacked => {
            let tallest = groups.values().map(Vec::len).max().unwrap_or(1).max(1);
            let slot = height / tallest as f64;
            scene.y_scale = Some(LinearScale::new([0.0, tallest as f64], [0.0, height]));
            Box::new(move |n: usize, _: &MovieRecord| (n as f64 + 0.5) * slot)
        }
        YAxisMode::Field(field) => {
            let scale = LinearScale::from_values(
                groups.values().flatten().map(|&i| field.value(&records[i])),
                [0.0, height],
            );
            // Counts and money read from zero; ratings use their own spread.
            let scale = match field {
                NumericField::NumRatings | NumericField::BoxOffice => scale.with_zero(),
                NumericField::AverageRating | NumericField::WeightedRating => scale,
            };
            scene.y_scale = Some(scale);
            Box::new(move |_: usize, rec: &MovieRecord| {
                let v = field.value(rec);
                if v.is_finite() { scale.map(v) } else { 0.0 }
            })
        }
    };

    for (year, group) in &groups {
        let Some(x) = band.center(year) else { continue };
        for (n, &record) in group.iter().enumerate() {
            let rec = &records[record];
            scene.marks.push(DotMark {
                record,
                x,
                y: y_of(n, rec),
                color: palette.color_for_optional(rec.primary_genre()),
            });
        }
    }
    scene
}

impl DotPlotScene {
    /// Nearest mark within `reach` of `point`. `reach` is the hit radius per
    /// axis, so non-square plot transforms still hit round dots.
    pub fn hit_test(&self, point: [f64; 2], reach: [f64; 2]) -> Option<usize> {
        let [rx, ry] = reach;
        if !(rx > 0.0 && ry > 0.0) {
            return None;
        }
        self.marks
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let dx = (m.x - point[0]) / rx;
                let dy = (m.y - point[1]) / ry;
                (i, dx * dx + dy * dy)
            })
            .filter(|(_, d)| *d <= 1.0)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }
}

// ---------------------------------------------------------------------------
// Streamgraph
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamOptions {
    pub extent: Extent,
    pub measure: Measure,
    pub order: StackOrder,
    pub offset: StackOffset,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            extent: Extent::default(),
            measure: Measure::default(),
            order: StackOrder::default(),
            offset: StackOffset::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamPoint {
    pub year: i32,
    /// Aggregated value before stacking.
    pub value: f64,
    pub x: f64,
    pub y0: f64,
    pub y1: f64,
}

/// One genre layer.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamBand {
    pub genre: String,
    pub color: Color32,
    pub rank: usize,
    pub points: Vec<StreamPoint>,
}

#[derive(Debug, Clone, Default)]
pub struct StreamScene {
    /// Bands in first-seen genre order.
    pub bands: Vec<StreamBand>,
    pub year_ticks: Vec<(f64, i32)>,
    /// Maps years to x.
    pub x_scale: Option<LinearScale>,
    pub measure_label: String,
    pub extent: Extent,
}

/// Roll up the filtered records by genre and year, stack, and scale into the extent.
pub fn build_streamgraph(
    records: &[MovieRecord],
    indices: &[usize],
    palette: &GenrePalette,
    options: &StreamOptions,
) -> StreamScene {
    let Extent { width, height } = options.extent;
    let table = group_by_genre_then_year(indices.iter().filter_map(|&i| records.get(i)), options.measure);
    let mut scene = StreamScene {
        measure_label: options.measure.label(),
        extent: options.extent,
        ..StreamScene::default()
    };
    if table.is_empty() {
        return scene;
    }

    let years = table.years();
    let x = LinearScale::from_values(years.iter().map(|&y| f64::from(y)), [0.0, width]);
    let stacked = stack_table(&table, options.order, options.offset);
    let y = LinearScale::from_values(
        stacked.iter().flat_map(|s| s.spans.iter().flat_map(|span| [span[0], span[1]])),
        [0.0, height],
    );

    scene.year_ticks = years.iter().map(|&yr| (x.map(f64::from(yr)), yr)).collect();
    scene.x_scale = Some(x);
    scene.bands = stacked
        .into_iter()
        .enumerate()
        .map(|(g, series)| StreamBand {
            color: palette.color_for(&series.key),
            rank: series.rank,
            points: years
                .iter()
                .zip(&series.spans)
                .map(|(&yr, span)| StreamPoint {
                    year: yr,
                    value: table.value(g, yr),
                    x: x.map(f64::from(yr)),
                    y0: y.map(span[0]),
                    y1: y.map(span[1]),
                })
                .collect(),
            genre: series.key,
        })
        .collect();
    scene
}

impl StreamScene {
    /// Band under `point`, judged at the nearest year column.
    pub fn hit_test(&self, point: [f64; 2]) -> Option<(usize, usize)> {
        let column = self
            .year_ticks
            .iter()
            .enumerate()
            .min_by(|a, b| (a.1 .0 - point[0]).abs().total_cmp(&(b.1 .0 - point[0]).abs()))
            .map(|(j, _)| j)?;
        self.bands
            .iter()
            .position(|band| {
                band.points
                    .get(column)
                    .is_some_and(|p| p.y1 > p.y0 && p.y0 <= point[1] && point[1] <= p.y1)
            })
            .map(|b| (b, column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: &str, title: &str, year: i32, rating: f64, genres: &[&str]) -> MovieRecord {
        MovieRecord {
            id: id.to_string(),
            title: title.to_string(),
            year: Some(year),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            average_rating: rating,
            weighted_rating: rating,
            ..Default::default()
        }
    }

    fn records() -> Vec<MovieRecord> {
        vec![
            movie("tt1", "b", 2000, 7.0, &["Drama"]),
            movie("tt2", "a", 2000, 5.0, &["Comedy"]),
            movie("tt3", "c", 2001, 9.0, &["Drama", "Comedy"]),
        ]
    }

    fn palette(records: &[MovieRecord]) -> GenrePalette {
        GenrePalette::new(records.iter().flat_map(|r| &r.genres))
    }

    #[test]
    fn test_title_url() {
        assert_eq!(imdb_url("tt0468569").as_deref(), Some("https://www.imdb.com/title/tt0468569/"));
        assert_eq!(title_url("http://example.com/t", "x").as_deref(), Some("http://example.com/t/x/"));
        assert_eq!(imdb_url("  "), None);
    }

    #[test]
    fn test_one_dot_per_record() {
        let recs = records();
        let options = DotPlotOptions {
            extent: Extent { width: 200.0, height: 100.0 },
            band_padding: 0.0,
            ..DotPlotOptions::default()
        };
        let scene = build_dot_plot(&recs, &[0, 1, 2], &palette(&recs), &options);
        assert_eq!(scene.marks.len(), 3);
        assert_eq!(scene.year_ticks, vec![(50.0, 2000), (150.0, 2001)]);

        // Title order inside 2000: "a" (record 1) sits below "b" (record 0).
        assert_eq!(scene.marks[0].record, 1);
        assert_eq!(scene.marks[0].y, 25.0);
        assert_eq!(scene.marks[1].record, 0);
        assert_eq!(scene.marks[1].y, 75.0);
        assert_eq!(scene.marks[2].x, 150.0);
        assert_eq!(scene.marks[1].color, palette(&recs).color_for("Drama"));
        assert_eq!(scene.y_scale.map(|s| s.domain()), Some([0.0, 2.0]));
    }

    #[test]
    fn test_field_mode_uses_value_scale() {
        let recs = records();
        let options = DotPlotOptions {
            extent: Extent { width: 200.0, height: 100.0 },
            y_axis: YAxisMode::Field(NumericField::AverageRating),
            ..DotPlotOptions::default()
        };
        let scene = build_dot_plot(&recs, &[0, 2], &palette(&recs), &options);
        assert_eq!(scene.marks.len(), 2);
        assert_eq!(scene.marks[0].y, 0.0);
        assert_eq!(scene.marks[1].y, 100.0);
        assert_eq!(scene.y_scale.map(|s| s.domain()), Some([7.0, 9.0]));
    }

    #[test]
    fn test_empty_selection_yields_no_marks() {
        let recs = records();
        for y_axis in [YAxisMode::Stacked, YAxisMode::Field(NumericField::BoxOffice)] {
            let options = DotPlotOptions {
                y_axis,
                ..DotPlotOptions::default()
            };
            let scene = build_dot_plot(&recs, &[], &palette(&recs), &options);
            assert!(scene.marks.is_empty());
            assert!(scene.year_ticks.is_empty());
        }
        let stream = build_streamgraph(&recs, &[], &palette(&recs), &StreamOptions::default());
        assert!(stream.bands.is_empty());
    }

    #[test]
    fn test_dot_hit_test() {
        let recs = records();
        let scene = build_dot_plot(&recs, &[0, 1, 2], &palette(&recs), &DotPlotOptions::default());
        let target = scene.marks[2];
        assert_eq!(scene.hit_test([target.x + 1.0, target.y], [5.0, 5.0]), Some(2));
        assert_eq!(scene.hit_test([target.x + 50.0, target.y], [5.0, 5.0]), None);
        assert_eq!(scene.hit_test([target.x, target.y], [0.0, 5.0]), None);
    }

    #[test]
    fn test_streamgraph_bands() {
        let recs = records();
        let options = StreamOptions {
            extent: Extent { width: 100.0, height: 50.0 },
            measure: Measure::Count,
            order: StackOrder::None,
            offset: StackOffset::None,
        };
        let scene = build_streamgraph(&recs, &[0, 1, 2], &palette(&recs), &options);
        assert_eq!(scene.bands.len(), 2);
        assert_eq!(scene.bands[0].genre, "Drama");
        assert_eq!(scene.year_ticks, vec![(0.0, 2000), (100.0, 2001)]);
        assert_eq!(scene.x_scale.map(|s| s.invert(50.0)), Some(2000.5));

        // Two movies per year in total, so the top edge touches the extent.
        let top = &scene.bands[1].points;
        assert_eq!(top[0].y1, 50.0);
        assert_eq!(top[1].y1, 50.0);
        assert_eq!(scene.bands[0].points[0].y0, 0.0);
        assert_eq!(scene.bands[0].points[0].value, 1.0);

        assert_eq!(scene.hit_test([10.0, 10.0]), Some((0, 0)));
        assert_eq!(scene.hit_test([90.0, 40.0]), Some((1, 1)));
    }
}
