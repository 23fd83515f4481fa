//! Stacked layout for the streamgraph.
//!
//! Layers are stacked in an order chosen by [`StackOrder`], then shifted by
//! a baseline chosen by [`StackOffset`]. Both follow the d3-shape
//! definitions so charts match the ones people know from the web.

use serde::{Deserialize, Serialize};

use crate::data::aggregate::GenreYearTable;

/// Lower and upper edge of one layer at one x position.
pub type Span = [f64; 2];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackOrder {
    /// Input order (first-seen genre at the bottom).
    #[default]
    None,
    /// Layers peaking earliest sit in the middle, later ones alternate
    /// outwards. Pairs well with [`StackOffset::Wiggle`].
    InsideOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackOffset {
    /// Zero baseline.
    None,
    /// Normalise each column to [0, 1].
    Expand,
    /// Centre each column around zero.
    Silhouette,
    /// Minimise the weighted change in slope between layers.
    #[default]
    Wiggle,
}

impl StackOrder {
    pub const ALL: [StackOrder; 2] = [StackOrder::None, StackOrder::InsideOut];

    pub fn label(self) -> &'static str {
        match self {
            StackOrder::None => "Insertion",
            StackOrder::InsideOut => "Inside-out",
        }
    }

    /// Series indices from bottom to top.
    pub fn indices(self, series: &[Vec<Span>]) -> Vec<usize> {
        match self {
            StackOrder::None => (0..series.len()).collect(),
            StackOrder::InsideOut => inside_out(series),
        }
    }
}

impl StackOffset {
    pub const ALL: [StackOffset; 4] = [
        StackOffset::None,
        StackOffset::Expand,
        StackOffset::Silhouette,
        StackOffset::Wiggle,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StackOffset::None => "Zero",
            StackOffset::Expand => "Expand",
            StackOffset::Silhouette => "Silhouette",
            StackOffset::Wiggle => "Wiggle",
        }
    }

    fn apply(self, series: &mut [Vec<Span>], order: &[usize]) {
        match self {
            StackOffset::None => offset_none(series, order),
            StackOffset::Expand => offset_expand(series, order),
            StackOffset::Silhouette => offset_silhouette(series, order),
            StackOffset::Wiggle => offset_wiggle(series, order),
        }
    }
}

/// One stacked layer.
#[derive(Debug, Clone, PartialEq)]
pub struct StackSeries {
    pub key: String,
    /// Position in the stack, 0 at the bottom.
    pub rank: usize,
    pub spans: Vec<Span>,
}

/// Stack rows of values (`values[layer][x]`). Output keeps the input layer
/// order; non-finite values count as zero.
pub fn stack_values(values: &[Vec<f64>], order: StackOrder, offset: StackOffset) -> (Vec<Vec<Span>>, Vec<usize>) {
    let m = values.iter().map(Vec::len).max().unwrap_or(0);
    let mut series: Vec<Vec<Span>> = values
        .iter()
        .map(|row| {
            (0..m)
                .map(|j| {
                    let v = row.get(j).copied().unwrap_or(0.0);
                    [0.0, if v.is_finite() { v } else { 0.0 }]
                })
                .collect()
        })
        .collect();

    let ord = order.indices(&series);
    offset.apply(&mut series, &ord);
    (series, ord)
}

/// Stack a genre/year table: one layer per genre, one span per year in
/// [`GenreYearTable::years`].
pub fn stack_table(table: &GenreYearTable, order: StackOrder, offset: StackOffset) -> Vec<StackSeries> {
    let (series, ord) = stack_values(&table.dense_rows(), order, offset);
    let mut rank = vec![0; series.len()];
    for (position, &i) in ord.iter().enumerate() {
        rank[i] = position;
    }
    table
        .genres()
        .iter()
        .zip(series)
        .zip(rank)
        .map(|((key, spans), rank)| StackSeries {
            key: key.clone(),
            rank,
            spans,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Offsets
// ---------------------------------------------------------------------------

fn offset_none(series: &mut [Vec<Span>], order: &[usize]) {
    if order.len() < 2 {
        return;
    }
    let m = series[order[0]].len();
    for pair in order.windows(2) {
        let (below, layer) = (pair[0], pair[1]);
        for j in 0..m {
            let [b0, b1] = series[below][j];
            let base = if b1.is_nan() { b0 } else { b1 };
            series[layer][j][0] = base;
            series[layer][j][1] += base;
        }
    }
}

fn offset_expand(series: &mut [Vec<Span>], order: &[usize]) {
    let Some(m) = series.first().map(Vec::len) else {
        return;
    };
    for j in 0..m {
        let total: f64 = series.iter().map(|s| s[j][1]).sum();
        if total != 0.0 {
            for s in series.iter_mut() {
                s[j][1] /= total;
            }
        }
    }
    offset_none(series, order);
}

fn offset_silhouette(series: &mut [Vec<Span>], order: &[usize]) {
    let Some(&first) = order.first() else {
        return;
    };
    let m = series[first].len();
    for j in 0..m {
        let total: f64 = series.iter().map(|s| s[j][1]).sum();
        series[first][j][0] = -total / 2.0;
        series[first][j][1] += -total / 2.0;
    }
    offset_none(series, order);
}

fn offset_wiggle(series: &mut [Vec<Span>], order: &[usize]) {
    let Some(&first) = order.first() else {
        return;
    };
    let m = series[first].len();
    if m == 0 {
        return;
    }

    let mut y = 0.0;
    for j in 1..m {
        let mut weight = 0.0;
        let mut moment = 0.0;
        for (i, &layer) in order.iter().enumerate() {
            let cur = series[layer][j][1];
            let prev = series[layer][j - 1][1];
            let mut slope = (cur - prev) / 2.0;
            for &below in &order[..i] {
                slope += series[below][j][1] - series[below][j - 1][1];
            }
            weight += cur;
            moment += slope * cur;
        }
        series[first][j - 1][0] = y;
        series[first][j - 1][1] += y;
        if weight != 0.0 {
            y -= moment / weight;
        }
    }
    series[first][m - 1][0] = y;
    series[first][m - 1][1] += y;
    offset_none(series, order);
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

fn inside_out(series: &[Vec<Span>]) -> Vec<usize> {
    let sums: Vec<f64> = series.iter().map(|s| s.iter().map(|p| p[1]).sum()).collect();
    let peaks: Vec<usize> = series.iter().map(|s| peak(s)).collect();

    let mut appearance: Vec<usize> = (0..series.len()).collect();
    appearance.sort_by_key(|&i| peaks[i]);

    let (mut top, mut bottom) = (0.0, 0.0);
    let (mut tops, mut bottoms) = (Vec::new(), Vec::new());
    for i in appearance {
        if top < bottom {
            top += sums[i];
            tops.push(i);
        } else {
            bottom += sums[i];
            bottoms.push(i);
        }
    }
    bottoms.reverse();
    bottoms.extend(tops);
    bottoms
}

/// Index of the first maximum.
fn peak(spans: &[Span]) -> usize {
    let mut best = f64::NEG_INFINITY;
    let mut at = 0;
    for (i, s) in spans.iter().enumerate() {
        if s[1] > best {
            best = s[1];
            at = i;
        }
    }
    at
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::{group_by_genre_then_year, Measure};
    use crate::data::model::MovieRecord;

    fn rows() -> Vec<Vec<f64>> {
        vec![vec![1.0, 2.0, 0.0], vec![3.0, 1.0, 4.0], vec![2.0, 2.0, 2.0]]
    }

    fn assert_contiguous(series: &[Vec<Span>], order: &[usize]) {
        for pair in order.windows(2) {
            for (lo, hi) in series[pair[0]].iter().zip(&series[pair[1]]) {
                assert!((lo[1] - hi[0]).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_zero_offset_stacks_from_zero() {
        let (series, order) = stack_values(&rows(), StackOrder::None, StackOffset::None);
        assert_eq!(order, vec![0, 1, 2]);
        assert_eq!(series[0], vec![[0.0, 1.0], [0.0, 2.0], [0.0, 0.0]]);
        assert_eq!(series[2], vec![[4.0, 6.0], [3.0, 5.0], [4.0, 6.0]]);
        assert_contiguous(&series, &order);
    }

    #[test]
    fn test_expand_normalises_columns() {
        let (series, order) = stack_values(&rows(), StackOrder::None, StackOffset::Expand);
        assert_contiguous(&series, &order);
        for j in 0..3 {
            assert_eq!(series[order[0]][j][0], 0.0);
            assert!((series[order[2]][j][1] - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_silhouette_is_centred() {
        let (series, order) = stack_values(&rows(), StackOrder::None, StackOffset::Silhouette);
        assert_contiguous(&series, &order);
        for j in 0..3 {
            let bottom = series[order[0]][j][0];
            let top = series[order[2]][j][1];
            assert!((bottom + top).abs() < 1e-9);
        }
    }

    #[test]
    fn test_wiggle_baseline() {
        let values = vec![vec![1.0, 1.0], vec![1.0, 3.0]];
        let (series, order) = stack_values(&values, StackOrder::None, StackOffset::Wiggle);
        assert_eq!(series[0], vec![[0.0, 1.0], [-0.75, 0.25]]);
        assert_eq!(series[1], vec![[1.0, 2.0], [0.25, 3.25]]);
        assert_contiguous(&series, &order);
    }

    #[test]
    fn test_inside_out_order() {
        let values = vec![vec![5.0, 0.0, 0.0], vec![0.0, 0.0, 9.0], vec![0.0, 4.0, 0.0]];
        let (series, order) = stack_values(&values, StackOrder::InsideOut, StackOffset::None);
        // Peaks at columns 0, 2, 1: the first layer seeds the bottom, the
        // later two go on top in order of appearance.
        assert_eq!(order, vec![0, 2, 1]);
        assert_eq!(series[0][0], [0.0, 5.0]);
        assert_eq!(series[1][0], [5.0, 5.0]);
        assert_contiguous(&series, &order);
    }

    #[test]
    fn test_inside_out_puts_late_layer_below() {
        // The heavy middle layer goes on top, so the last one lands under the first.
        let values = vec![vec![1.0, 0.0, 0.0], vec![0.0, 10.0, 0.0], vec![0.0, 0.0, 3.0]];
        let (series, order) = stack_values(&values, StackOrder::InsideOut, StackOffset::None);
        assert_eq!(order, vec![2, 0, 1]);
        assert_eq!(series[2][2], [0.0, 3.0]);
        assert_eq!(series[0][0], [0.0, 1.0]);
        assert_contiguous(&series, &order);
    }

    #[test]
    fn test_empty_input() {
        for offset in StackOffset::ALL {
            let (series, order) = stack_values(&[], StackOrder::InsideOut, offset);
            assert!(series.is_empty());
            assert!(order.is_empty());
        }
    }

    #[test]
    fn test_stack_table_keeps_genre_order() {
        let records = vec![
            MovieRecord {
                year: Some(2000),
                genres: vec!["Drama".into()],
                ..Default::default()
            },
            MovieRecord {
                year: Some(2001),
                genres: vec!["Comedy".into(), "Drama".into()],
                ..Default::default()
            },
        ];
        let table = group_by_genre_then_year(&records, Measure::Count);
        let stacked = stack_table(&table, StackOrder::None, StackOffset::None);
        assert_eq!(stacked.len(), 2);
        assert_eq!(stacked[0].key, "Drama");
        assert_eq!(stacked[0].rank, 0);
        assert_eq!(stacked[1].key, "Comedy");
        assert_eq!(stacked[1].spans, vec![[1.0, 1.0], [1.0, 2.0]]);
    }
}
