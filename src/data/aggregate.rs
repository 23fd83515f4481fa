use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::model::{MovieRecord, NumericField};

// ---------------------------------------------------------------------------
// Grouping by year
// ---------------------------------------------------------------------------

/// Order of records inside a year group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithinYearOrder {
    /// Keep the order records arrived in.
    Insertion,
    /// Case-insensitive title order; ties keep arrival order.
    #[default]
    Title,
}

/// Group records by release year. Records without a year are skipped.
pub fn group_by_year<'a, I>(records: I, order: WithinYearOrder) -> BTreeMap<i32, Vec<&'a MovieRecord>>
where
    I: IntoIterator<Item = &'a MovieRecord>,
{
    let mut groups: BTreeMap<i32, Vec<&MovieRecord>> = BTreeMap::new();
    for rec in records {
        if let Some(year) = rec.year {
            groups.entry(year).or_default().push(rec);
        }
    }
    if order == WithinYearOrder::Title {
        for group in groups.values_mut() {
            group.sort_by_cached_key(|r| r.title.to_lowercase());
        }
    }
    groups
}

/// [`group_by_year`] over a selection of `records`, yielding record indices.
pub fn group_indices_by_year(
    records: &[MovieRecord],
    indices: &[usize],
    order: WithinYearOrder,
) -> BTreeMap<i32, Vec<usize>> {
    let mut groups: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for &i in indices {
        if let Some(year) = records.get(i).and_then(|r| r.year) {
            groups.entry(year).or_default().push(i);
        }
    }
    if order == WithinYearOrder::Title {
        for group in groups.values_mut() {
            group.sort_by_cached_key(|&i| records[i].title.to_lowercase());
        }
    }
    groups
}

// ---------------------------------------------------------------------------
// Grouping by genre, then year
// ---------------------------------------------------------------------------

/// What a genre/year cell holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "field")]
pub enum Measure {
    Count,
    Sum(NumericField),
}

impl Default for Measure {
    fn default() -> Self {
        Measure::Sum(NumericField::WeightedRating)
    }
}

impl Measure {
    fn contribution(self, record: &MovieRecord) -> f64 {
        match self {
            Measure::Count => 1.0,
            Measure::Sum(field) => {
                let v = field.value(record);
                if v.is_finite() { v } else { 0.0 }
            }
        }
    }

    pub fn label(self) -> String {
        match self {
            Measure::Count => "Number of movies".to_string(),
            Measure::Sum(field) => format!("Sum of {}", field.label().to_lowercase()),
        }
    }
}

/// Genre → year → value, with genres in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenreYearTable {
    genres: Vec<String>,
    years: Vec<i32>,
    cells: Vec<BTreeMap<i32, f64>>,
}

impl GenreYearTable {
    /// Genres in the order they were first seen.
    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    /// Distinct years across all genres, ascending.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }

    /// Sparse year map for one genre.
    pub fn by_year(&self, genre: &str) -> Option<&BTreeMap<i32, f64>> {
        let i = self.genres.iter().position(|g| g == genre)?;
        self.cells.get(i)
    }

    /// Dense lookup; missing cells are 0.
    pub fn value(&self, genre_index: usize, year: i32) -> f64 {
        self.cells
            .get(genre_index)
            .and_then(|m| m.get(&year))
            .copied()
            .unwrap_or(0.0)
    }

    /// One row per genre, one column per year in [`Self::years`].
    pub fn dense_rows(&self) -> Vec<Vec<f64>> {
        (0..self.genres.len())
            .map(|g| self.years.iter().map(|&y| self.value(g, y)).collect())
            .collect()
    }
}

/// Roll records up by genre, then by year. A record counts towards each of
/// its genres; records without a year or without genres are skipped.
pub fn group_by_genre_then_year<'a, I>(records: I, measure: Measure) -> GenreYearTable
where
    I: IntoIterator<Item = &'a MovieRecord>,
{
    let mut table = GenreYearTable::default();
    let mut slot: HashMap<&'a str, usize> = HashMap::new();
    let mut years: BTreeSet<i32> = BTreeSet::new();

    for rec in records {
        let Some(year) = rec.year else {
            continue;
        };
        let amount = measure.contribution(rec);
        for genre in &rec.genres {
            let i = *slot.entry(genre.as_str()).or_insert_with(|| {
                table.genres.push(genre.clone());
                table.cells.push(BTreeMap::new());
                table.genres.len() - 1
            });
            *table.cells[i].entry(year).or_insert(0.0) += amount;
            years.insert(year);
        }
    }
    table.years = years.into_iter().collect();
    table
}
