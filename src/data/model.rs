use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// NumericField – the numeric columns a chart can measure
// ---------------------------------------------------------------------------

/// A numeric column of [`MovieRecord`] that can drive an axis or a sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    AverageRating,
    WeightedRating,
    NumRatings,
    BoxOffice,
}

impl NumericField {
    pub const ALL: [NumericField; 4] = [
        NumericField::AverageRating,
        NumericField::WeightedRating,
        NumericField::NumRatings,
        NumericField::BoxOffice,
    ];

    /// Read the field from a record. Malformed ratings come back as `NaN`.
    pub fn value(self, record: &MovieRecord) -> f64 {
        match self {
            NumericField::AverageRating => record.average_rating,
            NumericField::WeightedRating => record.weighted_rating,
            NumericField::NumRatings => record.num_ratings as f64,
            NumericField::BoxOffice => record.box_office,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NumericField::AverageRating => "Average rating",
            NumericField::WeightedRating => "Weighted rating",
            NumericField::NumRatings => "Number of ratings",
            NumericField::BoxOffice => "Worldwide box office",
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which rating column the rating-range filter reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingField {
    Average,
    #[default]
    Weighted,
}

impl RatingField {
    pub fn value(self, record: &MovieRecord) -> f64 {
        self.as_numeric().value(record)
    }

    pub fn as_numeric(self) -> NumericField {
        match self {
            RatingField::Average => NumericField::AverageRating,
            RatingField::Weighted => NumericField::WeightedRating,
        }
    }
}

// ---------------------------------------------------------------------------
// MovieRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single movie. Records are immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieRecord {
    /// External identifier (IMDB `tconst`), possibly empty.
    pub id: String,
    pub title: String,
    /// Release year; `None` when the cell was missing or malformed.
    pub year: Option<i32>,
    /// Genre labels in source order.
    pub genres: Vec<String>,
    pub director: String,
    /// `NaN` when malformed.
    pub average_rating: f64,
    /// `NaN` when malformed.
    pub weighted_rating: f64,
    pub num_ratings: u64,
    /// Worldwide box office; 0 when absent.
    pub box_office: f64,
    pub is_adult: bool,
}

impl Default for MovieRecord {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            year: None,
            genres: Vec::new(),
            director: String::new(),
            average_rating: f64::NAN,
            weighted_rating: f64::NAN,
            num_ratings: 0,
            box_office: 0.0,
            is_adult: false,
        }
    }
}

impl MovieRecord {
    /// First genre label, used for colouring single marks.
    pub fn primary_genre(&self) -> Option<&str> {
        self.genres.first().map(String::as_str)
    }

    pub fn has_any_genre<'a>(&self, mut selected: impl Iterator<Item = &'a String>) -> bool {
        selected.any(|g| self.genres.iter().any(|own| own == g))
    }

    /// Genres joined back into the source cell format.
    pub fn genres_label(&self) -> String {
        self.genres.join(", ")
    }
}

// ---------------------------------------------------------------------------
// MovieDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed indices.
#[derive(Debug, Clone, Default)]
pub struct MovieDataset {
    pub records: Vec<MovieRecord>,
    /// Distinct genres in first-seen order.
    pub genres: Vec<String>,
    /// Smallest and largest known release year.
    pub year_extent: Option<(i32, i32)>,
    pub average_rating_extent: Option<(f64, f64)>,
    pub weighted_rating_extent: Option<(f64, f64)>,
    /// File the records were read from, if any.
    pub source: Option<PathBuf>,
}

impl MovieDataset {
    /// Build indices from the loaded records.
    pub fn from_records(records: Vec<MovieRecord>) -> Self {
        let mut genres: Vec<String> = Vec::new();
        let mut year_extent: Option<(i32, i32)> = None;
        let mut average = Extent::default();
        let mut weighted = Extent::default();

        for rec in &records {
            for g in &rec.genres {
                if !genres.contains(g) {
                    genres.push(g.clone());
                }
            }
            if let Some(y) = rec.year {
                year_extent = Some(match year_extent {
                    Some((lo, hi)) => (lo.min(y), hi.max(y)),
                    None => (y, y),
                });
            }
            average.push(rec.average_rating);
            weighted.push(rec.weighted_rating);
        }

        MovieDataset {
            records,
            genres,
            year_extent,
            average_rating_extent: average.into_inner(),
            weighted_rating_extent: weighted.into_inner(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: PathBuf) -> Self {
        self.source = Some(source);
        self
    }

    pub fn rating_extent(&self, field: RatingField) -> Option<(f64, f64)> {
        match field {
            RatingField::Average => self.average_rating_extent,
            RatingField::Weighted => self.weighted_rating_extent,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Running min/max over finite values.
#[derive(Default)]
struct Extent(Option<(f64, f64)>);

impl Extent {
    fn push(&mut self, v: f64) {
        if !v.is_finite() {
            return;
        }
        self.0 = Some(match self.0 {
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
            None => (v, v),
        });
    }

    fn into_inner(self) -> Option<(f64, f64)> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(title: &str, year: Option<i32>, genres: &[&str], rating: f64) -> MovieRecord {
        MovieRecord {
            title: title.to_string(),
            year,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            weighted_rating: rating,
            average_rating: rating,
            ..Default::default()
        }
    }

    #[test]
    fn test_dataset_indices() {
        let ds = MovieDataset::from_records(vec![
            movie("A", Some(2001), &["Drama", "Crime"], 7.0),
            movie("B", Some(1999), &["Comedy", "Drama"], f64::NAN),
            movie("C", None, &["Horror"], 4.5),
        ]);

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.genres, vec!["Drama", "Crime", "Comedy", "Horror"]);
        assert_eq!(ds.year_extent, Some((1999, 2001)));
        assert_eq!(ds.rating_extent(RatingField::Weighted), Some((4.5, 7.0)));
    }

    #[test]
    fn test_empty_dataset_has_no_extents() {
        let ds = MovieDataset::from_records(Vec::new());
        assert!(ds.is_empty());
        assert_eq!(ds.year_extent, None);
        assert_eq!(ds.rating_extent(RatingField::Average), None);
    }

    #[test]
    fn test_numeric_field_values() {
        let rec = MovieRecord {
            num_ratings: 1200,
            box_office: 5.5e6,
            ..movie("A", Some(2000), &[], 6.0)
        };
        assert_eq!(NumericField::NumRatings.value(&rec), 1200.0);
        assert_eq!(NumericField::BoxOffice.value(&rec), 5.5e6);
        assert_eq!(RatingField::Average.value(&rec), 6.0);
        assert_eq!(rec.primary_genre(), None);
    }
}
