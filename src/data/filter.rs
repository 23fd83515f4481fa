use std::collections::BTreeSet;

use super::model::{MovieDataset, MovieRecord, RatingField};

// ---------------------------------------------------------------------------
// Range – a closed, non-decreasing interval
// ---------------------------------------------------------------------------

/// Closed interval `[min, max]`. Construction swaps reversed bounds so the
/// pair is always non-decreasing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range<T> {
    min: T,
    max: T,
}

impl<T: PartialOrd + Copy> Range<T> {
    pub fn new(a: T, b: T) -> Self {
        if b < a {
            Range { min: b, max: a }
        } else {
            Range { min: a, max: b }
        }
    }

    pub fn min(&self) -> T {
        self.min
    }

    pub fn max(&self) -> T {
        self.max
    }

    /// `NaN` and other unordered values are never contained.
    pub fn contains(&self, v: T) -> bool {
        self.min <= v && v <= self.max
    }
}

// ---------------------------------------------------------------------------
// TextFilter – case-insensitive substring predicate
// ---------------------------------------------------------------------------

/// Case-insensitive substring match; an empty needle matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextFilter {
    raw: String,
    needle: String,
}

impl TextFilter {
    pub fn new(text: &str) -> Self {
        TextFilter {
            raw: text.to_string(),
            needle: text.trim().to_lowercase(),
        }
    }

    /// The text as typed by the user.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_active(&self) -> bool {
        !self.needle.is_empty()
    }

    pub fn matches(&self, haystack: &str) -> bool {
        !self.is_active() || haystack.to_lowercase().contains(&self.needle)
    }
}

// ---------------------------------------------------------------------------
// FilterState – every predicate the viewer applies
// ---------------------------------------------------------------------------

/// The complete filter selection. Values are never mutated in place: UI
/// handlers build a new state with the `with_*` methods and hand it back to
/// the pipeline.
///
/// An empty genre selection means "no genre constraint".
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub year_range: Range<i32>,
    pub rating_range: Range<f64>,
    pub rating_field: RatingField,
    pub director: TextFilter,
    pub title: TextFilter,
    pub genres: BTreeSet<String>,
    /// `None` ignores the flag, `Some(b)` keeps only records with `is_adult == b`.
    pub adult: Option<bool>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            year_range: Range::new(i32::MIN, i32::MAX),
            rating_range: Range::new(0.0, 10.0),
            rating_field: RatingField::default(),
            director: TextFilter::default(),
            title: TextFilter::default(),
            genres: BTreeSet::new(),
            adult: None,
        }
    }
}

impl FilterState {
    /// Initialise a [`FilterState`] covering the whole dataset (show everything
    /// that has a year and a rating).
    pub fn for_dataset(dataset: &MovieDataset, rating_field: RatingField) -> Self {
        let (y0, y1) = dataset.year_extent.unwrap_or((i32::MIN, i32::MAX));
        let (r0, r1) = dataset.rating_extent(rating_field).unwrap_or((0.0, 10.0));
        FilterState {
            year_range: Range::new(y0, y1),
            rating_range: Range::new(r0.min(0.0), r1.max(10.0)),
            rating_field,
            ..FilterState::default()
        }
    }

    pub fn with_year_range(&self, a: i32, b: i32) -> Self {
        FilterState {
            year_range: Range::new(a, b),
            ..self.clone()
        }
    }

    pub fn with_rating_range(&self, a: f64, b: f64) -> Self {
        FilterState {
            rating_range: Range::new(a, b),
            ..self.clone()
        }
    }

    pub fn with_rating_field(&self, field: RatingField) -> Self {
        FilterState {
            rating_field: field,
            ..self.clone()
        }
    }

    pub fn with_director(&self, text: &str) -> Self {
        FilterState {
            director: TextFilter::new(text),
            ..self.clone()
        }
    }

    pub fn with_title(&self, text: &str) -> Self {
        FilterState {
            title: TextFilter::new(text),
            ..self.clone()
        }
    }

    pub fn with_genres<I, S>(&self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterState {
            genres: genres.into_iter().map(Into::into).collect(),
            ..self.clone()
        }
    }

    /// Add the genre to the selection, or remove it if already selected.
    pub fn with_genre_toggled(&self, genre: &str) -> Self {
        let mut genres = self.genres.clone();
        if !genres.remove(genre) {
            genres.insert(genre.to_string());
        }
        FilterState {
            genres,
            ..self.clone()
        }
    }

    pub fn with_adult(&self, adult: Option<bool>) -> Self {
        FilterState {
            adult,
            ..self.clone()
        }
    }

    /// Whether a record passes every predicate.
    pub fn matches(&self, record: &MovieRecord) -> bool {
        let year_ok = record.year.is_some_and(|y| self.year_range.contains(y));
        year_ok
            && self.rating_range.contains(self.rating_field.value(record))
            && self.director.matches(&record.director)
            && self.title.matches(&record.title)
            && (self.genres.is_empty() || record.has_any_genre(self.genres.iter()))
            && self.adult.map_or(true, |flag| record.is_adult == flag)
    }
}

/// Return indices of records that pass all active filters, in source order.
pub fn filtered_indices(records: &[MovieRecord], filters: &FilterState) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, rec)| filters.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

/// The matching records themselves, in source order.
pub fn filter_records(records: &[MovieRecord], filters: &FilterState) -> Vec<MovieRecord> {
    records
        .iter()
        .filter(|rec| filters.matches(rec))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn movie(year: i32, rating: f64, genres: &str) -> MovieRecord {
        MovieRecord {
            title: format!("{genres} {year}"),
            year: Some(year),
            genres: crate::data::genre::parse_genres(genres),
            average_rating: rating,
            weighted_rating: rating,
            ..Default::default()
        }
    }

    fn example() -> Vec<MovieRecord> {
        vec![
            movie(2000, 7.2, "Drama"),
            movie(2000, 3.0, "Comedy"),
            movie(2001, 8.0, "Drama"),
        ]
    }

    #[test]
    fn test_example_filter() {
        let state = FilterState::default()
            .with_year_range(2000, 2001)
            .with_rating_range(5.0, 10.0)
            .with_genres(["Drama"]);

        let kept = filter_records(&example(), &state);
        assert_eq!(kept, vec![movie(2000, 7.2, "Drama"), movie(2001, 8.0, "Drama")]);
        assert_eq!(filtered_indices(&example(), &state), vec![0, 2]);
    }

    #[test]
    fn test_director_substring_is_case_insensitive() {
        let nolan = MovieRecord {
            director: "Christopher Nolan".into(),
            ..movie(2010, 8.8, "Sci-Fi")
        };
        let spielberg = MovieRecord {
            director: "Steven Spielberg".into(),
            ..movie(1993, 8.2, "Adventure")
        };
        let state = FilterState::default().with_director("nolan");
        assert!(state.matches(&nolan));
        assert!(!state.matches(&spielberg));
    }

    #[test]
    fn test_empty_filters_match_all() {
        let state = FilterState::default().with_director("").with_title("   ");
        assert!(!state.director.is_active());
        assert!(!state.title.is_active());
        assert_eq!(filter_records(&example(), &state).len(), 3);
    }

    #[test]
    fn test_ranges_are_normalised() {
        let state = FilterState::default().with_year_range(2001, 2000);
        assert_eq!(state.year_range.min(), 2000);
        assert_eq!(state.year_range.max(), 2001);
    }

    #[test]
    fn test_malformed_values_are_excluded() {
        let no_year = MovieRecord {
            year: None,
            ..movie(2000, 7.0, "Drama")
        };
        let no_rating = movie(2000, f64::NAN, "Drama");
        let state = FilterState::default();
        assert!(!state.matches(&no_year));
        assert!(!state.matches(&no_rating));
    }

    #[test]
    fn test_genre_toggle_and_adult_flag() {
        let mut adult = movie(1999, 6.0, "Drama");
        adult.is_adult = true;

        let state = FilterState::default().with_genre_toggled("Drama");
        assert!(state.genres.contains("Drama"));
        assert!(state.with_genre_toggled("Drama").genres.is_empty());

        assert!(state.matches(&adult));
        assert!(!state.with_adult(Some(false)).matches(&adult));
        assert!(state.with_adult(Some(true)).matches(&adult));
    }

    #[test]
    fn test_for_dataset_matches_everything_rated() {
        let ds = MovieDataset::from_records(example());
        let state = FilterState::for_dataset(&ds, RatingField::Average);
        assert_eq!(state.year_range, Range::new(2000, 2001));
        assert_eq!(filtered_indices(&ds.records, &state), vec![0, 1, 2]);
    }

    fn arb_movie() -> impl Strategy<Value = MovieRecord> {
        (
            1990i32..2010,
            prop_oneof![Just(f64::NAN), 0.0f64..10.0],
            prop::sample::subsequence(vec!["Drama", "Comedy", "Horror", "Action"], 0..3),
            any::<bool>(),
        )
            .prop_map(|(year, rating, genres, is_adult)| MovieRecord {
                year: Some(year),
                weighted_rating: rating,
                average_rating: rating,
                genres: genres.into_iter().map(str::to_string).collect(),
                is_adult,
                ..Default::default()
            })
    }

    fn arb_state() -> impl Strategy<Value = FilterState> {
        (
            1990i32..2010,
            1990i32..2010,
            0.0f64..10.0,
            0.0f64..10.0,
            prop::sample::subsequence(vec!["Drama", "Comedy", "Horror", "Action"], 0..3),
            prop_oneof![Just(None), any::<bool>().prop_map(Some)],
        )
            .prop_map(|(y0, y1, r0, r1, genres, adult)| {
                FilterState::default()
                    .with_year_range(y0, y1)
                    .with_rating_range(r0, r1)
                    .with_genres(genres)
                    .with_adult(adult)
            })
    }

    proptest! {
        #[test]
        fn filter_is_subset_and_idempotent(
            records in prop::collection::vec(arb_movie(), 0..40),
            state in arb_state(),
        ) {
            let once = filter_records(&records, &state);
            prop_assert!(once.len() <= records.len());
            prop_assert!(once.iter().all(|r| state.matches(r)));

            let twice = filter_records(&once, &state);
            prop_assert_eq!(twice, once);
        }

        #[test]
        fn widening_a_range_never_shrinks(
            records in prop::collection::vec(arb_movie(), 0..40),
            state in arb_state(),
            widen in 0i32..10,
            widen_rating in 0.0f64..5.0,
        ) {
            let base = filtered_indices(&records, &state).len();

            let wider_years = state.with_year_range(
                state.year_range.min() - widen,
                state.year_range.max() + widen,
            );
            prop_assert!(filtered_indices(&records, &wider_years).len() >= base);

            let wider_ratings = state.with_rating_range(
                state.rating_range.min() - widen_rating,
                state.rating_range.max() + widen_rating,
            );
            prop_assert!(filtered_indices(&records, &wider_ratings).len() >= base);
        }
    }
}
