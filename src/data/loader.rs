use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    LargeListArray, ListArray, StringArray, UInt32Array, UInt64Array,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use super::genre::parse_genres;
use super::model::{MovieDataset, MovieRecord};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("missing required column '{0}'")]
    MissingColumn(String),
    #[error("expected a top-level JSON array of records")]
    NotAnArray,
    #[error("row {0} is not a JSON object")]
    NotAnObject(usize),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("Arrow: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// A logical column of the movie table and the source headers it may appear under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Id,
    Title,
    Year,
    Genres,
    Director,
    AverageRating,
    WeightedRating,
    NumRatings,
    BoxOffice,
    IsAdult,
}

impl Column {
    const ALL: [Column; 10] = [
        Column::Id,
        Column::Title,
        Column::Year,
        Column::Genres,
        Column::Director,
        Column::AverageRating,
        Column::WeightedRating,
        Column::NumRatings,
        Column::BoxOffice,
        Column::IsAdult,
    ];

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::Id => &["tconst", "id"],
            Column::Title => &["primaryTitle", "title"],
            Column::Year => &["startYear", "year"],
            Column::Genres => &["genres"],
            Column::Director => &["directorNames", "director"],
            Column::AverageRating => &["averageRating"],
            Column::WeightedRating => &["weightedRating"],
            Column::NumRatings => &["numRatings", "numVotes"],
            Column::BoxOffice => &["worldwideBoxOffice", "boxOffice"],
            Column::IsAdult => &["isAdult"],
        }
    }

    fn required(self) -> bool {
        matches!(self, Column::Title | Column::Year)
    }
}

/// Source column index for every logical column present in a header row.
struct ColumnIndex([Option<usize>; 10]);

impl ColumnIndex {
    fn resolve(headers: &[&str]) -> Result<Self, LoadError> {
        let mut slots = [None; 10];
        for (slot, column) in slots.iter_mut().zip(Column::ALL) {
            *slot = headers
                .iter()
                .position(|h| column.aliases().contains(&h.trim()));
            if slot.is_none() && column.required() {
                return Err(LoadError::MissingColumn(column.aliases()[0].to_string()));
            }
        }
        Ok(ColumnIndex(slots))
    }

    fn get(&self, column: Column) -> Option<usize> {
        self.0[column as usize]
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a movie dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with IMDB-style column names (recommended)
/// * `.json`    – `[{ "tconst": "...", "primaryTitle": "...", ... }, ...]`
/// * `.parquet` – flat table with the same column names
pub fn load_file(path: &Path) -> Result<MovieDataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" => read_csv(File::open(path)?)?,
        "json" => read_json(&std::fs::read_to_string(path)?)?,
        "parquet" | "pq" => read_parquet(File::open(path)?)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    log::debug!("parsed {} rows from {}", records.len(), path.display());
    Ok(MovieDataset::from_records(records).with_source(path.to_path_buf()))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse CSV text with a header row. Unknown columns (e.g. `index`) are ignored.
///
/// Cells are decoded lossily, so a stray Latin-1 byte spoils one character
/// instead of the whole file.
pub fn read_csv<R: Read>(input: R) -> Result<Vec<MovieRecord>, LoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();
    let index = ColumnIndex::resolve(&headers.iter().map(String::as_str).collect::<Vec<_>>())?;

    let mut records = Vec::new();
    for result in reader.byte_records() {
        let row = result?;
        records.push(coerce_row(|column| {
            index
                .get(column)
                .and_then(|i| row.get(i))
                .map(|cell| String::from_utf8_lossy(cell).into_owned())
        }));
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`).
///
/// `genres` may be either a comma-delimited string or an array of strings.
pub fn read_json(text: &str) -> Result<Vec<MovieRecord>, LoadError> {
    let root: JsonValue = serde_json::from_str(text)?;
    let rows = root.as_array().ok_or(LoadError::NotAnArray)?;

    let objects = rows
        .iter()
        .enumerate()
        .map(|(i, row)| row.as_object().ok_or(LoadError::NotAnObject(i)))
        .collect::<Result<Vec<_>, _>>()?;

    // Rows may omit keys; required columns only need to appear somewhere.
    let keys: BTreeSet<&str> = objects
        .iter()
        .flat_map(|obj| obj.keys().map(String::as_str))
        .collect();
    if !objects.is_empty() {
        ColumnIndex::resolve(&keys.into_iter().collect::<Vec<_>>())?;
    }

    Ok(objects
        .into_iter()
        .map(|obj| coerce_row(|column| json_cell(obj, column)))
        .collect())
}

fn json_cell(obj: &Map<String, JsonValue>, column: Column) -> Option<String> {
    let value = column.aliases().iter().find_map(|key| obj.get(*key))?;
    Some(match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => String::new(),
        JsonValue::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Read a flat Parquet table written by Pandas or Polars.
pub fn read_parquet(file: File) -> Result<Vec<MovieRecord>, LoadError> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        let index = ColumnIndex::resolve(&names)?;

        for row in 0..batch.num_rows() {
            records.push(coerce_row(|column| {
                index
                    .get(column)
                    .and_then(|i| arrow_cell(batch.column(i), row))
            }));
        }
    }
    Ok(records)
}

/// Render one Arrow cell as text so it goes through the same coercion as CSV.
fn arrow_cell(col: &Arc<dyn Array>, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    let any = col.as_any();
    match col.data_type() {
        DataType::Utf8 => any.downcast_ref::<StringArray>().map(|a| a.value(row).to_string()),
        DataType::LargeUtf8 => Some(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => any.downcast_ref::<Int32Array>().map(|a| a.value(row).to_string()),
        DataType::Int64 => any.downcast_ref::<Int64Array>().map(|a| a.value(row).to_string()),
        DataType::UInt32 => any.downcast_ref::<UInt32Array>().map(|a| a.value(row).to_string()),
        DataType::UInt64 => any.downcast_ref::<UInt64Array>().map(|a| a.value(row).to_string()),
        DataType::Float32 => any.downcast_ref::<Float32Array>().map(|a| a.value(row).to_string()),
        DataType::Float64 => any.downcast_ref::<Float64Array>().map(|a| a.value(row).to_string()),
        DataType::Boolean => any.downcast_ref::<BooleanArray>().map(|a| a.value(row).to_string()),
        DataType::List(_) => any
            .downcast_ref::<ListArray>()
            .map(|a| join_strings(&a.value(row))),
        DataType::LargeList(_) => any
            .downcast_ref::<LargeListArray>()
            .map(|a| join_strings(&a.value(row))),
        other => {
            log::warn!("ignoring parquet column of type {other:?}");
            None
        }
    }
}

fn join_strings(values: &Arc<dyn Array>) -> String {
    match values.as_any().downcast_ref::<StringArray>() {
        Some(strings) => strings.iter().flatten().collect::<Vec<_>>().join(","),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Row coercion
// ---------------------------------------------------------------------------

/// Build a record from raw cells. Malformed values never fail: they become
/// `None`, `NaN`, 0 or an empty string.
fn coerce_row(cell: impl Fn(Column) -> Option<String>) -> MovieRecord {
    let text = |column| {
        cell(column)
            .map(|s| s.trim().to_string())
            .filter(|s| s != "\\N")
            .unwrap_or_default()
    };

    MovieRecord {
        id: text(Column::Id),
        title: text(Column::Title),
        year: parse_year(&text(Column::Year)),
        genres: parse_genres(&text(Column::Genres)),
        director: text(Column::Director),
        average_rating: parse_float(&text(Column::AverageRating)),
        weighted_rating: parse_float(&text(Column::WeightedRating)),
        num_ratings: parse_count(&text(Column::NumRatings)),
        box_office: parse_amount(&text(Column::BoxOffice)),
        is_adult: parse_flag(&text(Column::IsAdult)),
    }
}

fn parse_year(s: &str) -> Option<i32> {
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    let f = s.parse::<f64>().ok()?;
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i32::MAX as f64).then_some(f as i32)
}

fn parse_float(s: &str) -> f64 {
    s.parse::<f64>().unwrap_or(f64::NAN)
}

fn parse_count(s: &str) -> u64 {
    if let Ok(n) = s.parse::<u64>() {
        return n;
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 => f as u64,
        _ => 0,
    }
}

/// Currency amounts may carry a `$` prefix and thousands separators.
fn parse_amount(s: &str) -> f64 {
    let cleaned: String = s.chars().filter(|c| *c != '$' && *c != ',').collect();
    match cleaned.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => 0.0,
    }
}

fn parse_flag(s: &str) -> bool {
    matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
