use std::io::{Read, Write};

use super::loader::LoadError;

/// Name of the genre column in source tables.
pub const GENRES_COLUMN: &str = "genres";

/// Split a comma-delimited genre cell into trimmed labels.
///
/// Empty labels are dropped, so `""` gives no genres and `"Drama,,Crime "`
/// gives `["Drama", "Crime"]`.
pub fn parse_genres(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

/// Rewrite a CSV table so its `genres` column holds one label per row.
///
/// All other columns are copied unchanged. Returns the number of rows written.
pub fn split_genre_column<R: Read, W: Write>(input: R, output: W) -> Result<usize, LoadError> {
    let mut reader = csv::Reader::from_reader(input);
    let mut writer = csv::Writer::from_writer(output);

    let headers = reader.headers()?.clone();
    let genre_idx = headers
        .iter()
        .position(|h| h == GENRES_COLUMN)
        .ok_or_else(|| LoadError::MissingColumn(GENRES_COLUMN.to_string()))?;
    writer.write_record(&headers)?;

    let mut written = 0;
    for result in reader.records() {
        let record = result?;
        let genres = parse_genres(record.get(genre_idx).unwrap_or(""));
        if genres.is_empty() {
            writer.write_record(&record)?;
            written += 1;
            continue;
        }
        for genre in &genres {
            let row = record
                .iter()
                .enumerate()
                .map(|(i, cell)| if i == genre_idx { genre.as_str() } else { cell });
            writer.write_record(row)?;
            written += 1;
        }
    }
    writer.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_genres_trims_and_drops_empty() {
        assert_eq!(parse_genres("Drama, Crime ,,Thriller"), vec!["Drama", "Crime", "Thriller"]);
        assert!(parse_genres("").is_empty());
        assert!(parse_genres(" , ").is_empty());
    }

    #[test]
    fn test_split_genre_column() {
        let input = "tconst,primaryTitle,genres\n\
                     tt1,Heat,\"Action,Crime,Drama\"\n\
                     tt2,Up,Animation\n\
                     tt3,Nothing,\n";
        let mut out = Vec::new();
        let written = split_genre_column(input.as_bytes(), &mut out).unwrap();
        assert_eq!(written, 5);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "tconst,primaryTitle,genres");
        assert_eq!(lines[1], "tt1,Heat,Action");
        assert_eq!(lines[3], "tt1,Heat,Drama");
        assert_eq!(lines[4], "tt2,Up,Animation");
        assert_eq!(lines[5], "tt3,Nothing,");
    }

    #[test]
    fn test_split_genre_column_requires_genres() {
        let input = "tconst,primaryTitle\ntt1,Heat\n";
        let err = split_genre_column(input.as_bytes(), Vec::new()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(col) if col == "genres"));
    }
}
