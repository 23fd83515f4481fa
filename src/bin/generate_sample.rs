use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{BooleanArray, Float64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use clap::Parser;
use parquet::arrow::ArrowWriter;

const GENRES: [&str; 14] = [
    "Drama", "Comedy", "Action", "Thriller", "Romance", "Crime", "Horror", "Adventure",
    "Sci-Fi", "Animation", "Documentary", "Fantasy", "Mystery", "Family",
];

const DIRECTORS: [&str; 10] = [
    "Christopher Nolan", "Greta Gerwig", "Bong Joon Ho", "Kathryn Bigelow", "Denis Villeneuve",
    "Agnès Varda", "Akira Kurosawa", "Sofia Coppola", "Ridley Scott", "Hayao Miyazaki",
];

const WORDS: [&str; 16] = [
    "Silent", "Midnight", "River", "Empire", "Last", "Glass", "Summer", "Iron", "Hollow",
    "Crimson", "Garden", "Storm", "Echo", "Paper", "Northern", "Light",
];

/// Write a synthetic movie dataset for trying out the viewer.
#[derive(Debug, Parser)]
#[command(name = "generate-sample", version, about)]
struct Cli {
    /// Output file; the extension (.csv or .parquet) picks the format.
    #[arg(short, long, default_value = "sample_movies.parquet")]
    output: PathBuf,

    /// Number of movies.
    #[arg(short = 'n', long, default_value_t = 2000)]
    count: usize,

    /// PRNG seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Print the first rows after writing.
    #[arg(long)]
    preview: bool,
}

/// Seeded SplitMix64 stream; the same seed always yields the same table.
struct Dice(u64);

impl Dice {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }

    fn below(&mut self, n: usize) -> usize {
        (self.unit() * n as f64) as usize
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }

    /// Normal sample via Box-Muller.
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.unit().max(1e-15);
        let u2 = self.unit();
        mean + std_dev * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }
}

/// Columns of the generated table, named the way the loader expects them.
#[derive(Default)]
struct Columns {
    id: Vec<String>,
    title: Vec<String>,
    year: Vec<String>,
    genres: Vec<String>,
    director: Vec<String>,
    average: Vec<f64>,
    weighted: Vec<f64>,
    votes: Vec<u64>,
    box_office: Vec<f64>,
    adult: Vec<bool>,
}

const HEADERS: [&str; 10] = [
    "tconst",
    "primaryTitle",
    "startYear",
    "genres",
    "directorNames",
    "averageRating",
    "weightedRating",
    "numRatings",
    "worldwideBoxOffice",
    "isAdult",
];

/// IMDb-style Bayesian average pulling thin vote counts towards `mean`.
fn weighted_rating(rating: f64, votes: u64, mean: f64, min_votes: f64) -> f64 {
    let v = votes as f64;
    (v / (v + min_votes)) * rating + (min_votes / (v + min_votes)) * mean
}

fn generate(count: usize, dice: &mut Dice) -> Columns {
    let mut cols = Columns::default();
    for i in 0..count {
        let year = 1950 + dice.below(75) as i32;
        let n_genres = 1 + dice.below(3);
        let mut genres: Vec<&str> = Vec::with_capacity(n_genres);
        while genres.len() < n_genres {
            let g = dice.pick(&GENRES);
            if !genres.contains(&g) {
                genres.push(g);
            }
        }
        let rating = dice.normal(6.4, 1.1).clamp(1.0, 9.8);
        let votes = dice.normal(9.0, 2.0).exp().round().max(5.0) as u64;
        let box_office = if dice.chance(0.6) {
            (votes as f64 * dice.normal(400.0, 120.0).max(10.0)).round()
        } else {
            0.0
        };

        cols.id.push(format!("tt{:07}", 100_000 + i));
        cols.title.push(format!("{} {}", dice.pick(&WORDS), dice.pick(&WORDS)));
        // A few rows carry the IMDb null marker to exercise coercion.
        cols.year
            .push(if dice.chance(0.01) { "\\N".to_string() } else { year.to_string() });
        cols.genres.push(genres.join(","));
        cols.director.push(dice.pick(&DIRECTORS).to_string());
        cols.average.push((rating * 10.0).round() / 10.0);
        cols.weighted.push(weighted_rating(rating, votes, 6.4, 2500.0));
        cols.votes.push(votes);
        cols.box_office.push(box_office);
        cols.adult.push(dice.chance(0.005));
    }
    cols
}

fn to_batch(cols: &Columns) -> Result<RecordBatch> {
    let strings = |v: &[String]| StringArray::from(v.iter().map(String::as_str).collect::<Vec<_>>());
    let schema = Arc::new(Schema::new(vec![
        Field::new(HEADERS[0], DataType::Utf8, false),
        Field::new(HEADERS[1], DataType::Utf8, false),
        Field::new(HEADERS[2], DataType::Utf8, false),
        Field::new(HEADERS[3], DataType::Utf8, false),
        Field::new(HEADERS[4], DataType::Utf8, false),
        Field::new(HEADERS[5], DataType::Float64, false),
        Field::new(HEADERS[6], DataType::Float64, false),
        Field::new(HEADERS[7], DataType::UInt64, false),
        Field::new(HEADERS[8], DataType::Float64, false),
        Field::new(HEADERS[9], DataType::Boolean, false),
    ]));
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(strings(&cols.id)),
            Arc::new(strings(&cols.title)),
            Arc::new(strings(&cols.year)),
            Arc::new(strings(&cols.genres)),
            Arc::new(strings(&cols.director)),
            Arc::new(Float64Array::from(cols.average.clone())),
            Arc::new(Float64Array::from(cols.weighted.clone())),
            Arc::new(UInt64Array::from(cols.votes.clone())),
            Arc::new(Float64Array::from(cols.box_office.clone())),
            Arc::new(BooleanArray::from(cols.adult.clone())),
        ],
    )
    .context("building record batch")
}

fn write_parquet(path: &PathBuf, batch: &RecordBatch) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn write_csv(path: &PathBuf, cols: &Columns) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(HEADERS)?;
    for i in 0..cols.id.len() {
        writer.write_record([
            cols.id[i].clone(),
            cols.title[i].clone(),
            cols.year[i].clone(),
            cols.genres[i].clone(),
            cols.director[i].clone(),
            format!("{:.1}", cols.average[i]),
            format!("{:.4}", cols.weighted[i]),
            cols.votes[i].to_string(),
            format!("{:.0}", cols.box_office[i]),
            if cols.adult[i] { "1" } else { "0" }.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut dice = Dice(cli.seed);
    let cols = generate(cli.count, &mut dice);
    let batch = to_batch(&cols)?;

    let ext = cli
        .output
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "parquet" | "pq" => write_parquet(&cli.output, &batch)?,
        "csv" => write_csv(&cli.output, &cols)?,
        other => bail!("unsupported output extension '{other}' (use .csv or .parquet)"),
    }
    log::info!("Wrote {} movies to {}", cli.count, cli.output.display());

    if cli.preview {
        let head = batch.slice(0, batch.num_rows().min(5));
        println!("{}", pretty_format_batches(&[head])?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_table() {
        let a = generate(50, &mut Dice(7));
        let b = generate(50, &mut Dice(7));
        assert_eq!(a.title, b.title);
        assert_eq!(a.votes, b.votes);
        assert_ne!(a.title, generate(50, &mut Dice(8)).title);
    }

    #[test]
    fn test_generated_values_are_in_range() {
        let cols = generate(500, &mut Dice(42));
        assert_eq!(cols.id.len(), 500);
        for i in 0..500 {
            assert!((1.0..=9.8).contains(&cols.average[i]));
            assert!((1.0..=9.8).contains(&cols.weighted[i]));
            assert!(cols.votes[i] >= 5);
            assert!(cols.box_office[i] >= 0.0);
            let genres = cols.genres[i].split(',').count();
            assert!((1..=3).contains(&genres));
            assert!(cols.year[i] == "\\N" || (1950..2025).contains(&cols.year[i].parse::<i32>().unwrap()));
        }
    }

    #[test]
    fn test_weighted_rating_pulls_towards_mean() {
        assert_eq!(weighted_rating(9.0, 0, 6.4, 2500.0), 6.4);
        let popular = weighted_rating(9.0, 1_000_000, 6.4, 2500.0);
        assert!(popular > 8.9 && popular < 9.0);
    }

    #[test]
    fn test_dice_below_stays_in_bounds() {
        let mut dice = Dice(1);
        for _ in 0..1000 {
            assert!(dice.below(3) < 3);
            let u = dice.unit();
            assert!((0.0..1.0).contains(&u));
        }
    }
}
