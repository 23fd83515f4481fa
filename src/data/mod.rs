//! Data layer: core types, loading, filtering and aggregation.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → MovieDataset (genre cells split by `genre`)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────────┐
//!   │ MovieDataset  │  Vec<MovieRecord>, genre/year/rating indices
//!   └──────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  FilterState predicates → filtered indices
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ aggregate  │  by year, or by genre then year
//!   └───────────┘
//! ```

pub mod aggregate;
pub mod filter;
pub mod genre;
pub mod loader;
pub mod model;
