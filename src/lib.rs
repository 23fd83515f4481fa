//! Marquee: an interactive explorer for movie datasets.
//!
//! Records are loaded from CSV, JSON or Parquet ([`data::loader`]), narrowed
//! by a [`data::filter::FilterState`], grouped ([`data::aggregate`]) and laid
//! out as a dot plot or a streamgraph ([`chart`]). The egui front end lives in
//! [`app`] and [`ui`].

pub mod app;
pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;
