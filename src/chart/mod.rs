//! Chart layer: scales, stacking and scene construction.
//!
//! Everything here is pure: it turns filtered records into positioned marks
//! in a logical canvas ([`scale::Extent`]). Drawing lives in `ui::plot`.

pub mod scale;
pub mod scene;
pub mod stack;
