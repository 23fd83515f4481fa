use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Logical canvas size the scales map into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub width: f64,
    pub height: f64,
}

impl Default for Extent {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 600.0,
        }
    }
}

// ---------------------------------------------------------------------------
// BandScale – discrete keys to equal-width intervals
// ---------------------------------------------------------------------------

/// Maps discrete keys to equal-width bands of a continuous range.
///
/// `padding` is the fraction of each step left empty (split evenly on both
/// sides of the band, and on the outer edges).
#[derive(Debug, Clone)]
pub struct BandScale<K> {
    keys: Vec<K>,
    index: HashMap<K, usize>,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl<K: Clone + Eq + Hash> BandScale<K> {
    pub fn new(keys: impl IntoIterator<Item = K>, range: [f64; 2], padding: f64) -> Self {
        let mut ordered = Vec::new();
        let mut index = HashMap::new();
        for k in keys {
            if !index.contains_key(&k) {
                index.insert(k.clone(), ordered.len());
                ordered.push(k);
            }
        }

        let padding = padding.clamp(0.0, 1.0);
        let n = ordered.len() as f64;
        let [r0, r1] = range;
        // n bands, n-1 inner gaps and two outer half-gaps.
        let step = if n > 0.0 { (r1 - r0) / n } else { 0.0 };
        let bandwidth = step * (1.0 - padding);
        let start = r0 + step * padding / 2.0;

        BandScale {
            keys: ordered,
            index,
            start,
            step,
            bandwidth,
        }
    }

    /// Left edge of the key's band, `None` for keys outside the domain.
    pub fn position(&self, key: &K) -> Option<f64> {
        self.index
            .get(key)
            .map(|&i| self.start + self.step * i as f64)
    }

    pub fn center(&self, key: &K) -> Option<f64> {
        self.position(key).map(|p| p + self.bandwidth / 2.0)
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn domain(&self) -> &[K] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

// ---------------------------------------------------------------------------
// LinearScale – continuous domain to continuous range
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: [f64; 2],
    range: [f64; 2],
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        LinearScale { domain, range }
    }

    /// Domain spanning the finite values of `values`; `[0, 0]` when there are none.
    pub fn from_values(values: impl IntoIterator<Item = f64>, range: [f64; 2]) -> Self {
        let domain = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<[f64; 2]>, v| match acc {
                Some([lo, hi]) => Some([lo.min(v), hi.max(v)]),
                None => Some([v, v]),
            })
            .unwrap_or([0.0, 0.0]);
        LinearScale::new(domain, range)
    }

    /// Extend the domain to include zero.
    pub fn with_zero(self) -> Self {
        let [d0, d1] = self.domain;
        LinearScale::new([d0.min(0.0), d1.max(0.0)], self.range)
    }

    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    pub fn range(&self) -> [f64; 2] {
        self.range
    }

    fn is_degenerate(&self) -> bool {
        let [d0, d1] = self.domain;
        !(d1 - d0).is_normal()
    }

    /// Degenerate domains map every value to the middle of the range.
    pub fn map(&self, v: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        if self.is_degenerate() {
            return (r0 + r1) / 2.0;
        }
        r0 + (v - d0) / (d1 - d0) * (r1 - r0)
    }

    pub fn invert(&self, p: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        if self.is_degenerate() || r1 == r0 {
            return d0;
        }
        d0 + (p - r0) / (r1 - r0) * (d1 - d0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_scale_positions() {
        let scale = BandScale::new([1999, 2000, 2001, 2000], [0.0, 300.0], 0.0);
        assert_eq!(scale.domain(), [1999, 2000, 2001]);
        assert_eq!(scale.bandwidth(), 100.0);
        assert_eq!(scale.position(&1999), Some(0.0));
        assert_eq!(scale.center(&2001), Some(250.0));
        assert_eq!(scale.position(&2010), None);
    }

    #[test]
    fn test_band_scale_padding() {
        let scale = BandScale::new(["a", "b"], [0.0, 200.0], 0.2);
        assert_eq!(scale.step(), 100.0);
        assert!((scale.bandwidth() - 80.0).abs() < 1e-9);
        assert_eq!(scale.position(&"a"), Some(10.0));
        assert_eq!(scale.center(&"b"), Some(150.0));
    }

    #[test]
    fn test_band_scale_empty_domain() {
        let scale: BandScale<i32> = BandScale::new([], [0.0, 100.0], 0.1);
        assert!(scale.is_empty());
        assert_eq!(scale.bandwidth(), 0.0);
        assert_eq!(scale.center(&2000), None);
    }

    #[test]
    fn test_linear_scale_map_and_invert() {
        let scale = LinearScale::new([0.0, 10.0], [0.0, 500.0]);
        assert_eq!(scale.map(5.0), 250.0);
        assert_eq!(scale.invert(100.0), 2.0);

        let flipped = LinearScale::new([0.0, 10.0], [500.0, 0.0]);
        assert_eq!(flipped.map(10.0), 0.0);
    }

    #[test]
    fn test_linear_scale_degenerate_domain() {
        let empty = LinearScale::from_values(std::iter::empty(), [0.0, 400.0]);
        assert_eq!(empty.domain(), [0.0, 0.0]);
        assert_eq!(empty.map(3.0), 200.0);

        let single = LinearScale::from_values([7.0, f64::NAN, 7.0], [0.0, 400.0]);
        assert_eq!(single.domain(), [7.0, 7.0]);
        assert_eq!(single.map(7.0), 200.0);
        assert_eq!(single.with_zero().domain(), [0.0, 7.0]);
    }
}
