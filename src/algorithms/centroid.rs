//! Centroids and east/west bucketing.
//!
//! Thresholds are in the input coordinate space. The defaults fit a
//! longitude-like x axis centred on zero; maps drawn in another projection or
//! extent need their own values.

use std::collections::BTreeMap;

use geo::Centroid as _;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::tolerance::{DEFAULT_HIGH_THRESHOLD, DEFAULT_LOW_THRESHOLD};
use crate::model::{Centroid, DecodedFeature, RegionBucket};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Centroids with x below this are western.
    pub low: f64,
    /// Centroids with x above this are eastern.
    pub high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds { low: DEFAULT_LOW_THRESHOLD, high: DEFAULT_HIGH_THRESHOLD }
    }
}

impl Thresholds {
    pub fn new(low: f64, high: f64) -> Result<Self, ConfigError> {
        Thresholds { low, high }.validated()
    }

    pub fn validated(self) -> Result<Self, ConfigError> {
        if !self.low.is_finite() || !self.high.is_finite() || self.low > self.high {
            return Err(ConfigError::InvertedThresholds { low: self.low, high: self.high });
        }
        Ok(self)
    }
}

/// Bucket for a centroid x coordinate. Values equal to a threshold are middle.
pub fn classify(x: f64, t: &Thresholds) -> RegionBucket {
    if x < t.low {
        RegionBucket::Western
    } else if x > t.high {
        RegionBucket::Eastern
    } else {
        RegionBucket::Middle
    }
}

/// Area-weighted centroid per code. Features without a defined centroid are left out.
pub fn centroids(features: &[DecodedFeature]) -> BTreeMap<u64, Centroid> {
    let mut out = BTreeMap::new();
    for f in features {
        match f.geometry.centroid() {
            Some(p) => {
                out.insert(f.code, Centroid { x: p.x(), y: p.y() });
            }
            None => tracing::debug!(code = f.code, "no centroid for empty geometry"),
        }
    }
    out
}

/// Codes per bucket, ascending. Every bucket is present, possibly empty.
pub fn bucket_members(centroids: &BTreeMap<u64, Centroid>, t: &Thresholds) -> BTreeMap<RegionBucket, Vec<u64>> {
    let mut out: BTreeMap<RegionBucket, Vec<u64>> = RegionBucket::ALL.iter().map(|b| (*b, Vec::new())).collect();
    for (code, c) in centroids {
        out.entry(classify(c.x, t)).or_default().push(*code);
    }
    out
}

/// Presentation order within a bucket: north to south, ties by code.
pub fn sorted_by_y_desc(codes: &[u64], centroids: &BTreeMap<u64, Centroid>) -> Vec<u64> {
    let mut keyed: Vec<(f64, u64)> = codes
        .iter()
        .filter_map(|c| centroids.get(c).map(|p| (p.y, *c)))
        .collect();
    keyed.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
    keyed.into_iter().map(|(_, c)| c).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    #[test]
    fn thresholds_split_three_ways() {
        let t = Thresholds::new(-10.0, 10.0).unwrap();
        assert_eq!(classify(-10.5, &t), RegionBucket::Western);
        assert_eq!(classify(-10.0, &t), RegionBucket::Middle);
        assert_eq!(classify(10.0, &t), RegionBucket::Middle);
        assert_eq!(classify(10.1, &t), RegionBucket::Eastern);
    }

    #[test]
    fn inverted_thresholds_rejected() {
        assert!(Thresholds::new(5.0, -5.0).is_err());
        assert!(Thresholds::new(f64::NAN, 0.0).is_err());
        assert!(Thresholds::new(3.0, 3.0).is_ok());
    }

    #[test]
    fn square_centroid_and_view_order() {
        let sq = |code: u64, x: f64, y: f64| DecodedFeature {
            raw_id: code.to_string(),
            code,
            geometry: MultiPolygon::new(vec![polygon![
                (x: x, y: y), (x: x + 2.0, y: y), (x: x + 2.0, y: y + 2.0), (x: x, y: y + 2.0), (x: x, y: y),
            ]]),
        };
        let cs = centroids(&[sq(1, 0.0, 0.0), sq(2, 0.0, 10.0), sq(3, 100.0, 5.0)]);
        assert!((cs[&1].x - 1.0).abs() < 1e-12 && (cs[&1].y - 1.0).abs() < 1e-12);
        let buckets = bucket_members(&cs, &Thresholds::default());
        assert_eq!(buckets[&RegionBucket::Middle], vec![1, 2]);
        assert_eq!(buckets[&RegionBucket::Eastern], vec![3]);
        assert!(buckets[&RegionBucket::Western].is_empty());
        assert_eq!(sorted_by_y_desc(&[1, 2], &cs), vec![2, 1]);
    }
}
