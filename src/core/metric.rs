//! # Metric
//!
//! The distance kernel: how far apart are two feature vectors?
//!
//! Called O(n²) times during construction and merging, so implementations
//! are plain zipped folds the compiler can vectorize.
//!
//! A model is built and queried with ONE metric. `CircleSet` records the
//! `MetricKind` it was built with and classification always reuses it;
//! there is no way to mix metrics between construction and classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Trait for measuring distance between feature vectors
///
/// Lower values = closer. Always non-negative.
pub trait Metric: Send + Sync {
    /// Compute distance between two vectors
    ///
    /// Both slices must have the same length.
    fn distance(&self, a: &[f32], b: &[f32]) -> f32;

    /// Name of this metric (for logging/config)
    fn name(&self) -> &'static str;
}

// ============================================================================
// IMPLEMENTATIONS
// ============================================================================

/// Euclidean (L2) distance
///
/// The straight-line distance between two points. The default.
#[derive(Clone, Copy, Debug, Default)]
pub struct Euclidean;

impl Metric for Euclidean {
    fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        assert_eq!(a.len(), b.len(), "Vectors must have same dimensionality");

        a.iter()
            .zip(b)
            .map(|(x, y)| {
                let d = x - y;
                d * d
            })
            .sum::<f32>()
            .sqrt()
    }

    fn name(&self) -> &'static str {
        "euclidean"
    }
}

/// Manhattan (L1) distance
///
/// Sum of absolute differences along each dimension.
#[derive(Clone, Copy, Debug, Default)]
pub struct Manhattan;

impl Metric for Manhattan {
    fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        assert_eq!(a.len(), b.len(), "Vectors must have same dimensionality");

        a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
    }

    fn name(&self) -> &'static str {
        "manhattan"
    }
}

/// Cubic (L3) distance
///
/// Cube root of the summed cubed absolute differences.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cubic;

impl Metric for Cubic {
    fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        assert_eq!(a.len(), b.len(), "Vectors must have same dimensionality");

        a.iter()
            .zip(b)
            .map(|(x, y)| {
                let d = (x - y).abs();
                d * d * d
            })
            .sum::<f32>()
            .cbrt()
    }

    fn name(&self) -> &'static str {
        "cubic"
    }
}

// ============================================================================
// SELECTOR
// ============================================================================

/// Serializable metric selector
///
/// Stored in configs and circle files so a reloaded model keeps its metric.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    #[default]
    Euclidean,
    Manhattan,
    Cubic,
}

impl MetricKind {
    /// Byte tag used by the circle file format
    pub fn to_u8(self) -> u8 {
        match self {
            MetricKind::Euclidean => 0,
            MetricKind::Manhattan => 1,
            MetricKind::Cubic => 2,
        }
    }

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(MetricKind::Euclidean),
            1 => Some(MetricKind::Manhattan),
            2 => Some(MetricKind::Cubic),
            _ => None,
        }
    }
}

impl Metric for MetricKind {
    #[inline]
    fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            MetricKind::Euclidean => Euclidean.distance(a, b),
            MetricKind::Manhattan => Manhattan.distance(a, b),
            MetricKind::Cubic => Cubic.distance(a, b),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            MetricKind::Euclidean => Euclidean.name(),
            MetricKind::Manhattan => Manhattan.name(),
            MetricKind::Cubic => Cubic.name(),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" | "l2" => Ok(MetricKind::Euclidean),
            "manhattan" | "l1" => Ok(MetricKind::Manhattan),
            "cubic" | "l3" => Ok(MetricKind::Cubic),
            other => Err(format!("unknown metric: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean() {
        let dist = Euclidean.distance(&[0.0, 0.0], &[3.0, 4.0]);
        assert!((dist - 5.0).abs() < 0.0001);
    }

    #[test]
    fn test_manhattan() {
        let dist = Manhattan.distance(&[0.0, 0.0], &[3.0, 4.0]);
        assert!((dist - 7.0).abs() < 0.0001);
    }

    #[test]
    fn test_cubic() {
        // (27 + 64)^(1/3)
        let dist = Cubic.distance(&[0.0, 0.0], &[3.0, -4.0]);
        assert!((dist - 91.0f32.cbrt()).abs() < 0.0001);
    }

    #[test]
    fn test_identical_is_zero() {
        let a = [1.5, -2.0, 7.25];
        for kind in [MetricKind::Euclidean, MetricKind::Manhattan, MetricKind::Cubic] {
            assert_eq!(kind.distance(&a, &a), 0.0);
        }
    }

    #[test]
    fn test_kind_dispatch_matches_impl() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 0.0, -1.0];
        assert_eq!(MetricKind::Euclidean.distance(&a, &b), Euclidean.distance(&a, &b));
        assert_eq!(MetricKind::Manhattan.distance(&a, &b), Manhattan.distance(&a, &b));
        assert_eq!(MetricKind::Cubic.distance(&a, &b), Cubic.distance(&a, &b));
    }

    #[test]
    fn test_byte_tags() {
        for kind in [MetricKind::Euclidean, MetricKind::Manhattan, MetricKind::Cubic] {
            assert_eq!(MetricKind::from_u8(kind.to_u8()), Some(kind));
        }
        assert_eq!(MetricKind::from_u8(9), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!("L1".parse::<MetricKind>(), Ok(MetricKind::Manhattan));
        assert_eq!("euclidean".parse::<MetricKind>(), Ok(MetricKind::Euclidean));
        assert!("cosine".parse::<MetricKind>().is_err());
    }

    #[test]
    fn test_metric_names() {
        assert_eq!(Euclidean.name(), "euclidean");
        assert_eq!(Manhattan.name(), "manhattan");
        assert_eq!(Cubic.name(), "cubic");
        assert_eq!(MetricKind::default().to_string(), "euclidean");
    }

    #[test]
    #[should_panic(expected = "same dimensionality")]
    fn test_dimension_mismatch_panics() {
        Euclidean.distance(&[1.0, 2.0], &[1.0, 2.0, 3.0]);
    }
}
