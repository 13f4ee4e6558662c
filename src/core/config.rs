//! # Configuration
//!
//! How a circle set is built.
//!
//! Everything is configurable, not hardcoded:
//! - Distance metric
//! - Construction strategy
//! - Whether merging and pruning run
//!
//! Configs are plain serde structs so the CLI can read them from JSON; any
//! missing field falls back to its default.

use serde::{Deserialize, Serialize};

use super::metric::MetricKind;

/// How initial circle radii are chosen
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Construction {
    /// Radius = distance to the nearest neighbor when it shares the class,
    /// then greedy merging
    #[default]
    NearestNeighbor,

    /// Radius = farthest same-class distance before the first foreign point;
    /// merging is skipped
    MaxPureDistance,
}

/// Circle set build configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Distance metric used for construction AND classification
    pub metric: MetricKind,

    /// Initial radius strategy
    pub construction: Construction,

    /// Run the merge engine (nearest-neighbor construction only)
    pub merge: bool,

    /// Drop circles that own no training point
    pub prune: bool,
}

impl BuildConfig {
    /// Default configuration: Euclidean, nearest-neighbor, merge and prune
    pub fn new() -> Self {
        Self {
            metric: MetricKind::Euclidean,
            construction: Construction::NearestNeighbor,
            merge: true,
            prune: true,
        }
    }

    /// Set the distance metric
    pub fn with_metric(mut self, metric: MetricKind) -> Self {
        self.metric = metric;
        self
    }

    /// Set the construction strategy
    pub fn with_construction(mut self, construction: Construction) -> Self {
        self.construction = construction;
        self
    }

    /// Enable or disable merging
    pub fn with_merge(mut self, merge: bool) -> Self {
        self.merge = merge;
        self
    }

    /// Enable or disable pruning
    pub fn with_prune(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }

    /// Parse from JSON; absent fields keep their defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// True if this config runs the merge engine
    pub fn merges(&self) -> bool {
        self.merge && self.construction == Construction::NearestNeighbor
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::new()
    }
}
