//! # Core Domain
//!
//! Pure math, no I/O. The circle engine lives here.
//!
//! This module contains the fundamental types and operations:
//! - `Point` / `LabeledPoint` / `Dataset` - feature vectors and their owner
//! - `Metric` - the distance kernel
//! - `Circle` - a class-pure hypersphere
//! - `factory`, `merge`, `prune` - the construction pipeline
//! - `CircleSet` - a trained model
//! - `classify`, `knn` - voting and nearest-neighbor strategies
//!
//! ## Design Principles
//!
//! - Deterministic: same inputs, same circles, same predictions
//! - No I/O operations (loading and saving live in adapters)
//! - Parallel loops start and join inside the calling function

mod point;
mod dataset;
mod circle;
mod error;
pub mod metric;
pub mod config;
pub mod factory;
pub mod merge;
pub mod prune;
pub mod knn;
pub mod classify;
pub mod model;

// Re-exports
pub use point::Point;
pub use dataset::Dataset;
pub use circle::{Circle, CircleRecord};
pub use error::{
    BuildError, BuildResult, ClassifyError, ClassifyResult, DatasetError, DatasetResult,
};
pub use metric::{Metric, MetricKind};
pub use config::{BuildConfig, Construction};
pub use classify::{Prediction, Strategy, VotingMode};
pub use model::{build_model, BuildStats, CircleSet};

/// Dense class identifier (`0..num_classes`)
pub type ClassId = usize;

/// A point with its class label
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledPoint {
    /// Position in feature space
    pub point: Point,
    /// Class id
    pub class: ClassId,
}

impl LabeledPoint {
    /// Create a new labeled point
    pub fn new(point: Point, class: ClassId) -> Self {
        Self { point, class }
    }

    /// Shorthand for the coordinates
    pub fn dims(&self) -> &[f32] {
        self.point.dims()
    }
}
