//! # HyperCircles
//!
//! Instance-reduction classifier that summarizes labeled training points as
//! a small set of class-pure balls ("circles").
//!
//! ## Overview
//!
//! Every training point starts as a circle whose radius reaches its nearest
//! neighbor if that neighbor shares its class. Circles then greedily absorb
//! same-class circles as long as no foreign point falls inside, and circles
//! that no point needs are pruned. A query is classified by the circles that
//! contain it; when none do, a nearest-neighbor strategy takes over.
//!
//! ## Key Features
//!
//! - **Class-pure circles**: no foreign training point ever lies inside
//! - **Six containment voting modes** plus three k-nearest strategies
//! - **Pluggable metrics**: Euclidean, Manhattan, Cubic
//! - **Parallel**: construction, merging and classification use rayon
//! - **Persistent**: save and reload trained circle sets
//!
//! ## Usage
//!
//! ```rust
//! use hypercircles::{BuildConfig, CircleSet, LabeledPoint, Point, Prediction, Strategy};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let training: Vec<LabeledPoint> = [(0.0, 0), (1.0, 0), (10.0, 1), (11.0, 1)]
//!     .iter()
//!     .map(|&(x, class)| LabeledPoint::new(Point::new(vec![x]), class))
//!     .collect();
//!
//! let model = CircleSet::build(&training, 2, &BuildConfig::default())?;
//! assert_eq!(model.len(), 2);
//!
//! let query = Point::new(vec![0.5]);
//! let prediction = model.classify(&training, &query, Strategy::default(), 5)?;
//! assert_eq!(prediction, Prediction::Class(0));
//!
//! // Outside every circle: containment voting abstains, KNN decides
//! let far = Point::new(vec![7.0]);
//! assert_eq!(model.classify(&training, &far, Strategy::default(), 5)?, Prediction::NoDecision);
//! assert_eq!(model.classify(&training, &far, Strategy::RegularKnn, 3)?, Prediction::Class(1));
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod ports;
pub mod adapters;

// Re-exports for convenience
pub use core::{
    BuildConfig, CircleSet, ClassId, Construction, Dataset, LabeledPoint, MetricKind, Point,
    Prediction, Strategy, VotingMode,
};
pub use adapters::eval::{EvalConfig, EvalReport};
pub use adapters::source::CsvSource;
pub use adapters::store::FileStore;
pub use ports::{CircleStore, PointSource};
