//! # Circle Set
//!
//! A trained model: the surviving circles plus everything needed to use
//! them consistently (metric, dimensionality, label space, circles per
//! class).
//!
//! Build pipeline:
//!
//! ```text
//! points ─▶ factory ─▶ merge ─▶ count points ─▶ prune ─▶ CircleSet
//! ```
//!
//! Once built the set is immutable and `Sync`; any number of threads can
//! classify against it at once.

use tracing::info;

use super::classify::{containment_vote, Prediction, Strategy, VotingMode};
use super::config::{BuildConfig, Construction};
use super::error::{BuildError, BuildResult, ClassifyError, ClassifyResult};
use super::metric::MetricKind;
use super::{factory, knn, merge, prune};
use super::{Circle, CircleRecord, ClassId, LabeledPoint, Point};

/// Circle counts after each build stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Training points
    pub points: usize,
    /// Non-degenerate circles out of the factory
    pub constructed: usize,
    /// Circles left after merging
    pub merged: usize,
    /// Circles left after pruning
    pub pruned: usize,
}

/// A trained circle model
#[derive(Debug, Clone, PartialEq)]
pub struct CircleSet {
    circles: Vec<Circle>,
    circles_per_class: Vec<u32>,
    num_classes: usize,
    dimensionality: usize,
    metric: MetricKind,
    stats: BuildStats,
}

/// Build a circle set (see [`CircleSet::build`])
pub fn build_model(
    points: &[LabeledPoint],
    num_classes: usize,
    config: &BuildConfig,
) -> BuildResult<CircleSet> {
    CircleSet::build(points, num_classes, config)
}

impl CircleSet {
    /// Build circles covering `points`
    ///
    /// Every point must share the first point's dimensionality and have a
    /// class below `num_classes`.
    pub fn build(
        points: &[LabeledPoint],
        num_classes: usize,
        config: &BuildConfig,
    ) -> BuildResult<Self> {
        let dimensionality = validate(points, num_classes)?;
        let metric = config.metric;

        let mut circles = match config.construction {
            Construction::NearestNeighbor => factory::create_circles(points, &metric),
            Construction::MaxPureDistance => factory::create_max_pure_circles(points, &metric),
        };
        let constructed = circles.len();
        info!(constructed, points = points.len(), "circles created");

        if config.merges() {
            merge::merge_circles(&mut circles, points, &metric);
            info!(remaining = circles.len(), "circles merged");
        }
        let merged = circles.len();

        prune::count_points(&mut circles, points, &metric);

        if config.prune {
            prune::prune_useless(&mut circles, points, &metric);
            info!(remaining = circles.len(), "useless circles removed");
        }

        let stats = BuildStats {
            points: points.len(),
            constructed,
            merged,
            pruned: circles.len(),
        };

        Ok(Self::assemble(circles, num_classes, dimensionality, metric, stats))
    }

    fn assemble(
        circles: Vec<Circle>,
        num_classes: usize,
        dimensionality: usize,
        metric: MetricKind,
        stats: BuildStats,
    ) -> Self {
        let mut circles_per_class = vec![0u32; num_classes];
        for c in &circles {
            if let Some(n) = circles_per_class.get_mut(c.class) {
                *n += 1;
            }
        }

        Self {
            circles,
            circles_per_class,
            num_classes,
            dimensionality,
            metric,
            stats,
        }
    }

    /// Rebuild a set from persisted records
    ///
    /// Records keep their order. Stats only know the final circle count.
    pub fn from_records(
        records: Vec<CircleRecord>,
        num_classes: usize,
        dimensionality: usize,
        metric: MetricKind,
    ) -> BuildResult<Self> {
        let mut circles = Vec::with_capacity(records.len());

        for (index, r) in records.into_iter().enumerate() {
            if r.center.len() != dimensionality {
                return Err(BuildError::DimensionMismatch {
                    index,
                    expected: dimensionality,
                    got: r.center.len(),
                });
            }
            let class = usize::try_from(r.class).unwrap_or(usize::MAX);
            if class >= num_classes {
                return Err(BuildError::ClassOutOfRange {
                    index,
                    class,
                    num_classes,
                });
            }

            let mut circle = Circle::new(Point::new(r.center), r.radius, class);
            circle.point_count = r.point_count.max(0) as u32;
            circles.push(circle);
        }

        let stats = BuildStats {
            pruned: circles.len(),
            ..BuildStats::default()
        };
        Ok(Self::assemble(circles, num_classes, dimensionality, metric, stats))
    }

    /// Flatten into persistence records, in insertion order
    pub fn to_records(&self) -> Vec<CircleRecord> {
        self.circles.iter().map(Circle::to_record).collect()
    }

    // ------------------------------------------------------------------
    // Classification
    // ------------------------------------------------------------------

    /// Classify one query
    ///
    /// `training` is only read by `RegularKnn`; `k` only by the
    /// nearest-neighbor strategies. The query (and, for `RegularKnn`, every
    /// training point) must match the model's dimensionality.
    pub fn classify(
        &self,
        training: &[LabeledPoint],
        query: &Point,
        strategy: Strategy,
        k: usize,
    ) -> ClassifyResult<Prediction> {
        self.check_dimensionality(query.dimensionality())?;
        let q = query.dims();

        let prediction = match strategy {
            Strategy::Circles(mode) => containment_vote(
                &self.circles,
                &self.circles_per_class,
                q,
                mode,
                self.num_classes,
                &self.metric,
            ),
            Strategy::RegularKnn => {
                for p in training {
                    self.check_dimensionality(p.point.dimensionality())?;
                }
                knn::regular_knn(training, q, k, self.num_classes, &self.metric)
            }
            Strategy::KNearestCircles => {
                knn::k_nearest_circles(&self.circles, q, k, self.num_classes, &self.metric)
            }
            Strategy::KNearestRatios => {
                knn::k_nearest_ratios(&self.circles, q, k, self.num_classes, &self.metric)
            }
        };

        Ok(prediction)
    }

    /// Classify by integer (mode, sub-mode) codes
    ///
    /// Unknown codes fail with `InvalidConfiguration`.
    pub fn classify_codes(
        &self,
        training: &[LabeledPoint],
        query: &Point,
        mode: i32,
        sub_mode: i32,
        k: usize,
    ) -> ClassifyResult<Prediction> {
        let strategy = Strategy::from_codes(mode, sub_mode)?;
        self.classify(training, query, strategy, k)
    }

    /// Containment voting, then `fallback` if the circles do not decide
    ///
    /// Returns the prediction and whether the fallback produced it.
    pub fn classify_with_fallback(
        &self,
        training: &[LabeledPoint],
        query: &Point,
        voting: VotingMode,
        fallback: Strategy,
        k: usize,
    ) -> ClassifyResult<(Prediction, bool)> {
        let first = self.classify(training, query, Strategy::Circles(voting), k)?;
        if first.is_decided() {
            return Ok((first, false));
        }
        let second = self.classify(training, query, fallback, k)?;
        Ok((second, true))
    }

    fn check_dimensionality(&self, got: usize) -> ClassifyResult<()> {
        if got != self.dimensionality {
            return Err(ClassifyError::DimensionMismatch {
                expected: self.dimensionality,
                got,
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn circles(&self) -> &[Circle] {
        &self.circles
    }

    pub fn len(&self) -> usize {
        self.circles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn dimensionality(&self) -> usize {
        self.dimensionality
    }

    pub fn metric(&self) -> MetricKind {
        self.metric
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// Number of circles of one class
    pub fn class_circle_count(&self, class: ClassId) -> u32 {
        self.circles_per_class.get(class).copied().unwrap_or(0)
    }

    pub fn circles_per_class(&self) -> &[u32] {
        &self.circles_per_class
    }
}

/// Shared dimensionality of `points`, checking classes along the way
fn validate(points: &[LabeledPoint], num_classes: usize) -> BuildResult<usize> {
    let first = points.first().ok_or(BuildError::EmptyDataset)?;
    let dimensionality = first.point.dimensionality();

    for (index, p) in points.iter().enumerate() {
        if p.point.dimensionality() != dimensionality {
            return Err(BuildError::DimensionMismatch {
                index,
                expected: dimensionality,
                got: p.point.dimensionality(),
            });
        }
        if p.class >= num_classes {
            return Err(BuildError::ClassOutOfRange {
                index,
                class: p.class,
                num_classes,
            });
        }
    }

    Ok(dimensionality)
}
