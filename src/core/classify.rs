//! # Classification Engine
//!
//! Turns a query point into a class by containment voting or a
//! nearest-neighbor strategy.
//!
//! Containment voting looks at every circle whose ball contains the query
//! (boundary inclusive) and accumulates a per-class vote:
//!
//! | Mode             | Vote per containing circle                   |
//! |------------------|----------------------------------------------|
//! | `SimpleMajority` | 1                                            |
//! | `CountVote`      | point_count                                  |
//! | `DensityVote`    | point_count / max(radius, 1e-6)              |
//! | `DistanceVote`   | point_count / (distance to center + 1e-4)    |
//! | `PerClassVote`   | 1 / circles of that class                    |
//! | `SmallestCircle` | class of the containing circle nearest the query |
//!
//! When no circle contains the query the result is `Prediction::NoDecision`,
//! never a made-up class, so the caller can pick a fallback.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ClassifyError;
use super::knn::{argmax, INVERSE_DISTANCE_EPSILON, MIN_RADIUS};
use super::metric::Metric;
use super::{Circle, ClassId};

/// Outcome of classifying one query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prediction {
    /// A class id
    Class(ClassId),
    /// No circle (or no neighbor) voted
    NoDecision,
}

impl Prediction {
    pub fn class(self) -> Option<ClassId> {
        match self {
            Prediction::Class(c) => Some(c),
            Prediction::NoDecision => None,
        }
    }

    pub fn is_decided(self) -> bool {
        matches!(self, Prediction::Class(_))
    }
}

impl From<Option<ClassId>> for Prediction {
    fn from(class: Option<ClassId>) -> Self {
        class.map_or(Prediction::NoDecision, Prediction::Class)
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Class(c) => write!(f, "{}", c),
            Prediction::NoDecision => f.write_str("no-decision"),
        }
    }
}

// ============================================================================
// MODES
// ============================================================================

/// How containing circles vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotingMode {
    SimpleMajority,
    CountVote,
    DensityVote,
    DistanceVote,
    PerClassVote,
    SmallestCircle,
}

impl VotingMode {
    /// Every mode, in code order
    pub const ALL: [VotingMode; 6] = [
        VotingMode::SimpleMajority,
        VotingMode::CountVote,
        VotingMode::DensityVote,
        VotingMode::DistanceVote,
        VotingMode::PerClassVote,
        VotingMode::SmallestCircle,
    ];

    /// Map a numeric sub-mode code (0-5)
    pub fn from_code(code: i32) -> Result<Self, ClassifyError> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or_else(|| ClassifyError::InvalidConfiguration(format!("unknown voting sub-mode {}", code)))
    }

    pub fn name(self) -> &'static str {
        match self {
            VotingMode::SimpleMajority => "simple-majority",
            VotingMode::CountVote => "count-vote",
            VotingMode::DensityVote => "density-vote",
            VotingMode::DistanceVote => "distance-vote",
            VotingMode::PerClassVote => "per-class-vote",
            VotingMode::SmallestCircle => "smallest-circle",
        }
    }
}

impl fmt::Display for VotingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VotingMode {
    type Err = ClassifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|m| m.name() == wanted)
            .ok_or_else(|| ClassifyError::InvalidConfiguration(format!("unknown voting mode: {}", s)))
    }
}

/// Which classifier to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Containment voting over the circles
    Circles(VotingMode),
    /// k nearest training points
    RegularKnn,
    /// k nearest circle centers
    KNearestCircles,
    /// k circles with the lowest distance / radius
    KNearestRatios,
}

impl Strategy {
    /// The nearest-neighbor strategies, in code order
    pub const KNN_FAMILY: [Strategy; 3] = [
        Strategy::RegularKnn,
        Strategy::KNearestCircles,
        Strategy::KNearestRatios,
    ];

    /// Map numeric (mode, sub-mode) codes
    ///
    /// Mode 0 uses circles with `sub_mode` as the voting mode; modes 1-3 are
    /// the nearest-neighbor strategies and ignore `sub_mode`. Anything else
    /// is rejected, never defaulted.
    pub fn from_codes(mode: i32, sub_mode: i32) -> Result<Self, ClassifyError> {
        match mode {
            0 => Ok(Strategy::Circles(VotingMode::from_code(sub_mode)?)),
            1 => Ok(Strategy::RegularKnn),
            2 => Ok(Strategy::KNearestCircles),
            3 => Ok(Strategy::KNearestRatios),
            other => Err(ClassifyError::InvalidConfiguration(format!(
                "unknown classification mode {}",
                other
            ))),
        }
    }

    pub fn uses_k(self) -> bool {
        !matches!(self, Strategy::Circles(_))
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Circles(VotingMode::SimpleMajority)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Circles(mode) => write!(f, "{}", mode),
            Strategy::RegularKnn => f.write_str("regular-knn"),
            Strategy::KNearestCircles => f.write_str("k-nearest-circles"),
            Strategy::KNearestRatios => f.write_str("k-nearest-ratios"),
        }
    }
}

impl FromStr for Strategy {
    type Err = ClassifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "regular-knn" | "knn" => Ok(Strategy::RegularKnn),
            "k-nearest-circles" => Ok(Strategy::KNearestCircles),
            "k-nearest-ratios" | "k-nearest-circle-ratio" => Ok(Strategy::KNearestRatios),
            _ => s.parse::<VotingMode>().map(Strategy::Circles).map_err(|_| {
                ClassifyError::InvalidConfiguration(format!("unknown strategy: {}", s))
            }),
        }
    }
}

// ============================================================================
// CONTAINMENT VOTING
// ============================================================================

/// Vote with every circle that contains `query`
///
/// `circles_per_class` is only read by `PerClassVote`.
pub fn containment_vote<M: Metric + ?Sized>(
    circles: &[Circle],
    circles_per_class: &[u32],
    query: &[f32],
    mode: VotingMode,
    num_classes: usize,
    metric: &M,
) -> Prediction {
    if mode == VotingMode::SmallestCircle {
        return smallest_containing(circles, query, metric);
    }

    containment_votes(circles, circles_per_class, query, mode, num_classes, metric)
        .map_or(Prediction::NoDecision, |votes| argmax(&votes).into())
}

/// Per-class vote totals; `None` for `SmallestCircle`, which does not tally
pub fn containment_votes<M: Metric + ?Sized>(
    circles: &[Circle],
    circles_per_class: &[u32],
    query: &[f32],
    mode: VotingMode,
    num_classes: usize,
    metric: &M,
) -> Option<Vec<f32>> {
    if mode == VotingMode::SmallestCircle {
        return None;
    }

    let mut votes = vec![0.0f32; num_classes];

    for c in circles {
        let distance = metric.distance(c.center.dims(), query);
        if distance > c.radius {
            continue;
        }
        let Some(slot) = votes.get_mut(c.class) else {
            continue;
        };

        *slot += match mode {
            VotingMode::SimpleMajority => 1.0,
            VotingMode::CountVote => c.point_count as f32,
            VotingMode::DensityVote => c.point_count as f32 / c.radius.max(MIN_RADIUS),
            VotingMode::DistanceVote => {
                c.point_count as f32 / (distance + INVERSE_DISTANCE_EPSILON)
            }
            VotingMode::PerClassVote => match circles_per_class.get(c.class) {
                Some(&n) if n > 0 => 1.0 / n as f32,
                _ => 0.0,
            },
            VotingMode::SmallestCircle => 0.0,
        };
    }

    Some(votes)
}

/// Class of the containing circle whose center is nearest the query
fn smallest_containing<M: Metric + ?Sized>(circles: &[Circle], query: &[f32], metric: &M) -> Prediction {
    let mut best: Option<(f32, ClassId)> = None;

    for c in circles {
        let distance = metric.distance(c.center.dims(), query);
        if distance > c.radius {
            continue;
        }
        if best.map_or(true, |(d, _)| distance < d) {
            best = Some((distance, c.class));
        }
    }

    best.map(|(_, class)| class).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metric::Euclidean;
    use crate::core::Point;

    fn circle(x: f32, radius: f32, class: ClassId, count: u32) -> Circle {
        let mut c = Circle::new(Point::new(vec![x]), radius, class);
        c.point_count = count;
        c
    }

    fn vote(circles: &[Circle], per_class: &[u32], x: f32, mode: VotingMode) -> Prediction {
        containment_vote(circles, per_class, &[x], mode, 2, &Euclidean)
    }

    #[test]
    fn test_boundary_is_inside() {
        let circles = vec![circle(0.0, 2.0, 1, 3)];
        assert_eq!(vote(&circles, &[0, 1], 2.0, VotingMode::SimpleMajority), Prediction::Class(1));
        assert_eq!(vote(&circles, &[0, 1], -2.0, VotingMode::SmallestCircle), Prediction::Class(1));
    }

    #[test]
    fn test_outside_everything_is_no_decision() {
        let circles = vec![circle(0.0, 2.0, 0, 3), circle(10.0, 1.0, 1, 2)];
        for mode in VotingMode::ALL {
            assert_eq!(vote(&circles, &[1, 1], 5.0, mode), Prediction::NoDecision);
        }
    }

    #[test]
    fn test_simple_majority() {
        let circles = vec![
            circle(0.0, 5.0, 0, 1),
            circle(1.0, 5.0, 1, 1),
            circle(2.0, 5.0, 1, 1),
        ];
        assert_eq!(vote(&circles, &[1, 2], 1.0, VotingMode::SimpleMajority), Prediction::Class(1));
    }

    #[test]
    fn test_count_vote_outweighs_majority() {
        let circles = vec![
            circle(0.0, 5.0, 0, 50),
            circle(1.0, 5.0, 1, 3),
            circle(2.0, 5.0, 1, 3),
        ];
        assert_eq!(vote(&circles, &[1, 2], 1.0, VotingMode::CountVote), Prediction::Class(0));
    }

    #[test]
    fn test_density_vote() {
        // 10 / 10 = 1 vs 4 / 1 = 4
        let circles = vec![circle(0.0, 10.0, 0, 10), circle(0.5, 1.0, 1, 4)];
        assert_eq!(vote(&circles, &[1, 1], 0.0, VotingMode::DensityVote), Prediction::Class(1));
    }

    #[test]
    fn test_distance_vote() {
        // equal counts, the nearer center wins
        let circles = vec![circle(0.0, 10.0, 0, 5), circle(3.0, 10.0, 1, 5)];
        assert_eq!(vote(&circles, &[1, 1], 2.5, VotingMode::DistanceVote), Prediction::Class(1));
        assert_eq!(vote(&circles, &[1, 1], 0.5, VotingMode::DistanceVote), Prediction::Class(0));
    }

    #[test]
    fn test_per_class_vote() {
        // class 0 has two circles containing the query but four overall
        let circles = vec![
            circle(0.0, 5.0, 0, 1),
            circle(0.5, 5.0, 0, 1),
            circle(1.0, 5.0, 1, 1),
        ];
        let per_class = [4, 1];
        let votes =
            containment_votes(&circles, &per_class, &[0.5], VotingMode::PerClassVote, 2, &Euclidean)
                .unwrap();

        assert!((votes[0] - 0.5).abs() < 1e-6);
        assert!((votes[1] - 1.0).abs() < 1e-6);
        assert_eq!(vote(&circles, &per_class, 0.5, VotingMode::PerClassVote), Prediction::Class(1));
    }

    #[test]
    fn test_smallest_circle_uses_center_distance() {
        let circles = vec![circle(0.0, 10.0, 0, 100), circle(3.0, 1.0, 1, 1)];
        assert_eq!(vote(&circles, &[1, 1], 2.5, VotingMode::SmallestCircle), Prediction::Class(1));
        assert_eq!(vote(&circles, &[1, 1], 1.0, VotingMode::SmallestCircle), Prediction::Class(0));
    }

    #[test]
    fn test_idempotent() {
        let circles = vec![circle(0.0, 3.0, 0, 4), circle(2.0, 3.0, 1, 6)];
        for mode in VotingMode::ALL {
            let first = vote(&circles, &[1, 1], 1.2, mode);
            assert_eq!(vote(&circles, &[1, 1], 1.2, mode), first);
        }
    }

    #[test]
    fn test_from_codes() {
        assert_eq!(
            Strategy::from_codes(0, 2),
            Ok(Strategy::Circles(VotingMode::DensityVote))
        );
        assert_eq!(Strategy::from_codes(1, -1), Ok(Strategy::RegularKnn));
        assert_eq!(Strategy::from_codes(3, 99), Ok(Strategy::KNearestRatios));

        assert!(matches!(
            Strategy::from_codes(0, 6),
            Err(ClassifyError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            Strategy::from_codes(4, 0),
            Err(ClassifyError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("density_vote".parse::<VotingMode>(), Ok(VotingMode::DensityVote));
        assert_eq!("knn".parse::<Strategy>(), Ok(Strategy::RegularKnn));
        assert_eq!(
            "smallest-circle".parse::<Strategy>(),
            Ok(Strategy::Circles(VotingMode::SmallestCircle))
        );
        assert!("majority-ish".parse::<Strategy>().is_err());

        for mode in VotingMode::ALL {
            assert_eq!(mode.to_string().parse::<VotingMode>(), Ok(mode));
        }
        for strategy in Strategy::KNN_FAMILY {
            assert_eq!(strategy.to_string().parse::<Strategy>(), Ok(strategy));
        }
    }

    #[test]
    fn test_prediction_conversions() {
        assert_eq!(Prediction::from(Some(3)), Prediction::Class(3));
        assert_eq!(Prediction::from(None), Prediction::NoDecision);
        assert_eq!(Prediction::NoDecision.class(), None);
        assert_eq!(Prediction::NoDecision.to_string(), "no-decision");
    }
}
