//! # Nearest-Neighbor Strategies
//!
//! Brute force k-nearest search used standalone or as the fallback when no
//! circle contains a query.
//!
//! Three candidate sources, one voting rule:
//! - training points, scored by distance (`regular_knn`)
//! - circle centers, scored by distance (`k_nearest_circles`)
//! - circles, scored by distance / radius (`k_nearest_ratios`): how far the
//!   query sits outside a circle relative to its size
//!
//! The `k` lowest scores vote `1 / (score + ε)` for their class. Selection is
//! a partial sort ordered by (score, index), so the chosen set is the same on
//! every run even though scores are computed in parallel.

use std::cmp::Ordering;

use rayon::prelude::*;

use super::classify::Prediction;
use super::metric::Metric;
use super::{Circle, ClassId, LabeledPoint};

/// Added to every score before inverting it
pub const INVERSE_DISTANCE_EPSILON: f32 = 1e-4;

/// Floor for radii used as divisors
pub const MIN_RADIUS: f32 = 1e-6;

/// A scored candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Index into the candidate source (training points or circles)
    pub index: usize,
    /// Class the candidate votes for
    pub class: ClassId,
    /// Distance or ratio; lower = closer
    pub score: f32,
}

impl Neighbor {
    pub fn new(index: usize, class: ClassId, score: f32) -> Self {
        Self { index, class, score }
    }

    fn closer(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then(self.index.cmp(&other.index))
    }
}

/// Distance from the query to every training point
pub fn point_scores<M: Metric + ?Sized>(
    points: &[LabeledPoint],
    query: &[f32],
    metric: &M,
) -> Vec<Neighbor> {
    points
        .par_iter()
        .enumerate()
        .map(|(i, p)| Neighbor::new(i, p.class, metric.distance(p.dims(), query)))
        .collect()
}

/// Distance from the query to every circle center (radius ignored)
pub fn circle_scores<M: Metric + ?Sized>(
    circles: &[Circle],
    query: &[f32],
    metric: &M,
) -> Vec<Neighbor> {
    circles
        .par_iter()
        .enumerate()
        .map(|(i, c)| Neighbor::new(i, c.class, metric.distance(c.center.dims(), query)))
        .collect()
}

/// Distance to each circle center divided by its radius
///
/// A far but huge circle can score lower than a near but tiny one.
pub fn circle_ratio_scores<M: Metric + ?Sized>(
    circles: &[Circle],
    query: &[f32],
    metric: &M,
) -> Vec<Neighbor> {
    circles
        .par_iter()
        .enumerate()
        .map(|(i, c)| {
            let ratio = metric.distance(c.center.dims(), query) / c.radius.max(MIN_RADIUS);
            Neighbor::new(i, c.class, ratio)
        })
        .collect()
}

/// Keep the `k` lowest-scored candidates, closest first
///
/// `k` is clamped to the number of candidates.
pub fn nearest(mut candidates: Vec<Neighbor>, k: usize) -> Vec<Neighbor> {
    let k = k.min(candidates.len());
    if k == 0 {
        return Vec::new();
    }

    if k < candidates.len() {
        candidates.select_nth_unstable_by(k - 1, Neighbor::closer);
        candidates.truncate(k);
    }
    candidates.sort_by(Neighbor::closer);
    candidates
}

/// Inverse-score votes per class
///
/// Candidates with a class outside `0..num_classes` are ignored.
pub fn inverse_distance_votes(neighbors: &[Neighbor], num_classes: usize) -> Vec<f32> {
    let mut votes = vec![0.0f32; num_classes];
    for n in neighbors {
        if let Some(v) = votes.get_mut(n.class) {
            *v += 1.0 / (n.score + INVERSE_DISTANCE_EPSILON);
        }
    }
    votes
}

/// Class with the most votes; `None` if nothing scored above zero
///
/// Strict comparison, so the lowest class id wins a tie.
pub fn argmax(votes: &[f32]) -> Option<ClassId> {
    let mut max_votes = 0.0f32;
    let mut prediction = None;
    for (class, &v) in votes.iter().enumerate() {
        if v > max_votes {
            max_votes = v;
            prediction = Some(class);
        }
    }
    prediction
}

/// Select the `k` nearest candidates and vote
pub fn vote_nearest(candidates: Vec<Neighbor>, k: usize, num_classes: usize) -> Prediction {
    let neighbors = nearest(candidates, k);
    argmax(&inverse_distance_votes(&neighbors, num_classes)).into()
}

/// Standard k-nearest-neighbors over the training points
pub fn regular_knn<M: Metric + ?Sized>(
    points: &[LabeledPoint],
    query: &[f32],
    k: usize,
    num_classes: usize,
    metric: &M,
) -> Prediction {
    vote_nearest(point_scores(points, query, metric), k, num_classes)
}

/// k nearest circle centers
pub fn k_nearest_circles<M: Metric + ?Sized>(
    circles: &[Circle],
    query: &[f32],
    k: usize,
    num_classes: usize,
    metric: &M,
) -> Prediction {
    vote_nearest(circle_scores(circles, query, metric), k, num_classes)
}

/// k circles with the lowest distance / radius
pub fn k_nearest_ratios<M: Metric + ?Sized>(
    circles: &[Circle],
    query: &[f32],
    k: usize,
    num_classes: usize,
    metric: &M,
) -> Prediction {
    vote_nearest(circle_ratio_scores(circles, query, metric), k, num_classes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metric::Euclidean;
    use crate::core::Point;

    fn at(x: f32, class: ClassId) -> LabeledPoint {
        LabeledPoint::new(Point::new(vec![x]), class)
    }

    fn circle(x: f32, radius: f32, class: ClassId) -> Circle {
        Circle::new(Point::new(vec![x]), radius, class)
    }

    #[test]
    fn test_nearest_selects_k_lowest() {
        let candidates = vec![
            Neighbor::new(0, 0, 5.0),
            Neighbor::new(1, 1, 1.0),
            Neighbor::new(2, 0, 3.0),
            Neighbor::new(3, 1, 0.5),
        ];
        let picked = nearest(candidates, 2);

        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0].index, 3);
        assert_eq!(picked[1].index, 1);
    }

    #[test]
    fn test_nearest_ties_break_by_index() {
        let candidates = vec![
            Neighbor::new(2, 1, 1.0),
            Neighbor::new(0, 0, 1.0),
            Neighbor::new(1, 1, 1.0),
        ];
        let picked = nearest(candidates, 2);
        assert_eq!(picked.iter().map(|n| n.index).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_nearest_clamps_k() {
        let candidates = vec![Neighbor::new(0, 0, 1.0)];
        assert_eq!(nearest(candidates.clone(), 10).len(), 1);
        assert!(nearest(candidates, 0).is_empty());
    }

    #[test]
    fn test_regular_knn() {
        let points = vec![at(0.0, 0), at(1.0, 0), at(10.0, 1), at(11.0, 1), at(12.0, 1)];

        assert_eq!(regular_knn(&points, &[0.5], 3, 2, &Euclidean), Prediction::Class(0));
        assert_eq!(regular_knn(&points, &[10.5], 3, 2, &Euclidean), Prediction::Class(1));
    }

    #[test]
    fn test_inverse_distance_outweighs_majority() {
        // one very close class-1 point beats two distant class-0 points
        let points = vec![at(0.1, 1), at(5.0, 0), at(5.5, 0)];
        assert_eq!(regular_knn(&points, &[0.0], 3, 2, &Euclidean), Prediction::Class(1));
    }

    #[test]
    fn test_zero_distance_is_guarded() {
        let points = vec![at(2.0, 1), at(3.0, 0)];
        let votes = inverse_distance_votes(&nearest(point_scores(&points, &[2.0], &Euclidean), 2), 2);

        assert!(votes.iter().all(|v| v.is_finite()));
        assert!((votes[1] - 1.0 / INVERSE_DISTANCE_EPSILON).abs() < 1.0);
    }

    #[test]
    fn test_empty_candidates_no_decision() {
        assert_eq!(regular_knn(&[], &[0.0], 5, 2, &Euclidean), Prediction::NoDecision);
        assert_eq!(k_nearest_circles(&[], &[0.0], 5, 2, &Euclidean), Prediction::NoDecision);
    }

    #[test]
    fn test_k_nearest_circles_ignores_radius() {
        let circles = vec![circle(1.0, 0.1, 0), circle(-3.0, 100.0, 1)];
        assert_eq!(k_nearest_circles(&circles, &[0.0], 1, 2, &Euclidean), Prediction::Class(0));
    }

    #[test]
    fn test_ratio_prefers_large_distant_circle() {
        // query outside both: 1.0 / 0.1 = 10 vs 3.0 / 100 = 0.03
        let circles = vec![circle(1.0, 0.1, 0), circle(-3.0, 100.0, 1)];
        assert_eq!(k_nearest_ratios(&circles, &[0.0], 1, 2, &Euclidean), Prediction::Class(1));
    }

    #[test]
    fn test_ratio_tiny_circle_near_query_dominates() {
        let circles = vec![circle(0.0, 0.01, 0), circle(50.0, 10.0, 1)];
        let query = [0.001];

        let neighbors = nearest(circle_ratio_scores(&circles, &query, &Euclidean), 2);
        let votes = inverse_distance_votes(&neighbors, 2);

        // ratios 0.1 and ~5.0
        assert!(votes[0] > 40.0 * votes[1]);
        assert_eq!(argmax(&votes), Some(0));
    }

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.0, 2.0, 1.0]), Some(1));
        assert_eq!(argmax(&[1.0, 1.0]), Some(0));
        assert_eq!(argmax(&[0.0, 0.0]), None);
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_knn_is_deterministic() {
        let points: Vec<_> = (0..200)
            .map(|i| at((i % 17) as f32 * 0.25, i % 3))
            .collect();
        let first = regular_knn(&points, &[1.1], 7, 3, &Euclidean);
        for _ in 0..10 {
            assert_eq!(regular_knn(&points, &[1.1], 7, 3, &Euclidean), first);
        }
    }
}
