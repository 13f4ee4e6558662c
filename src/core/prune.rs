//! # Pruning Stage
//!
//! Point counting and removal of circles that own nothing.
//!
//! A circle owns a training point when it is the largest-radius circle of
//! that point's class containing it (ties: lowest index). Circles that own
//! no point add no classification value and are dropped. Ownership is
//! tallied once against the unpruned set.

use rayon::prelude::*;

use super::metric::Metric;
use super::{Circle, LabeledPoint};

/// Set every circle's `point_count` to the number of training points inside
///
/// Counts all points geometrically inside, of any class.
pub fn count_points<M: Metric + ?Sized>(circles: &mut [Circle], points: &[LabeledPoint], metric: &M) {
    for circle in circles.iter_mut() {
        let count = {
            let c: &Circle = circle;
            points
                .par_iter()
                .filter(|p| c.contains(metric, p.dims()))
                .count()
        };
        circle.point_count = count as u32;
    }
}

/// Index of the circle that owns `point`, if any
pub fn owning_circle<M: Metric + ?Sized>(
    circles: &[Circle],
    point: &LabeledPoint,
    metric: &M,
) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;

    for (i, c) in circles.iter().enumerate() {
        if c.class != point.class {
            continue;
        }
        let larger = best.map_or(true, |(_, radius)| c.radius > radius);
        if larger && c.contains(metric, point.dims()) {
            best = Some((i, c.radius));
        }
    }

    best.map(|(i, _)| i)
}

/// How many training points each circle owns
///
/// Workers tally into private vectors, summed at the end.
pub fn ownership_tallies<M: Metric + ?Sized>(
    circles: &[Circle],
    points: &[LabeledPoint],
    metric: &M,
) -> Vec<u32> {
    let n = circles.len();

    points
        .par_iter()
        .fold(
            || vec![0u32; n],
            |mut local, p| {
                if let Some(i) = owning_circle(circles, p, metric) {
                    local[i] += 1;
                }
                local
            },
        )
        .reduce(
            || vec![0u32; n],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b) {
                    *x += y;
                }
                a
            },
        )
}

/// Remove circles that own no training point
///
/// Returns the number of circles removed.
pub fn prune_useless<M: Metric + ?Sized>(
    circles: &mut Vec<Circle>,
    points: &[LabeledPoint],
    metric: &M,
) -> usize {
    let tallies = ownership_tallies(circles, points, metric);
    let before = circles.len();

    let mut i = 0;
    circles.retain(|_| {
        let keep = tallies[i] > 0;
        i += 1;
        keep
    });

    before - circles.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metric::Euclidean;
    use crate::core::{ClassId, Point};

    fn at(x: f32, class: ClassId) -> LabeledPoint {
        LabeledPoint::new(Point::new(vec![x]), class)
    }

    fn circle(x: f32, radius: f32, class: ClassId) -> Circle {
        Circle::new(Point::new(vec![x]), radius, class)
    }

    #[test]
    fn test_count_points_includes_boundary() {
        let points = vec![at(0.0, 0), at(1.0, 0), at(2.0, 0), at(3.5, 1)];
        let mut circles = vec![circle(0.0, 2.0, 0), circle(3.5, 0.5, 1)];

        count_points(&mut circles, &points, &Euclidean);

        assert_eq!(circles[0].point_count, 3);
        assert_eq!(circles[1].point_count, 1);
    }

    #[test]
    fn test_nested_circle_removed() {
        let points = vec![at(0.0, 0), at(1.0, 0), at(2.0, 0)];
        let mut circles = vec![circle(1.0, 0.5, 0), circle(1.0, 2.0, 0)];

        let removed = prune_useless(&mut circles, &points, &Euclidean);

        assert_eq!(removed, 1);
        assert_eq!(circles.len(), 1);
        assert_eq!(circles[0].radius, 2.0);
    }

    #[test]
    fn test_equal_radius_tie_lowest_index_wins() {
        let points = vec![at(0.0, 0)];
        let circles = vec![circle(0.5, 1.0, 0), circle(-0.5, 1.0, 0)];

        assert_eq!(owning_circle(&circles, &points[0], &Euclidean), Some(0));
        assert_eq!(ownership_tallies(&circles, &points, &Euclidean), vec![1, 0]);
    }

    #[test]
    fn test_foreign_circles_never_own() {
        let points = vec![at(0.0, 1)];
        let circles = vec![circle(0.0, 5.0, 0)];

        assert_eq!(owning_circle(&circles, &points[0], &Euclidean), None);

        let mut circles = circles;
        prune_useless(&mut circles, &points, &Euclidean);
        assert!(circles.is_empty());
    }

    #[test]
    fn test_tallies_use_unpruned_radii() {
        // point 0.0 prefers the big circle, 3.0 is only in the small one
        let points = vec![at(0.0, 0), at(3.0, 0)];
        let mut circles = vec![circle(0.0, 2.0, 0), circle(3.0, 0.5, 0), circle(0.5, 0.1, 0)];

        let tallies = ownership_tallies(&circles, &points, &Euclidean);
        assert_eq!(tallies, vec![1, 1, 0]);

        prune_useless(&mut circles, &points, &Euclidean);
        assert_eq!(circles.len(), 2);
    }
}
