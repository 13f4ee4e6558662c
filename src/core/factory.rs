//! # Circle Factory
//!
//! Turns every training point into a candidate circle and sizes it.
//!
//! Two strategies:
//! - `create_circles` - radius = distance to the nearest neighbor when that
//!   neighbor shares the class; merging grows these later
//! - `create_max_pure_circles` - radius = largest same-class distance that
//!   stays closer than any foreign point
//!
//! Either way a circle that ends with radius 0 is degenerate and dropped.
//! Each radius depends only on the read-only dataset, so every circle is
//! sized in parallel.

use rayon::prelude::*;
use tracing::debug;

use super::metric::Metric;
use super::{Circle, ClassId, LabeledPoint};

/// Build one circle per point, sized by its nearest neighbor
///
/// Degenerate circles (nearest neighbor of another class) are removed, so
/// every returned circle has a positive radius.
pub fn create_circles<M: Metric + ?Sized>(points: &[LabeledPoint], metric: &M) -> Vec<Circle> {
    let mut circles: Vec<Circle> = points
        .par_iter()
        .enumerate()
        .map(|(i, p)| {
            let radius = nearest_neighbor_radius(i, points, metric);
            Circle::new(p.point.clone(), radius, p.class)
        })
        .collect();

    let candidates = circles.len();
    circles.retain(|c| !c.is_degenerate());

    debug!(
        candidates,
        kept = circles.len(),
        metric = metric.name(),
        "nearest-neighbor circles created"
    );

    circles
}

/// Build one circle per point, sized to its largest pure radius
pub fn create_max_pure_circles<M: Metric + ?Sized>(
    points: &[LabeledPoint],
    metric: &M,
) -> Vec<Circle> {
    let mut circles: Vec<Circle> = points
        .par_iter()
        .enumerate()
        .map(|(i, p)| {
            let radius = max_pure_radius(i, points, metric);
            Circle::new(p.point.clone(), radius, p.class)
        })
        .collect();

    let candidates = circles.len();
    circles.retain(|c| !c.is_degenerate());

    debug!(
        candidates,
        kept = circles.len(),
        metric = metric.name(),
        "max-pure circles created"
    );

    circles
}

/// Radius for the circle generated by `points[index]`
///
/// Scans every other point (by index, so coincident points still count)
/// for the minimum distance. On an exact tie a same-class provisional
/// winner is replaced by the tying point's class, while a foreign winner is
/// kept. Returns the minimum distance if the winner shares the class,
/// otherwise 0.
pub fn nearest_neighbor_radius<M: Metric + ?Sized>(
    index: usize,
    points: &[LabeledPoint],
    metric: &M,
) -> f32 {
    let own = &points[index];
    let mut min_dist = f32::MAX;
    let mut min_class: Option<ClassId> = None;

    for (j, p) in points.iter().enumerate() {
        if j == index {
            continue;
        }

        let dist = metric.distance(own.dims(), p.dims());

        if dist < min_dist {
            min_dist = dist;
            min_class = Some(p.class);
        } else if dist == min_dist && min_class == Some(own.class) {
            // tie goes to the wrong class
            min_class = Some(p.class);
        }
    }

    if min_class == Some(own.class) {
        min_dist
    } else {
        0.0
    }
}

/// Largest radius around `points[index]` that contains no foreign point
///
/// The farthest same-class point strictly closer than the nearest foreign
/// point. 0 if there is none.
pub fn max_pure_radius<M: Metric + ?Sized>(
    index: usize,
    points: &[LabeledPoint],
    metric: &M,
) -> f32 {
    let own = &points[index];

    let mut distances: Vec<(f32, bool)> = points
        .iter()
        .enumerate()
        .filter(|(j, _)| *j != index)
        .map(|(_, p)| (metric.distance(own.dims(), p.dims()), p.class == own.class))
        .collect();

    distances.sort_by(|a, b| a.0.total_cmp(&b.0));

    let nearest_foreign = distances
        .iter()
        .find(|(_, same)| !same)
        .map(|(d, _)| *d)
        .unwrap_or(f32::INFINITY);

    distances
        .iter()
        .take_while(|(d, _)| *d < nearest_foreign)
        .filter(|(_, same)| *same)
        .map(|(d, _)| *d)
        .fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metric::Euclidean;
    use crate::core::Point;

    fn line(values: &[(f32, ClassId)]) -> Vec<LabeledPoint> {
        values
            .iter()
            .map(|&(x, c)| LabeledPoint::new(Point::new(vec![x]), c))
            .collect()
    }

    #[test]
    fn test_two_cluster_scenario() {
        let points = line(&[(0.0, 0), (1.0, 0), (10.0, 1), (11.0, 1)]);
        let circles = create_circles(&points, &Euclidean);

        assert_eq!(circles.len(), 4);
        for c in &circles {
            assert!((c.radius - 1.0).abs() < 1e-6);
        }
        assert_eq!(circles[0].class, 0);
        assert_eq!(circles[2].class, 1);
    }

    #[test]
    fn test_foreign_neighbor_is_degenerate() {
        // 1.5 sits next to the class-0 point at 1.0
        let points = line(&[(0.0, 0), (1.0, 0), (1.5, 1), (9.0, 1)]);
        assert_eq!(nearest_neighbor_radius(2, &points, &Euclidean), 0.0);

        let circles = create_circles(&points, &Euclidean);
        assert!(circles.iter().all(|c| !c.is_degenerate()));
        assert!(circles.iter().all(|c| c.center.dims() != [1.5]));
    }

    #[test]
    fn test_tie_goes_to_foreign_class() {
        // same-class neighbor first, foreign neighbor at the same distance
        let points = line(&[(0.0, 0), (-1.0, 0), (1.0, 1)]);
        assert_eq!(nearest_neighbor_radius(0, &points, &Euclidean), 0.0);

        // foreign neighbor first, same-class tie does not win it back
        let points = line(&[(0.0, 0), (1.0, 1), (-1.0, 0)]);
        assert_eq!(nearest_neighbor_radius(0, &points, &Euclidean), 0.0);
    }

    #[test]
    fn test_excludes_self_by_identity() {
        // coincident same-class points: each sees the other at distance 0
        let points = line(&[(2.0, 0), (2.0, 0), (5.0, 1)]);
        assert_eq!(nearest_neighbor_radius(0, &points, &Euclidean), 0.0);
        assert_eq!(nearest_neighbor_radius(2, &points, &Euclidean), 0.0);
    }

    #[test]
    fn test_single_point_is_degenerate() {
        let points = line(&[(3.0, 0)]);
        assert!(create_circles(&points, &Euclidean).is_empty());
    }

    #[test]
    fn test_max_pure_radius() {
        let points = line(&[(0.0, 0), (1.0, 0), (3.0, 0), (5.0, 1), (8.0, 0)]);
        // same-class at 1 and 3, foreign at 5
        assert!((max_pure_radius(0, &points, &Euclidean) - 3.0).abs() < 1e-6);
        // nearest is foreign (5 at distance 3 vs 3.0 at 5)
        assert_eq!(max_pure_radius(4, &points, &Euclidean), 0.0);
    }

    #[test]
    fn test_max_pure_radius_without_foreign() {
        let points = line(&[(0.0, 0), (2.0, 0), (7.0, 0)]);
        assert!((max_pure_radius(0, &points, &Euclidean) - 7.0).abs() < 1e-6);
    }

    #[test]
    fn test_max_pure_circles_are_pure() {
        let points = line(&[(0.0, 0), (1.0, 0), (3.0, 0), (5.0, 1), (6.0, 1), (8.0, 0)]);
        let circles = create_max_pure_circles(&points, &Euclidean);

        assert!(!circles.is_empty());
        for c in &circles {
            for p in points.iter().filter(|p| p.class != c.class) {
                assert!(Euclidean.distance(c.center.dims(), p.dims()) > c.radius);
            }
        }
    }
}
