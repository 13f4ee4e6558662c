//! # Circle
//!
//! A class-pure hypersphere: every training point of another class lies
//! strictly outside it.
//!
//! The center is always the location of an original training point.
//! Containment is boundary inclusive (`distance <= radius`).

use super::metric::Metric;
use super::{ClassId, Point};

/// A class-pure region of feature space
#[derive(Clone, Debug, PartialEq)]
pub struct Circle {
    /// Location of the training point that generated this circle
    pub center: Point,
    /// Non-negative radius; 0 means degenerate
    pub radius: f32,
    /// Class this circle votes for
    pub class: ClassId,
    /// Training points geometrically inside (set after merging)
    pub point_count: u32,
}

impl Circle {
    /// Create a circle centered on a training point
    pub fn new(center: Point, radius: f32, class: ClassId) -> Self {
        Self {
            center,
            radius,
            class,
            point_count: 1,
        }
    }

    /// Check if a location falls inside this circle (boundary inclusive)
    #[inline]
    pub fn contains<M: Metric + ?Sized>(&self, metric: &M, location: &[f32]) -> bool {
        metric.distance(self.center.dims(), location) <= self.radius
    }

    /// Degenerate circles (radius 0) are never part of a usable set
    pub fn is_degenerate(&self) -> bool {
        self.radius == 0.0
    }

    /// Flatten into the persistence record shape
    pub fn to_record(&self) -> CircleRecord {
        CircleRecord {
            radius: self.radius,
            class: self.class as i32,
            point_count: self.point_count as i32,
            center: self.center.dims().to_vec(),
        }
    }
}

/// Fixed-size persistence record for one circle
///
/// `{radius: f32, class: i32, point_count: i32, center: f32[dimensionality]}`,
/// written in circle insertion order.
#[derive(Clone, Debug, PartialEq)]
pub struct CircleRecord {
    pub radius: f32,
    pub class: i32,
    pub point_count: i32,
    pub center: Vec<f32>,
}

impl CircleRecord {
    /// Byte size of one record for a given dimensionality
    pub fn byte_len(dimensionality: usize) -> usize {
        4 + 4 + 4 + 4 * dimensionality
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metric::Euclidean;

    #[test]
    fn test_contains_is_boundary_inclusive() {
        let circle = Circle::new(Point::new(vec![0.0, 0.0]), 5.0, 0);

        assert!(circle.contains(&Euclidean, &[3.0, 4.0]));
        assert!(circle.contains(&Euclidean, &[1.0, 1.0]));
        assert!(!circle.contains(&Euclidean, &[3.0, 4.1]));
    }

    #[test]
    fn test_degenerate() {
        assert!(Circle::new(Point::origin(2), 0.0, 1).is_degenerate());
        assert!(!Circle::new(Point::origin(2), 0.5, 1).is_degenerate());
    }

    #[test]
    fn test_record_shape() {
        let mut circle = Circle::new(Point::new(vec![1.0, 2.0, 3.0]), 2.5, 4);
        circle.point_count = 9;

        let record = circle.to_record();
        assert_eq!(record.radius, 2.5);
        assert_eq!(record.class, 4);
        assert_eq!(record.point_count, 9);
        assert_eq!(record.center, vec![1.0, 2.0, 3.0]);
        assert_eq!(CircleRecord::byte_len(3), 24);
    }
}
