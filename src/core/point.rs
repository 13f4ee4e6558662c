//! # Point
//!
//! A position in feature space. The fundamental primitive.
//!
//! Dimensionality is fixed per dataset, not per crate: whatever the loader
//! reads from the header is what every point and circle of that session uses.
//!
//! Storage is reference counted, so a circle can point at the location of
//! the training point that generated it without copying the vector.

use std::sync::Arc;

/// A point in feature space
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    dims: Arc<[f32]>,
}

impl Point {
    /// Create a new point from a vector of dimensions
    ///
    /// # Example
    /// ```
    /// use hypercircles::Point;
    /// let p = Point::new(vec![1.0, 2.0, 3.0]);
    /// assert_eq!(p.dimensionality(), 3);
    /// ```
    pub fn new(dims: Vec<f32>) -> Self {
        Self { dims: dims.into() }
    }

    /// Create an origin point (all zeros) of given dimensionality
    pub fn origin(dims: usize) -> Self {
        Self::new(vec![0.0; dims])
    }

    /// Get the dimensionality of this point
    pub fn dimensionality(&self) -> usize {
        self.dims.len()
    }

    /// Access the dimensions as a slice
    pub fn dims(&self) -> &[f32] {
        &self.dims
    }

    /// True if both points share the same storage (same origin, not just
    /// the same coordinates)
    pub fn same_origin(&self, other: &Point) -> bool {
        Arc::ptr_eq(&self.dims, &other.dims)
    }
}

impl From<Vec<f32>> for Point {
    fn from(dims: Vec<f32>) -> Self {
        Self::new(dims)
    }
}
