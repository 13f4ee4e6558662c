//! # Dataset
//!
//! Owner of a session's labeled points and its label space.
//!
//! Every point shares one dimensionality, checked on insertion. Class names
//! are interned to dense ids in order of first appearance, so ids stay
//! stable for the session.

use std::collections::HashMap;

use super::error::{DatasetError, DatasetResult};
use super::{ClassId, LabeledPoint, Point};

/// Labeled points plus their class-name table
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    dimensionality: usize,
    points: Vec<LabeledPoint>,
    class_names: Vec<String>,
    class_ids: HashMap<String, ClassId>,
}

impl Dataset {
    /// Create an empty dataset with the given attribute count
    pub fn new(dimensionality: usize) -> DatasetResult<Self> {
        if dimensionality == 0 {
            return Err(DatasetError::NoAttributes);
        }
        Ok(Self {
            dimensionality,
            ..Self::default()
        })
    }

    /// Create an empty dataset sharing another dataset's label space
    ///
    /// Used for test files and folds: ids must mean the same classes as the
    /// training data.
    pub fn with_classes_of(other: &Dataset) -> Self {
        Self {
            dimensionality: other.dimensionality,
            points: Vec::new(),
            class_names: other.class_names.clone(),
            class_ids: other.class_ids.clone(),
        }
    }

    /// Get the id for a class label, assigning the next id if unseen
    pub fn intern_class(&mut self, label: &str) -> ClassId {
        if let Some(&id) = self.class_ids.get(label) {
            return id;
        }
        let id = self.class_names.len();
        self.class_names.push(label.to_string());
        self.class_ids.insert(label.to_string(), id);
        id
    }

    /// Look up a class id without interning
    pub fn class_id(&self, label: &str) -> Option<ClassId> {
        self.class_ids.get(label).copied()
    }

    /// Add a point with a class id
    pub fn push(&mut self, point: Point, class: ClassId) -> DatasetResult<()> {
        if point.dimensionality() != self.dimensionality {
            return Err(DatasetError::DimensionMismatch {
                expected: self.dimensionality,
                got: point.dimensionality(),
            });
        }
        self.points.push(LabeledPoint::new(point, class));
        Ok(())
    }

    /// Add a point with a class label, interning the label
    pub fn push_labeled(&mut self, point: Point, label: &str) -> DatasetResult<ClassId> {
        if point.dimensionality() != self.dimensionality {
            return Err(DatasetError::DimensionMismatch {
                expected: self.dimensionality,
                got: point.dimensionality(),
            });
        }
        let class = self.intern_class(label);
        self.points.push(LabeledPoint::new(point, class));
        Ok(class)
    }

    /// Build a dataset with this label space over a subset of points
    pub fn subset(&self, points: Vec<LabeledPoint>) -> DatasetResult<Self> {
        let mut subset = Self::with_classes_of(self);
        for p in points {
            subset.push(p.point, p.class)?;
        }
        Ok(subset)
    }

    pub fn dimensionality(&self) -> usize {
        self.dimensionality
    }

    pub fn points(&self) -> &[LabeledPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of classes in the label space
    ///
    /// Covers ids pushed without a name as well.
    pub fn num_classes(&self) -> usize {
        let max_seen = self.points.iter().map(|p| p.class + 1).max().unwrap_or(0);
        self.class_names.len().max(max_seen)
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn class_name(&self, class: ClassId) -> Option<&str> {
        self.class_names.get(class).map(String::as_str)
    }
}
