//! # Source Port
//!
//! Trait for loading labeled points.
//!
//! Implemented by dataset adapters (CSV, in-memory fixtures, ...).

use std::io;

use thiserror::Error;

use crate::core::{Dataset, DatasetError};

/// Result type for source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors that can occur while loading points
#[derive(Debug, Error)]
pub enum SourceError {
    /// Underlying read failed
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The input has no header row
    #[error("Missing header row")]
    MissingHeader,

    /// The header names fewer than two columns (attributes + label)
    #[error("Need at least one attribute column and a label column, found {0} columns")]
    TooFewColumns(usize),

    /// The header disagrees with the label space being extended
    #[error("Expected {expected} attributes, header has {got}")]
    AttributeCount { expected: usize, got: usize },

    /// A row was rejected by the dataset
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),
}

/// Trait for loading labeled points
pub trait PointSource {
    /// Load a dataset with a fresh label space
    fn load(&self) -> SourceResult<Dataset>;

    /// Load a dataset that extends `labels`' label space
    ///
    /// Use for test data so class ids mean the same classes as training.
    fn load_with_labels(&self, labels: &Dataset) -> SourceResult<Dataset>;
}
