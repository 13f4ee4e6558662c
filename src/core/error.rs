//! # Errors
//!
//! Error types for the core. Degenerate circles and "no decision" are not
//! errors: the first are filtered during construction, the second is a
//! `Prediction` variant.

use thiserror::Error;

use super::ClassId;

/// Result type for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Result type for model construction
pub type BuildResult<T> = Result<T, BuildError>;

/// Result type for classification
pub type ClassifyResult<T> = Result<T, ClassifyError>;

/// Errors raised while assembling a dataset
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DatasetError {
    #[error("Dimensionality mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Dataset must have at least one attribute")]
    NoAttributes,
}

/// Errors raised while building a circle set
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("Point {index} has dimensionality {got}, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        got: usize,
    },

    #[error("Point {index} has class {class}, but only {num_classes} classes are declared")]
    ClassOutOfRange {
        index: usize,
        class: ClassId,
        num_classes: usize,
    },

    #[error("Cannot build circles from an empty dataset")]
    EmptyDataset,
}

/// Errors raised by the classification engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifyError {
    /// Query or training point does not match the model's dimensionality
    #[error("Dimensionality mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Unknown mode, sub-mode or strategy name
    #[error("Invalid classification configuration: {0}")]
    InvalidConfiguration(String),
}
