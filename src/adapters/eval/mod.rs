//! # Evaluation Harness
//!
//! Drives a trained circle set over labeled test data and reports how well
//! it does.
//!
//! - `evaluate` - one model, one test set, confusion matrix + accuracy
//! - `cross_validate` - stratified k-fold over one dataset
//! - `compare_voting_modes` / `compare_knn_strategies` - sweep classifier
//!   settings against the same model
//!
//! Test points are classified in parallel; the model is read-only while
//! that happens.

mod compare;
mod config;
mod folds;
mod report;

pub use compare::{compare_knn_strategies, compare_voting_modes, StrategyScore, DEFAULT_K_VALUES};
pub use config::EvalConfig;
pub use folds::{cross_validate, stratified_folds, CrossValidation, FoldResult};
pub use report::{evaluate, ConfusionMatrix, EvalReport};

use thiserror::Error;

use crate::core::{BuildError, ClassifyError, DatasetError};

/// Result type for evaluation runs
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors that can occur during evaluation
#[derive(Debug, Error)]
pub enum EvalError {
    /// Fold count must be at least 2 and at most the number of points
    #[error("Cannot split {points} points into {folds} folds")]
    InvalidFolds { folds: usize, points: usize },

    /// Building a fold's model failed
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// A query could not be classified
    #[error("Classification error: {0}")]
    Classify(#[from] ClassifyError),

    /// Splitting the dataset failed
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),
}
