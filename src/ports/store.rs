//! # Store Port
//!
//! Trait for persisting trained circle sets.
//!
//! A save followed by a load must classify exactly like the original set.

use std::io;

use thiserror::Error;

use crate::core::{BuildError, CircleSet};

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while saving or loading circle sets
#[derive(Debug, Error)]
pub enum StoreError {
    /// Not a circle file
    #[error("Invalid circle file magic bytes")]
    InvalidMagic,

    /// Written by a newer format
    #[error("Unsupported circle file version: {0}")]
    UnsupportedVersion(u32),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Structurally invalid content
    #[error("Data corruption: {0}")]
    Corrupted(String),

    /// Content decoded but does not form a valid circle set
    #[error("Invalid circle set: {0}")]
    Model(#[from] BuildError),
}

/// Trait for saving and loading circle sets
pub trait CircleStore {
    /// Persist a circle set
    fn save(&self, model: &CircleSet) -> StoreResult<()>;

    /// Load a previously saved circle set
    fn load(&self) -> StoreResult<CircleSet>;
}
