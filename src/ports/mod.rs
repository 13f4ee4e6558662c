//! # Ports
//!
//! Trait definitions for adapters. Contracts only, no implementations.
//!
//! This is the hexagonal architecture boundary:
//! - Ports define WHAT the outer world must provide (datasets in, circle
//!   sets in and out)
//! - Adapters define HOW (CSV files, binary circle files)
//!
//! The CORE doesn't know about adapters.
//! Adapters implement these port traits.

mod source;
mod store;

// Re-export traits
pub use source::PointSource;
pub use store::CircleStore;

// Re-export error types
pub use source::{SourceError, SourceResult};
pub use store::{StoreError, StoreResult};
