//! # Store Adapters
//!
//! Implementations of the `CircleStore` port.
//!
//! - `persistence` - the binary circle file format
//! - `FileStore` - reads and writes that format on disk

pub mod persistence;
mod file;

pub use file::FileStore;
pub use persistence::SerializedCircles;
