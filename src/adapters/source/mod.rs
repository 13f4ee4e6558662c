//! # Source Adapters
//!
//! Implementations of the `PointSource` port.
//!
//! Available adapters:
//! - `CsvSource` - header row, numeric attribute columns, label last

mod csv;

pub use csv::{parse_csv, CsvSource};
