//! Adapters - Swappable implementations of port interfaces, plus the
//! evaluation harness that drives the core over train/test splits.

pub mod source;
pub mod store;
pub mod eval;
