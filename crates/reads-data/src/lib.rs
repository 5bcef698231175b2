//! Data layer for My Reads.
//!
//! Responsible for locating and loading reading-history exports, normalising
//! raw records into books, computing the reading statistics and running the
//! top-level dashboard pipeline.

pub mod aggregator;
pub mod analysis;
pub mod reader;

pub use reads_core as core;
