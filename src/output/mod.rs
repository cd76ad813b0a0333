//! Output module for reporting resolution results
//!
//! This module handles:
//! - Recording resolution statistics from the database
//! - Printing them for the `--stats` mode

pub mod stats;

pub use stats::{load_statistics, print_statistics, ResolutionStatistics};
