//! Analysis modules.
//!
//! Aggregation of a feedback snapshot into the dashboard's counts and
//! chart series.

pub mod aggregator;

pub use aggregator::*;
