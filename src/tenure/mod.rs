//! Tenure statistics.
//!
//! Hire-date parsing, working-day arithmetic, and aggregation across a
//! walked hierarchy.

pub mod aggregator;
pub mod hire_date;
pub mod workdays;

pub use aggregator::aggregate;
