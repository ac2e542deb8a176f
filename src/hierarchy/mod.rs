//! Reporting-hierarchy traversal.

pub mod walker;

pub use walker::{HierarchyWalker, WalkError, WalkOptions, MAX_PAGE_SIZE};
