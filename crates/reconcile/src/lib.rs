//! Price timeline reconciliation.
//!
//! This crate handles:
//! - Relation classification between two periods
//! - Trimming/splitting an existing price against an incoming one
//! - Folding incoming price batches into existing timelines
//! - Per-key grouping, merge statistics and output auditing

pub mod audit;
pub mod difference;
pub mod engine;
pub mod grouping;
pub mod relation;
pub mod stats;

pub use audit::{find_overlaps, Overlap};
pub use difference::{difference, difference_classified};
pub use engine::{merge_all, merge_one, ReconcileEngine};
pub use grouping::KeyedTimelines;
pub use relation::{classify, intersects, Relation};
pub use stats::MergeStats;
