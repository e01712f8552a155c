//! Pure post-processing of accumulated task results: cross-task
//! deduplication and corroboration, suppression, coverage accounting,
//! severity summaries, and drift comparison between two reports.
//!
//! Nothing here performs I/O except [`SuppressionConfig::load`], which
//! reads the optional config file once; everything downstream operates on
//! values the caller already holds.

pub mod coverage;
pub mod dedup;
pub mod drift;
pub mod fingerprint;
pub mod suppress;

pub use coverage::{compute_coverage, TaskOutcomes};
pub use dedup::{dedup_findings, summarize};
pub use drift::compare_reports;
pub use suppress::{apply_suppressions, SuppressionConfig, SuppressionIndex, SuppressionRule};
