//! SQLite persistence for finished compliance reports, so a later run can
//! diff against a stored baseline.

pub mod database;
pub mod error;
pub mod reports;

pub use database::{Database, SCHEMA_VERSION};
pub use error::StoreError;
pub use reports::{ReportRepo, ReportRow};
