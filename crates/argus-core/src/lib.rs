pub mod backend;
pub mod errors;
pub mod events;
pub mod finding;
pub mod ids;
pub mod plan;
pub mod report;
pub mod ruleset;
pub mod severity;
pub mod source;
pub mod tokens;

pub use backend::{AuditBackend, BackendOptions, BackendRequest, BackendResponse};
pub use errors::BackendError;
pub use events::AuditEvent;
pub use severity::Severity;
