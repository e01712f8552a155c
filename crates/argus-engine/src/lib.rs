//! Wave-ordered, concurrency-bounded execution of an audit plan against an
//! injected backend, with budget admission control and partial-failure
//! tolerance. Progress is pushed over a broadcast stream; there is no
//! polling surface.

pub mod budget;
pub mod error;
pub mod executor;
pub mod telemetry;

pub use error::EngineError;
pub use executor::{AuditExecutor, ExecutorConfig, DEFAULT_CONCURRENCY};
