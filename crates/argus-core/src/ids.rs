use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefixed string IDs. The uuid-v7 tail keeps freshly minted IDs
/// time-sortable; the prefix makes a stray ID in a log line or a store row
/// self-describing.
macro_rules! audit_id {
    ($(#[$meta:meta])* $name:ident => $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(format!("{}_{}", Self::PREFIX, Uuid::now_v7()))
            }

            /// Wraps an existing string without minting a fresh uuid.
            /// Used when reading IDs back from the store and in tests that
            /// need deterministic IDs.
            pub fn from_raw(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

audit_id!(
    /// One unit of audit work in a plan wave.
    TaskId => "task"
);
audit_id!(
    /// One end-to-end execution of a plan.
    RunId => "run"
);
audit_id!(
    /// One persisted compliance report.
    ReportId => "rpt"
);
