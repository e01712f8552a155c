use serde::{Deserialize, Serialize};

/// Finding/rule severity, ordered from most to least severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Informational,
}

impl Severity {
    /// Numeric rank: Critical = 0 … Informational = 4. Lower runs earlier
    /// and sorts first in reports.
    pub fn rank(self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
            Self::Informational => 4,
        }
    }

    /// Normalize a severity string from an untrusted source (a model reply
    /// or a raw ruleset field). Synonyms are mapped, anything unrecognized
    /// falls back to Medium. The ruleset parser stores strings verbatim;
    /// this is the single downstream normalization point.
    pub fn normalize(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "critical" => Self::Critical,
            "high" => Self::High,
            "medium" | "warning" | "moderate" => Self::Medium,
            "low" => Self::Low,
            "informational" | "info" => Self::Informational,
            _ => Self::Medium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Informational => "informational",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
