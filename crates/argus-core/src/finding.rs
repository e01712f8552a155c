use serde::{Deserialize, Serialize};

use crate::ids::TaskId;
use crate::plan::TaskKind;
use crate::severity::Severity;
use crate::tokens::TokenUsage;

/// Sentinel rule id for a reply no object could be extracted from.
pub const PARSE_ERROR_RULE_ID: &str = "PARSE-ERROR";

/// A file location, inclusive line range. `end_line = None` means a single
/// line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub file: String,
    pub start_line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
}

impl Location {
    pub fn line(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            start_line: line,
            end_line: None,
        }
    }

    pub fn span(file: impl Into<String>, start: u32, end: u32) -> Self {
        Self {
            file: file.into(),
            start_line: start,
            end_line: Some(end),
        }
    }

    /// Inclusive end of the range.
    pub fn end(&self) -> u32 {
        self.end_line.unwrap_or(self.start_line)
    }

    /// True when both locations are in the same file and their inclusive
    /// line ranges overlap. Symmetric.
    pub fn overlaps(&self, other: &Location) -> bool {
        self.file == other.file && self.start_line <= other.end() && other.start_line <= self.end()
    }
}

/// One normalized issue reported by a task. Owned by its task result until
/// synthesis merges it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFinding {
    pub rule_id: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub locations: Vec<Location>,
    pub evidence: String,
    pub remediation: String,
    /// Clamped to [0, 1] at parse time.
    pub confidence: f64,
}

impl AuditFinding {
    /// True when the two findings look like the same issue: same rule and
    /// at least one overlapping location pair.
    pub fn same_issue(&self, other: &AuditFinding) -> bool {
        self.rule_id == other.rule_id
            && self
                .locations
                .iter()
                .any(|a| other.locations.iter().any(|b| a.overlaps(b)))
    }
}

/// The outcome of one completed task. Accumulated in completion order;
/// downstream keying is by task id and finding content, never position.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditTaskResult {
    pub task_id: TaskId,
    pub kind: TaskKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    pub rules_checked: Vec<String>,
    pub findings: Vec<AuditFinding>,
    pub duration_ms: u64,
    pub model: String,
    pub tokens_used: TokenUsage,
}

/// A deduplicated finding, possibly confirmed by several tasks. Created
/// only during synthesis.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorroboratedFinding {
    /// Canonical representative: lowest severity rank, then highest
    /// confidence.
    pub finding: AuditFinding,
    /// Distinct source tasks that reported this issue, always ≥ 1.
    pub corroborations: u32,
    pub source_task_ids: Vec<TaskId>,
    /// min(1, canonical confidence + 0.1 × (corroborations − 1)).
    pub effective_confidence: f64,
    /// Stable sha256 identity over rule id + canonical location.
    pub fingerprint: String,
    #[serde(default)]
    pub suppressed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppression_reason: Option<String>,
}
