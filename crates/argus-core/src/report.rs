use serde::{Deserialize, Serialize};

use crate::finding::CorroboratedFinding;
use crate::ids::{ReportId, RunId};
use crate::severity::Severity;
use crate::tokens::AccumulatedTokens;

/// Why a (task, rule) pair was not checked. Exclusive and exhaustive over
/// "not checked".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverageReason {
    #[serde(rename = "agent failed")]
    AgentFailed,
    #[serde(rename = "budget exceeded")]
    BudgetExceeded,
    #[serde(rename = "task not executed")]
    TaskNotExecuted,
}

/// One coverage record per (wave-1 task, rule-in-task) pair. Not
/// deduplicated per (component, rule): two tasks referencing the same rule
/// for the same component produce two entries.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageEntry {
    pub component: String,
    pub rule_id: String,
    pub checked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<CoverageReason>,
}

/// Severity tallies over the reported (non-suppressed) findings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeveritySummary {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
    pub informational: u32,
    pub total: u32,
    pub suppressed_count: u32,
}

impl SeveritySummary {
    pub fn count(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
            Severity::Informational => self.informational += 1,
        }
        self.total += 1;
    }
}

/// What was audited, and with which catalog.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportScope {
    pub framework: String,
    pub target: String,
    pub file_count: usize,
    pub component_count: usize,
}

/// Bookkeeping attached to each report.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub run_id: RunId,
    pub generated_at: String,
    pub tasks_planned: usize,
    pub tasks_completed: usize,
    pub tasks_failed: usize,
    pub tasks_skipped: usize,
    pub tokens: AccumulatedTokens,
}

/// Terminal, immutable artifact of one audit run. May become the baseline
/// of a later drift comparison.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub id: ReportId,
    pub scope: ReportScope,
    /// Every corroborated finding of the run, suppressed ones included
    /// with `suppressed` set. Keeping them lets a renderer show what was
    /// silenced and why; `summary` counts only the unsuppressed ones, so
    /// consumers filter on the flag.
    pub findings: Vec<CorroboratedFinding>,
    pub summary: SeveritySummary,
    pub coverage: Vec<CoverageEntry>,
    pub metadata: ReportMetadata,
}

/// Direction of change between two reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftTrend {
    Improving,
    Regressing,
    Stable,
}

/// A matched finding pair whose severity or effective confidence changed.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedFinding {
    pub baseline: CorroboratedFinding,
    pub current: CorroboratedFinding,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity_change: Option<(Severity, Severity)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_change: Option<(f64, f64)>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftSummary {
    pub new_count: usize,
    pub resolved_count: usize,
    pub changed_count: usize,
    pub trend: DriftTrend,
}

/// Delta between two compliance reports. Derived only, never persisted.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftReport {
    pub baseline_id: ReportId,
    pub current_id: ReportId,
    pub new: Vec<CorroboratedFinding>,
    pub resolved: Vec<CorroboratedFinding>,
    pub changed: Vec<ChangedFinding>,
    pub summary: DriftSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_by_severity() {
        let mut s = SeveritySummary::default();
        s.count(Severity::Critical);
        s.count(Severity::Critical);
        s.count(Severity::Low);
        assert_eq!(s.critical, 2);
        assert_eq!(s.low, 1);
        assert_eq!(s.total, 3);
        assert_eq!(s.suppressed_count, 0);
    }

    #[test]
    fn coverage_reason_wire_strings() {
        let json = serde_json::to_string(&CoverageReason::AgentFailed).unwrap();
        assert_eq!(json, "\"agent failed\"");
        let json = serde_json::to_string(&CoverageReason::BudgetExceeded).unwrap();
        assert_eq!(json, "\"budget exceeded\"");
        let json = serde_json::to_string(&CoverageReason::TaskNotExecuted).unwrap();
        assert_eq!(json, "\"task not executed\"");
    }

    #[test]
    fn drift_trend_serde() {
        assert_eq!(serde_json::to_string(&DriftTrend::Stable).unwrap(), "\"stable\"");
        assert_eq!(
            serde_json::to_string(&DriftTrend::Improving).unwrap(),
            "\"improving\""
        );
    }
}
