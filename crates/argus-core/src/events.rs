use serde::{Deserialize, Serialize};

use crate::finding::AuditTaskResult;
use crate::plan::{AuditPlan, AuditTask};
use crate::report::ComplianceReport;

/// Progress events pushed during a run. The broadcast stream is the only
/// way a caller observes progress; there is no polling surface. Each
/// event carries the full record it concerns, so a subscriber never has
/// to join IDs back against the plan.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AuditEvent {
    PlanReady {
        plan: Box<AuditPlan>,
    },

    WaveStart {
        wave: u8,
        task_count: usize,
    },

    TaskStart {
        task: Box<AuditTask>,
    },

    TaskComplete {
        task: Box<AuditTask>,
        result: AuditTaskResult,
    },

    TaskError {
        task: Box<AuditTask>,
        error: String,
    },

    TaskSkipped {
        task: Box<AuditTask>,
        reason: String,
    },

    WaveComplete {
        wave: u8,
        results: Vec<AuditTaskResult>,
    },

    Complete {
        report: Box<ComplianceReport>,
    },
}

impl AuditEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::PlanReady { .. } => "plan-ready",
            Self::WaveStart { .. } => "wave-start",
            Self::TaskStart { .. } => "task-start",
            Self::TaskComplete { .. } => "task-complete",
            Self::TaskError { .. } => "task-error",
            Self::TaskSkipped { .. } => "task-skipped",
            Self::WaveComplete { .. } => "wave-complete",
            Self::Complete { .. } => "complete",
        }
    }

    pub fn plan_ready(plan: &AuditPlan) -> Self {
        Self::PlanReady {
            plan: Box::new(plan.clone()),
        }
    }
}

/// Recorded reason string for budget skips, shared by engine and events.
pub const SKIP_REASON_BUDGET: &str = "budget-exceeded";
