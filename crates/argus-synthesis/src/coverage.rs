use std::collections::HashSet;

use argus_core::ids::TaskId;
use argus_core::plan::AuditTask;
use argus_core::report::{CoverageEntry, CoverageReason};

/// Terminal states of executed tasks, as recorded by the engine. A task id
/// in none of the sets was never reached.
#[derive(Debug, Default)]
pub struct TaskOutcomes {
    pub completed: HashSet<TaskId>,
    pub failed: HashSet<TaskId>,
    pub skipped: HashSet<TaskId>,
}

impl TaskOutcomes {
    fn reason_for(&self, id: &TaskId) -> Option<CoverageReason> {
        if self.completed.contains(id) {
            None
        } else if self.failed.contains(id) {
            Some(CoverageReason::AgentFailed)
        } else if self.skipped.contains(id) {
            Some(CoverageReason::BudgetExceeded)
        } else {
            Some(CoverageReason::TaskNotExecuted)
        }
    }
}

/// One entry per (wave-1 task, rule-in-task) pair, in plan order. Entries
/// are deliberately not deduplicated per (component, rule): two tasks
/// referencing the same rule for the same component yield two entries.
pub fn compute_coverage(wave1: &[AuditTask], outcomes: &TaskOutcomes) -> Vec<CoverageEntry> {
    let mut entries = Vec::new();
    for task in wave1 {
        let reason = outcomes.reason_for(&task.id);
        let component = task.component.clone().unwrap_or_default();
        for rule_id in &task.rules {
            entries.push(CoverageEntry {
                component: component.clone(),
                rule_id: rule_id.clone(),
                checked: reason.is_none(),
                reason,
            });
        }
    }
    entries
}
