use serde::{Deserialize, Serialize};

use crate::ids::TaskId;
use crate::ruleset::RulesetMeta;

/// A grouping of files discovered during planning, either heuristic
/// (directory-based) or from an external manifest (explicit paths + tags).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditComponent {
    pub name: String,
    pub path: String,
    /// Relative paths of the files in this component.
    pub files: Vec<String>,
    pub languages: Vec<String>,
    pub estimated_tokens: u64,
    /// Manifest tags; empty in heuristic mode.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// What a task asks the backend (or, for synthesis, the engine) to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    ComponentScan,
    CrossCutting,
    Synthesis,
}

impl TaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ComponentScan => "component-scan",
            Self::CrossCutting => "cross-cutting",
            Self::Synthesis => "synthesis",
        }
    }
}

/// An immutable unit of planned work. Execution state is tracked by the
/// engine, never on the task itself.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditTask {
    pub id: TaskId,
    /// Execution phase: 1 and 2 hit the backend, 3 is in-process synthesis.
    pub wave: u8,
    pub kind: TaskKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// Rule ids for component scans, or the single pattern id for a
    /// cross-cutting task.
    pub rules: Vec<String>,
    pub files: Vec<String>,
    pub estimated_tokens: u64,
    /// Minimum severity rank among the task's rules; lower runs earlier.
    pub priority: u8,
    pub description: String,
}

/// Aggregate numbers for a plan, computed once at construction.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStats {
    pub component_count: usize,
    pub file_count: usize,
    pub wave1_tasks: usize,
    pub wave2_tasks: usize,
    pub wave3_tasks: usize,
    /// Sum over waves 1 and 2 only; wave 3 makes no backend call.
    pub estimated_tokens: u64,
}

/// The complete three-wave audit plan. Produced once, read-only.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditPlan {
    pub meta: RulesetMeta,
    pub components: Vec<AuditComponent>,
    pub wave1: Vec<AuditTask>,
    pub wave2: Vec<AuditTask>,
    pub wave3: Vec<AuditTask>,
    pub stats: PlanStats,
}

impl AuditPlan {
    /// Tasks of a given wave, in planned (priority) order.
    pub fn wave(&self, wave: u8) -> &[AuditTask] {
        match wave {
            1 => &self.wave1,
            2 => &self.wave2,
            3 => &self.wave3,
            _ => &[],
        }
    }

    pub fn task(&self, id: &TaskId) -> Option<&AuditTask> {
        self.wave1
            .iter()
            .chain(&self.wave2)
            .chain(&self.wave3)
            .find(|t| &t.id == id)
    }
}
