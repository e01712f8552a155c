//! Three-wave plan construction.
//!
//! Wave 1: one task per non-empty (component, rule category) group, sorted
//! by priority. Wave 2: one task per cross-cutting pattern, scoped to all
//! discovered files. Wave 3: the single in-process synthesis task.

use std::collections::BTreeMap;

use argus_core::ids::TaskId;
use argus_core::plan::{AuditPlan, AuditTask, PlanStats, TaskKind};
use argus_core::ruleset::Ruleset;
use argus_core::severity::Severity;
use argus_core::source::SourceFile;
use argus_core::tokens::estimate_tokens;
use tracing::info;

use crate::components::{discover_components, ComponentManifest};
use crate::matching::matching_files;

/// Build the full audit plan from a parsed ruleset and the target tree.
pub fn generate_plan(
    ruleset: &Ruleset,
    files: &[SourceFile],
    manifest: Option<&ComponentManifest>,
) -> AuditPlan {
    let components = discover_components(files, manifest);
    let tokens_by_path: BTreeMap<&str, u64> = files
        .iter()
        .map(|f| (f.path.as_str(), f.estimated_tokens()))
        .collect();

    // Wave 1: (component, category) groups.
    let mut wave1 = Vec::new();
    for component in &components {
        // category → (rule ids, matched file paths)
        let mut groups: BTreeMap<&str, (Vec<&str>, Vec<&str>)> = BTreeMap::new();
        for rule in &ruleset.rules {
            let matched = matching_files(rule, component);
            if matched.is_empty() {
                continue;
            }
            let entry = groups.entry(rule.category.as_str()).or_default();
            entry.0.push(rule.id.as_str());
            for path in matched {
                if !entry.1.contains(&path) {
                    entry.1.push(path);
                }
            }
        }

        for (category, (rule_ids, paths)) in groups {
            let priority = rule_ids
                .iter()
                .filter_map(|id| ruleset.rule(id))
                .map(|r| Severity::normalize(&r.severity).rank())
                .min()
                .unwrap_or(Severity::Medium.rank());

            wave1.push(AuditTask {
                id: TaskId::new(),
                wave: 1,
                kind: TaskKind::ComponentScan,
                component: Some(component.name.clone()),
                rules: rule_ids.iter().map(|s| s.to_string()).collect(),
                files: paths.iter().map(|s| s.to_string()).collect(),
                estimated_tokens: paths
                    .iter()
                    .map(|p| tokens_by_path.get(p).copied().unwrap_or(0))
                    .sum(),
                priority,
                description: format!("Check {category} rules in {}", component.name),
            });
        }
    }
    wave1.sort_by_key(|t| t.priority);

    // Wave 2: one task per cross-cutting pattern, over all discovered files.
    let all_paths: Vec<String> = files.iter().map(|f| f.path.clone()).collect();
    let all_tokens: u64 = files.iter().map(|f| f.estimated_tokens()).sum();
    let wave2: Vec<AuditTask> = ruleset
        .cross_cutting
        .iter()
        .map(|pattern| AuditTask {
            id: TaskId::new(),
            wave: 2,
            kind: TaskKind::CrossCutting,
            component: None,
            rules: vec![pattern.id.clone()],
            files: all_paths.clone(),
            estimated_tokens: all_tokens,
            priority: 0,
            description: format!("Cross-cutting check: {}", pattern.title),
        })
        .collect();

    // Wave 3: the synthesis task. Zero token estimate signals the engine
    // that no backend call is needed.
    let wave3 = vec![AuditTask {
        id: TaskId::new(),
        wave: 3,
        kind: TaskKind::Synthesis,
        component: None,
        rules: Vec::new(),
        files: Vec::new(),
        estimated_tokens: 0,
        priority: 0,
        description: "Synthesize findings into the final report".into(),
    }];

    let stats = PlanStats {
        component_count: components.len(),
        file_count: files.len(),
        wave1_tasks: wave1.len(),
        wave2_tasks: wave2.len(),
        wave3_tasks: wave3.len(),
        estimated_tokens: wave1.iter().chain(&wave2).map(|t| t.estimated_tokens).sum(),
    };

    info!(
        wave1 = stats.wave1_tasks,
        wave2 = stats.wave2_tasks,
        estimated_tokens = stats.estimated_tokens,
        "plan generated"
    );

    AuditPlan {
        meta: ruleset.meta.clone(),
        components,
        wave1,
        wave2,
        wave3,
        stats,
    }
}
