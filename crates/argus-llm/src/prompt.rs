//! Request construction for one audit task.
//!
//! The system prompt embeds the full text of every rule (or pattern plus
//! its referenced rules) assigned to the task, the output shape, and the
//! explicit "empty findings are valid" instruction. The user prompt carries
//! the files verbatim, each line prefixed with its 1-based number.

use std::collections::HashMap;
use std::fmt::Write;

use argus_core::backend::{BackendOptions, BackendRequest};
use argus_core::plan::{AuditTask, TaskKind};
use argus_core::ruleset::{CrossCuttingPattern, Rule, Ruleset};
use argus_core::source::SourceFile;

use crate::schema;

#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    /// A wave-2 task references a pattern id the ruleset does not define,
    /// a plan-construction invariant violation, surfaced as a per-task
    /// failure rather than a crash.
    #[error("unknown cross-cutting pattern: {0}")]
    UnknownPattern(String),

    #[error("synthesis task takes no backend request")]
    SynthesisTask,
}

/// Build the complete backend request for a wave-1 or wave-2 task.
pub fn build_request(
    task: &AuditTask,
    ruleset: &Ruleset,
    files: &[SourceFile],
    mut options: BackendOptions,
) -> Result<BackendRequest, ContractError> {
    let system = system_prompt(task, ruleset)?;
    let user = user_prompt(task, files);
    options.json_schema = Some(schema::findings_schema());
    Ok(BackendRequest {
        system,
        user,
        options,
    })
}

fn system_prompt(task: &AuditTask, ruleset: &Ruleset) -> Result<String, ContractError> {
    let mut out = String::from(
        "You are a compliance auditor. Check the provided files against the \
         rules below and report every violation you can substantiate.\n\n",
    );

    match task.kind {
        TaskKind::ComponentScan => {
            for id in &task.rules {
                if let Some(rule) = ruleset.rule(id) {
                    write_rule(&mut out, rule);
                }
            }
        }
        TaskKind::CrossCutting => {
            let id = task.rules.first().map(String::as_str).unwrap_or_default();
            let pattern = ruleset
                .pattern(id)
                .ok_or_else(|| ContractError::UnknownPattern(id.to_string()))?;
            write_pattern(&mut out, pattern);
            for rule_id in &pattern.relates_to {
                if let Some(rule) = ruleset.rule(rule_id) {
                    write_rule(&mut out, rule);
                }
            }
        }
        TaskKind::Synthesis => return Err(ContractError::SynthesisTask),
    }

    out.push_str("\n## Output\n\n");
    out.push_str(schema::OUTPUT_DESCRIPTION);
    Ok(out)
}

fn write_rule(out: &mut String, rule: &Rule) {
    let _ = writeln!(out, "## Rule {}: {}", rule.id, rule.title);
    let _ = writeln!(out, "Severity: {}", rule.severity);
    if !rule.applies_to.is_empty() {
        let _ = writeln!(out, "Applies to: {}", rule.applies_to.join(", "));
    }
    if !rule.compliant.is_empty() {
        let _ = writeln!(out, "Compliant: {}", rule.compliant);
    }
    if !rule.violation.is_empty() {
        let _ = writeln!(out, "Violation: {}", rule.violation);
    }
    if !rule.what_to_look_for.is_empty() {
        let _ = writeln!(out, "What to look for:");
        for item in &rule.what_to_look_for {
            let _ = writeln!(out, "- {item}");
        }
    }
    if !rule.guidance.is_empty() {
        let _ = writeln!(out, "Guidance: {}", rule.guidance);
    }
    out.push('\n');
}

fn write_pattern(out: &mut String, pattern: &CrossCuttingPattern) {
    let _ = writeln!(out, "## Pattern {}: {}", pattern.id, pattern.title);
    if !pattern.scope.is_empty() {
        let _ = writeln!(out, "Scope: {}", pattern.scope);
    }
    if !pattern.objective.is_empty() {
        let _ = writeln!(out, "Objective: {}", pattern.objective);
    }
    if !pattern.checks.is_empty() {
        let _ = writeln!(out, "What to verify:");
        for check in &pattern.checks {
            let _ = writeln!(out, "- {check}");
        }
    }
    out.push('\n');
}

fn user_prompt(task: &AuditTask, files: &[SourceFile]) -> String {
    let by_path: HashMap<&str, &SourceFile> =
        files.iter().map(|f| (f.path.as_str(), f)).collect();

    let mut out = String::new();
    if let Some(component) = &task.component {
        let _ = writeln!(out, "Component: {component}\n");
    }

    for path in &task.files {
        let Some(file) = by_path.get(path.as_str()) else {
            continue;
        };
        let _ = writeln!(out, "### File: {path}");
        for (i, line) in file.content.lines().enumerate() {
            let _ = writeln!(out, "{:>4} | {line}", i + 1);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_core::ids::TaskId;
    use argus_core::ruleset::RulesetMeta;

    fn ruleset() -> Ruleset {
        Ruleset {
            meta: RulesetMeta::default(),
            rules: vec![Rule {
                id: "BAC-01".into(),
                title: "Broken access control".into(),
                category: "Access Control".into(),
                severity: "Critical".into(),
                applies_to: vec!["API routes".into()],
                compliant: "Handlers check roles".into(),
                violation: "Handlers trust client ids".into(),
                what_to_look_for: vec!["unchecked ids".into()],
                guidance: "Fail closed".into(),
            }],
            cross_cutting: vec![CrossCuttingPattern {
                id: "CROSS-01".into(),
                title: "Error consistency".into(),
                scope: "all".into(),
                relates_to: vec!["BAC-01".into()],
                objective: "Uniform errors".into(),
                checks: vec!["no stack traces".into()],
            }],
        }
    }

    fn scan_task() -> AuditTask {
        AuditTask {
            id: TaskId::new(),
            wave: 1,
            kind: TaskKind::ComponentScan,
            component: Some("api".into()),
            rules: vec!["BAC-01".into()],
            files: vec!["api/routes.ts".into()],
            estimated_tokens: 10,
            priority: 0,
            description: String::new(),
        }
    }

    fn files() -> Vec<SourceFile> {
        vec![SourceFile::new("api/routes.ts", "line one\nline two\n")]
    }

    #[test]
    fn system_prompt_embeds_full_rule_text() {
        let req = build_request(&scan_task(), &ruleset(), &files(), BackendOptions::default())
            .unwrap();
        assert!(req.system.contains("Rule BAC-01: Broken access control"));
        assert!(req.system.contains("Severity: Critical"));
        assert!(req.system.contains("- unchecked ids"));
        assert!(req.system.contains("Guidance: Fail closed"));
    }

    #[test]
    fn system_prompt_states_empty_findings_are_valid() {
        let req = build_request(&scan_task(), &ruleset(), &files(), BackendOptions::default())
            .unwrap();
        assert!(req.system.contains("empty findings list"));
    }

    #[test]
    fn request_carries_schema() {
        let req = build_request(&scan_task(), &ruleset(), &files(), BackendOptions::default())
            .unwrap();
        let schema = req.options.json_schema.unwrap();
        assert_eq!(schema["required"][0], "findings");
    }

    #[test]
    fn user_prompt_numbers_lines_from_one() {
        let req = build_request(&scan_task(), &ruleset(), &files(), BackendOptions::default())
            .unwrap();
        assert!(req.user.contains("Component: api"));
        assert!(req.user.contains("### File: api/routes.ts"));
        assert!(req.user.contains("   1 | line one"));
        assert!(req.user.contains("   2 | line two"));
    }

    #[test]
    fn cross_cutting_embeds_pattern_and_referenced_rules() {
        let task = AuditTask {
            id: TaskId::new(),
            wave: 2,
            kind: TaskKind::CrossCutting,
            component: None,
            rules: vec!["CROSS-01".into()],
            files: vec!["api/routes.ts".into()],
            estimated_tokens: 10,
            priority: 0,
            description: String::new(),
        };
        let req = build_request(&task, &ruleset(), &files(), BackendOptions::default()).unwrap();
        assert!(req.system.contains("Pattern CROSS-01: Error consistency"));
        assert!(req.system.contains("- no stack traces"));
        // relates_to pulls the referenced rule in too
        assert!(req.system.contains("Rule BAC-01"));
    }

    #[test]
    fn unknown_pattern_is_a_contract_error() {
        let task = AuditTask {
            id: TaskId::new(),
            wave: 2,
            kind: TaskKind::CrossCutting,
            component: None,
            rules: vec!["CROSS-99".into()],
            files: vec![],
            estimated_tokens: 0,
            priority: 0,
            description: String::new(),
        };
        let err = build_request(&task, &ruleset(), &[], BackendOptions::default()).unwrap_err();
        assert!(matches!(err, ContractError::UnknownPattern(id) if id == "CROSS-99"));
    }

    #[test]
    fn synthesis_task_refuses_request() {
        let task = AuditTask {
            id: TaskId::new(),
            wave: 3,
            kind: TaskKind::Synthesis,
            component: None,
            rules: vec![],
            files: vec![],
            estimated_tokens: 0,
            priority: 0,
            description: String::new(),
        };
        let err = build_request(&task, &ruleset(), &[], BackendOptions::default()).unwrap_err();
        assert!(matches!(err, ContractError::SynthesisTask));
    }

    #[test]
    fn missing_file_content_is_skipped_not_fatal() {
        let mut task = scan_task();
        task.files.push("api/ghost.ts".into());
        let req = build_request(&task, &ruleset(), &files(), BackendOptions::default()).unwrap();
        assert!(!req.user.contains("ghost"));
    }
}
