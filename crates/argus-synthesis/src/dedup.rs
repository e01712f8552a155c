use argus_core::finding::{AuditFinding, AuditTaskResult, CorroboratedFinding};
use argus_core::ids::TaskId;
use argus_core::report::SeveritySummary;
use tracing::debug;

use crate::fingerprint::fingerprint;

struct Group {
    members: Vec<(TaskId, AuditFinding)>,
}

/// Deduplicate findings across all task results.
///
/// A finding joins the first existing group containing any member it
/// overlaps with, otherwise it starts a new group. Grouping is greedy, not
/// transitive: a chain a~b, b~c pulls c into a's group even when a and c
/// don't overlap directly.
///
/// Each group collapses to one corroborated finding. The canonical
/// representative has the lowest severity rank, ties broken by highest
/// confidence. Corroborations count distinct source tasks.
pub fn dedup_findings(results: &[AuditTaskResult]) -> Vec<CorroboratedFinding> {
    let mut groups: Vec<Group> = Vec::new();

    for result in results {
        for finding in &result.findings {
            let slot = groups.iter_mut().find(|g| {
                g.members.iter().any(|(_, member)| member.same_issue(finding))
            });
            match slot {
                Some(group) => group.members.push((result.task_id.clone(), finding.clone())),
                None => groups.push(Group {
                    members: vec![(result.task_id.clone(), finding.clone())],
                }),
            }
        }
    }

    let raw: usize = results.iter().map(|r| r.findings.len()).sum();
    debug!(raw_findings = raw, groups = groups.len(), "deduplicated findings");

    let mut collapsed: Vec<CorroboratedFinding> = groups.into_iter().map(collapse).collect();
    collapsed.sort_by(|a, b| {
        a.finding
            .severity
            .rank()
            .cmp(&b.finding.severity.rank())
            .then(b.effective_confidence.total_cmp(&a.effective_confidence))
    });
    collapsed
}

fn collapse(group: Group) -> CorroboratedFinding {
    let canonical = group
        .members
        .iter()
        .map(|(_, f)| f)
        .min_by(|a, b| {
            a.severity
                .rank()
                .cmp(&b.severity.rank())
                .then(b.confidence.total_cmp(&a.confidence))
        })
        .cloned()
        .unwrap_or_else(|| group.members[0].1.clone());

    let mut source_task_ids: Vec<TaskId> = Vec::new();
    for (task_id, _) in &group.members {
        if !source_task_ids.contains(task_id) {
            source_task_ids.push(task_id.clone());
        }
    }
    let corroborations = source_task_ids.len() as u32;
    let effective_confidence =
        (canonical.confidence + 0.1 * f64::from(corroborations.saturating_sub(1))).min(1.0);
    let fingerprint = fingerprint(&canonical);

    CorroboratedFinding {
        finding: canonical,
        corroborations,
        source_task_ids,
        effective_confidence,
        fingerprint,
        suppressed: false,
        suppression_reason: None,
    }
}

/// Tally reported findings by severity; suppressed findings count only in
/// `suppressed_count`.
pub fn summarize(findings: &[CorroboratedFinding]) -> SeveritySummary {
    let mut summary = SeveritySummary::default();
    for f in findings {
        if f.suppressed {
            summary.suppressed_count += 1;
        } else {
            summary.count(f.finding.severity);
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_core::finding::Location;
    use argus_core::plan::TaskKind;
    use argus_core::severity::Severity;
    use argus_core::tokens::TokenUsage;

    fn finding(rule: &str, file: &str, start: u32, end: u32, severity: Severity, confidence: f64) -> AuditFinding {
        AuditFinding {
            rule_id: rule.into(),
            severity,
            title: format!("{rule} issue"),
            description: "d".into(),
            locations: vec![Location::span(file, start, end)],
            evidence: String::new(),
            remediation: String::new(),
            confidence,
        }
    }

    fn result(task: &str, findings: Vec<AuditFinding>) -> AuditTaskResult {
        AuditTaskResult {
            task_id: TaskId::from_raw(format!("task_{task}")),
            kind: TaskKind::ComponentScan,
            component: Some("api".into()),
            rules_checked: vec![],
            findings,
            duration_ms: 10,
            model: "mock".into(),
            tokens_used: TokenUsage::default(),
        }
    }

    // --- grouping ---

    #[test]
    fn merges_same_rule_overlapping_locations() {
        let results = vec![
            result("a", vec![finding("R1", "a.rs", 10, 20, Severity::High, 0.8)]),
            result("b", vec![finding("R1", "a.rs", 15, 15, Severity::High, 0.6)]),
        ];
        let out = dedup_findings(&results);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].corroborations, 2);
        assert_eq!(out[0].source_task_ids.len(), 2);
    }

    #[test]
    fn keeps_distinct_rules_apart() {
        let results = vec![result(
            "a",
            vec![
                finding("R1", "a.rs", 10, 10, Severity::High, 0.8),
                finding("R2", "a.rs", 10, 10, Severity::High, 0.8),
            ],
        )];
        assert_eq!(dedup_findings(&results).len(), 2);
    }

    #[test]
    fn greedy_chain_joins_through_intermediate() {
        // a overlaps b, b overlaps c, a does not overlap c. All three join
        // one group through the shared middle member.
        let results = vec![
            result("a", vec![finding("R1", "a.rs", 1, 5, Severity::High, 0.5)]),
            result("b", vec![finding("R1", "a.rs", 5, 10, Severity::High, 0.5)]),
            result("c", vec![finding("R1", "a.rs", 9, 12, Severity::High, 0.5)]),
        ];
        let out = dedup_findings(&results);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].corroborations, 3);
    }

    // --- canonical selection ---

    #[test]
    fn canonical_prefers_most_severe_then_most_confident() {
        let results = vec![
            result("a", vec![finding("R1", "a.rs", 1, 10, Severity::Medium, 0.9)]),
            result("b", vec![finding("R1", "a.rs", 5, 5, Severity::Critical, 0.4)]),
            result("c", vec![finding("R1", "a.rs", 6, 8, Severity::Critical, 0.7)]),
        ];
        let out = dedup_findings(&results);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].finding.severity, Severity::Critical);
        assert!((out[0].finding.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn effective_confidence_bumps_and_caps() {
        let results = vec![
            result("a", vec![finding("R1", "a.rs", 1, 1, Severity::High, 0.95)]),
            result("b", vec![finding("R1", "a.rs", 1, 1, Severity::High, 0.2)]),
            result("c", vec![finding("R1", "a.rs", 1, 1, Severity::High, 0.2)]),
        ];
        let out = dedup_findings(&results);
        // 0.95 + 0.1 * 2 caps at 1.0.
        assert!((out[0].effective_confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn corroborations_count_distinct_tasks_not_findings() {
        // The same task reporting twice is one corroboration.
        let results = vec![result(
            "a",
            vec![
                finding("R1", "a.rs", 1, 5, Severity::High, 0.5),
                finding("R1", "a.rs", 3, 3, Severity::High, 0.5),
            ],
        )];
        let out = dedup_findings(&results);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].corroborations, 1);
        assert!((out[0].effective_confidence - 0.5).abs() < 1e-9);
    }

    // --- ordering ---

    #[test]
    fn sorted_by_severity_then_effective_confidence() {
        let results = vec![result(
            "a",
            vec![
                finding("R3", "c.rs", 1, 1, Severity::Low, 0.9),
                finding("R1", "a.rs", 1, 1, Severity::Critical, 0.5),
                finding("R2", "b.rs", 1, 1, Severity::Critical, 0.8),
            ],
        )];
        let out = dedup_findings(&results);
        let rules: Vec<&str> = out.iter().map(|f| f.finding.rule_id.as_str()).collect();
        assert_eq!(rules, vec!["R2", "R1", "R3"]);
    }

    #[test]
    fn dedup_is_idempotent() {
        let results = vec![
            result("a", vec![finding("R1", "a.rs", 10, 20, Severity::High, 0.8)]),
            result("b", vec![finding("R1", "a.rs", 15, 15, Severity::High, 0.6)]),
            result("c", vec![finding("R2", "b.rs", 1, 1, Severity::Low, 0.4)]),
        ];
        let once = dedup_findings(&results);
        let replay = vec![result(
            "replay",
            once.iter().map(|c| c.finding.clone()).collect(),
        )];
        let twice = dedup_findings(&replay);
        assert_eq!(twice.len(), once.len());
        assert!(twice.iter().all(|f| f.corroborations == 1));
        for (a, b) in once.iter().zip(&twice) {
            assert_eq!(a.fingerprint, b.fingerprint);
        }
    }

    // --- summarize ---

    #[test]
    fn summary_excludes_suppressed_from_severity_counts() {
        let results = vec![result(
            "a",
            vec![
                finding("R1", "a.rs", 1, 1, Severity::Critical, 0.9),
                finding("R2", "b.rs", 1, 1, Severity::Low, 0.5),
            ],
        )];
        let mut out = dedup_findings(&results);
        out[1].suppressed = true;
        let summary = summarize(&out);
        assert_eq!(summary.critical, 1);
        assert_eq!(summary.low, 0);
        assert_eq!(summary.total, 1);
        assert_eq!(summary.suppressed_count, 1);
    }
}
