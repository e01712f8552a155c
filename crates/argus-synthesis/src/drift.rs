use argus_core::finding::CorroboratedFinding;
use argus_core::report::{
    ChangedFinding, ComplianceReport, DriftReport, DriftSummary, DriftTrend,
};
use tracing::debug;

/// Diff two reports using the same overlap test as deduplication.
///
/// Matching is greedy in list order and each baseline finding is consumed
/// at most once. Matched pairs whose severity or effective confidence
/// moved are recorded as changed, with old/new per field.
pub fn compare_reports(baseline: &ComplianceReport, current: &ComplianceReport) -> DriftReport {
    let mut available: Vec<Option<&CorroboratedFinding>> =
        baseline.findings.iter().map(Some).collect();

    let mut new = Vec::new();
    let mut changed = Vec::new();

    for cur in &current.findings {
        let matched = available.iter_mut().find_map(|slot| {
            let candidate = (*slot)?;
            candidate
                .finding
                .same_issue(&cur.finding)
                .then(|| slot.take())
                .flatten()
        });
        match matched {
            Some(base) => {
                if let Some(delta) = change_between(base, cur) {
                    changed.push(delta);
                }
            }
            None => new.push(cur.clone()),
        }
    }

    let resolved: Vec<CorroboratedFinding> =
        available.into_iter().flatten().cloned().collect();

    let trend = if resolved.len() > new.len() {
        DriftTrend::Improving
    } else if new.len() > resolved.len() {
        DriftTrend::Regressing
    } else {
        DriftTrend::Stable
    };

    debug!(
        new = new.len(),
        resolved = resolved.len(),
        changed = changed.len(),
        ?trend,
        "compared reports"
    );

    DriftReport {
        baseline_id: baseline.id.clone(),
        current_id: current.id.clone(),
        summary: DriftSummary {
            new_count: new.len(),
            resolved_count: resolved.len(),
            changed_count: changed.len(),
            trend,
        },
        new,
        resolved,
        changed,
    }
}

fn change_between(
    base: &CorroboratedFinding,
    cur: &CorroboratedFinding,
) -> Option<ChangedFinding> {
    let severity_change = (base.finding.severity != cur.finding.severity)
        .then_some((base.finding.severity, cur.finding.severity));
    let confidence_change = ((base.effective_confidence - cur.effective_confidence).abs()
        > f64::EPSILON)
        .then_some((base.effective_confidence, cur.effective_confidence));

    if severity_change.is_none() && confidence_change.is_none() {
        return None;
    }
    Some(ChangedFinding {
        baseline: base.clone(),
        current: cur.clone(),
        severity_change,
        confidence_change,
    })
}
