//! Response parsing and normalization.
//!
//! Accepts a pre-validated structured value or free text. From free text a
//! single bounded object is extracted: one leading/trailing code fence is
//! stripped, then the first brace-delimited object in the remainder is
//! taken. Every field is defensively normalized, never trusted. When no
//! object can be extracted at all, the task does not fail; it yields one
//! synthetic zero-confidence `PARSE-ERROR` finding so a malformed reply
//! degrades the report instead of aborting the run.

use argus_core::backend::BackendResponse;
use argus_core::finding::{AuditFinding, Location, PARSE_ERROR_RULE_ID};
use argus_core::plan::AuditTask;
use argus_core::severity::Severity;
use serde_json::Value;
use tracing::warn;

/// Parse one backend reply into normalized findings.
pub fn parse_response(task: &AuditTask, response: &BackendResponse) -> Vec<AuditFinding> {
    let object = response
        .structured
        .clone()
        .or_else(|| extract_object(&response.text));

    let Some(object) = object else {
        warn!(task_id = %task.id, "no JSON object in backend reply");
        return vec![parse_error_finding(task)];
    };

    let Some(items) = object.get("findings").and_then(Value::as_array) else {
        warn!(task_id = %task.id, "reply object has no findings array");
        return vec![parse_error_finding(task)];
    };

    items
        .iter()
        .map(|item| normalize_finding(task, item))
        .collect()
}

/// The synthetic finding standing in for an unparseable reply.
fn parse_error_finding(task: &AuditTask) -> AuditFinding {
    AuditFinding {
        rule_id: PARSE_ERROR_RULE_ID.into(),
        severity: Severity::Informational,
        title: "Backend reply could not be parsed".into(),
        description: format!("Task {} returned no extractable JSON object", task.id),
        locations: vec![fallback_location(task)],
        evidence: String::new(),
        remediation: String::new(),
        confidence: 0.0,
    }
}

fn fallback_location(task: &AuditTask) -> Location {
    let file = task
        .files
        .first()
        .cloned()
        .unwrap_or_else(|| "<unknown>".into());
    Location::line(file, 1)
}

/// Extract the first brace-delimited object, after stripping one
/// leading/trailing fenced marker. Balanced-brace scan, string-aware.
pub fn extract_object(text: &str) -> Option<Value> {
    let stripped = strip_fence(text);
    let bytes = stripped.as_bytes();
    let start = stripped.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return serde_json::from_str(&stripped[start..=i]).ok();
                }
            }
            _ => {}
        }
    }
    None
}

/// Strip one ```-fenced wrapper if present (with or without a language tag).
fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag line.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn normalize_finding(task: &AuditTask, item: &Value) -> AuditFinding {
    let rule_id = str_field(item, "ruleId")
        .filter(|s| !s.is_empty())
        .unwrap_or("UNKNOWN")
        .to_string();

    let severity = Severity::normalize(str_field(item, "severity").unwrap_or(""));

    let confidence = item
        .get("confidence")
        .and_then(Value::as_f64)
        .unwrap_or(0.5)
        .clamp(0.0, 1.0);

    let mut locations: Vec<Location> = item
        .get("locations")
        .and_then(Value::as_array)
        .map(|locs| locs.iter().filter_map(normalize_location).collect())
        .unwrap_or_default();
    if locations.is_empty() {
        // A finding is never dropped for lacking a location.
        locations.push(fallback_location(task));
    }

    AuditFinding {
        rule_id,
        severity,
        title: str_field(item, "title").unwrap_or("Untitled finding").to_string(),
        description: str_field(item, "description").unwrap_or_default().to_string(),
        locations,
        evidence: str_field(item, "evidence").unwrap_or_default().to_string(),
        remediation: str_field(item, "remediation").unwrap_or_default().to_string(),
        confidence,
    }
}

fn normalize_location(loc: &Value) -> Option<Location> {
    let file = loc.get("file")?.as_str()?.to_string();
    if file.is_empty() {
        return None;
    }
    let start_line = loc
        .get("startLine")
        .and_then(Value::as_u64)
        .filter(|&n| n >= 1)
        .unwrap_or(1) as u32;
    let end_line = loc
        .get("endLine")
        .and_then(Value::as_u64)
        .map(|n| n as u32)
        .filter(|&n| n >= start_line);
    Some(Location {
        file,
        start_line,
        end_line,
    })
}

fn str_field<'a>(item: &'a Value, key: &str) -> Option<&'a str> {
    item.get(key).and_then(Value::as_str)
}
