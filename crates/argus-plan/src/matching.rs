//! Rule-to-file matching.
//!
//! Manifest mode matches a component's tags against a rule's `applies_to`
//! tags by case-insensitive substring containment in either direction.
//! Heuristic mode has no tags: a file matches a rule when its path
//! satisfies any entry of a fixed tag→pattern dictionary, falling back to
//! raw substring matching of tag words (length > 3) against the path.
//! Over-scoping a task is deliberately preferred to silently skipping a
//! rule.

use argus_core::plan::AuditComponent;
use argus_core::ruleset::Rule;

/// Path substrings implied by well-known rule tags. The fallback when no
/// upstream tag metadata exists.
const TAG_PATTERNS: &[(&str, &[&str])] = &[
    ("authentication", &["auth", "login", "session", "jwt", "token", "credential"]),
    ("authorization", &["auth", "permission", "role", "access", "acl", "policy"]),
    ("api routes", &["api", "route", "controller", "handler", "endpoint"]),
    ("database", &["db", "database", "repo", "model", "schema", "migration", "query", "sql"]),
    ("input validation", &["valid", "sanitiz", "parse", "form", "input"]),
    ("cryptography", &["crypto", "hash", "encrypt", "sign", "cipher", "key"]),
    ("secrets", &["secret", "env", "config", "credential", "key"]),
    ("logging", &["log", "audit", "trace", "telemetry"]),
    ("file upload", &["upload", "file", "multipart", "storage"]),
    ("frontend", &["component", "page", "view", "template", "ui"]),
];

/// Case-insensitive substring containment in either direction.
fn tags_match(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    a.contains(&b) || b.contains(&a)
}

/// Does this rule apply to the component via manifest tags?
pub fn rule_matches_tags(rule: &Rule, component_tags: &[String]) -> bool {
    rule.applies_to
        .iter()
        .any(|rt| component_tags.iter().any(|ct| tags_match(rt, ct)))
}

/// Does this rule apply to a file path, with no tag metadata available?
pub fn rule_matches_path(rule: &Rule, path: &str) -> bool {
    let path_lower = path.to_lowercase();
    for tag in &rule.applies_to {
        let tag_lower = tag.to_lowercase();

        if let Some((_, patterns)) = TAG_PATTERNS
            .iter()
            .find(|(known, _)| tags_match(known, &tag_lower))
        {
            if patterns.iter().any(|p| path_lower.contains(p)) {
                return true;
            }
            continue;
        }

        // Unknown tag: raw substring match of its longer words.
        if tag_lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 3)
            .any(|w| path_lower.contains(w))
        {
            return true;
        }
    }
    false
}

/// Files of a component the rule applies to. In manifest mode a tag match
/// scopes the rule to the whole component; in heuristic mode each file is
/// matched individually.
pub fn matching_files<'a>(rule: &Rule, component: &'a AuditComponent) -> Vec<&'a str> {
    if !component.tags.is_empty() {
        if rule_matches_tags(rule, &component.tags) {
            return component.files.iter().map(String::as_str).collect();
        }
        return Vec::new();
    }
    component
        .files
        .iter()
        .map(String::as_str)
        .filter(|path| rule_matches_path(rule, path))
        .collect()
}
