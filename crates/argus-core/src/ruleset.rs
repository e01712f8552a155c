use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single compliance rule from the catalog.
///
/// `severity` and `applies_to` are stored exactly as written in the catalog;
/// normalization happens downstream (see [`crate::Severity::normalize`]).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub title: String,
    pub category: String,
    pub severity: String,
    pub applies_to: Vec<String>,
    pub compliant: String,
    pub violation: String,
    pub what_to_look_for: Vec<String>,
    pub guidance: String,
}

/// A concern spanning files or components rather than checkable per file.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossCuttingPattern {
    pub id: String,
    pub title: String,
    pub scope: String,
    pub relates_to: Vec<String>,
    pub objective: String,
    pub checks: Vec<String>,
}

/// Catalog front-matter metadata. `framework` is required; everything else
/// is carried through untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesetMeta {
    pub framework: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

/// A parsed rule catalog. Parsed once per run, read-only thereafter.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ruleset {
    pub meta: RulesetMeta,
    pub rules: Vec<Rule>,
    pub cross_cutting: Vec<CrossCuttingPattern>,
}

impl Ruleset {
    pub fn rule(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn pattern(&self, id: &str) -> Option<&CrossCuttingPattern> {
        self.cross_cutting.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Ruleset {
        Ruleset {
            meta: RulesetMeta {
                framework: "owasp-asvs".into(),
                version: Some("1.0".into()),
                extra: BTreeMap::new(),
            },
            rules: vec![Rule {
                id: "BAC-01".into(),
                title: "Broken access control".into(),
                category: "Access Control".into(),
                severity: "Critical".into(),
                applies_to: vec!["API routes".into()],
                compliant: "Every route checks authorization".into(),
                violation: "Unauthenticated access to protected data".into(),
                what_to_look_for: vec!["missing middleware".into()],
                guidance: "Centralize access checks".into(),
            }],
            cross_cutting: vec![CrossCuttingPattern {
                id: "CROSS-01".into(),
                title: "Consistent error handling".into(),
                scope: "all".into(),
                relates_to: vec!["BAC-01".into()],
                objective: "Uniform error responses".into(),
                checks: vec!["no stack traces to clients".into()],
            }],
        }
    }

    #[test]
    fn rule_lookup() {
        let rs = sample();
        assert!(rs.rule("BAC-01").is_some());
        assert!(rs.rule("NOPE-99").is_none());
    }

    #[test]
    fn pattern_lookup() {
        let rs = sample();
        assert!(rs.pattern("CROSS-01").is_some());
        assert!(rs.pattern("CROSS-99").is_none());
    }

    #[test]
    fn serde_roundtrip() {
        let rs = sample();
        let json = serde_json::to_string(&rs).unwrap();
        let parsed: Ruleset = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.rules[0].id, "BAC-01");
        assert_eq!(parsed.cross_cutting[0].relates_to, vec!["BAC-01"]);
        // severity stays the raw catalog string
        assert_eq!(parsed.rules[0].severity, "Critical");
    }
}
