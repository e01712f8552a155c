use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use argus_core::finding::CorroboratedFinding;
use argus_core::source::SourceFile;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Fixed config filename, looked up at the target root.
pub const SUPPRESSION_FILE: &str = ".audit-suppressions.json";

/// Inline comment marker, recognized per source line. The comment covers
/// its own line and the line immediately after it.
static INLINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"audit-suppress\s+([A-Za-z0-9][A-Za-z0-9_.-]*)(?:\s+"([^"]*)")?"#).unwrap()
});

#[derive(Debug, thiserror::Error)]
pub enum SuppressError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed suppression config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One config-file suppression: a rule id plus an optional exact-file or
/// glob constraint.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuppressionRule {
    pub rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glob: Option<String>,
    pub reason: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuppressionConfig {
    pub rules: Vec<SuppressionRule>,
}

impl SuppressionConfig {
    /// Load the config from the target root. A missing file is an empty
    /// config; a present but malformed file is an error.
    pub fn load(target_root: &Path) -> Result<Self, SuppressError> {
        let path = target_root.join(SUPPRESSION_FILE);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no suppression config");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(SuppressError::Io {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        };
        serde_json::from_str(&text).map_err(|e| SuppressError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }
}

struct InlineSuppression {
    line: u32,
    reason: Option<String>,
}

/// Config rules plus inline comments, resolved against the audited files.
pub struct SuppressionIndex {
    config: Vec<(SuppressionRule, Option<glob::Pattern>)>,
    /// (file, rule id) → comment lines in that file for that rule.
    inline: HashMap<(String, String), Vec<InlineSuppression>>,
}

impl SuppressionIndex {
    pub fn build(config: SuppressionConfig, files: &[SourceFile]) -> Self {
        let config = config
            .rules
            .into_iter()
            .filter_map(|rule| match &rule.glob {
                Some(pat) => match glob::Pattern::new(pat) {
                    Ok(compiled) => Some((rule, Some(compiled))),
                    Err(e) => {
                        warn!(glob = %pat, error = %e, "skipping suppression with invalid glob");
                        None
                    }
                },
                None => Some((rule, None)),
            })
            .collect();

        let mut inline: HashMap<(String, String), Vec<InlineSuppression>> = HashMap::new();
        for file in files {
            for (idx, line) in file.content.lines().enumerate() {
                if let Some(caps) = INLINE_PATTERN.captures(line) {
                    let rule = caps[1].to_string();
                    let reason = caps.get(2).map(|m| m.as_str().to_string());
                    inline
                        .entry((file.path.clone(), rule))
                        .or_default()
                        .push(InlineSuppression {
                            line: idx as u32 + 1,
                            reason,
                        });
                }
            }
        }

        Self { config, inline }
    }

    /// An index with no suppressions at all; every finding passes through.
    pub fn empty() -> Self {
        Self {
            config: Vec::new(),
            inline: HashMap::new(),
        }
    }

    /// The suppression reason for a finding, if any rule or comment matches.
    fn matches(&self, finding: &CorroboratedFinding) -> Option<Option<String>> {
        for (rule, pattern) in &self.config {
            if rule.rule != finding.finding.rule_id {
                continue;
            }
            let file_ok = rule.file.as_ref().map_or(true, |f| {
                finding.finding.locations.iter().any(|loc| &loc.file == f)
            });
            let glob_ok = pattern.as_ref().map_or(true, |p| {
                finding.finding.locations.iter().any(|loc| p.matches(&loc.file))
            });
            if file_ok && glob_ok {
                return Some(Some(rule.reason.clone()));
            }
        }

        for loc in &finding.finding.locations {
            let key = (loc.file.clone(), finding.finding.rule_id.clone());
            if let Some(comments) = self.inline.get(&key) {
                for c in comments {
                    if loc.start_line == c.line || loc.start_line == c.line + 1 {
                        return Some(c.reason.clone());
                    }
                }
            }
        }

        None
    }
}

/// Mark matching findings suppressed in place. Suppressed findings stay in
/// the list; reporting and the severity summary treat them separately.
pub fn apply_suppressions(findings: &mut [CorroboratedFinding], index: &SuppressionIndex) {
    for f in findings.iter_mut() {
        if let Some(reason) = index.matches(f) {
            f.suppressed = true;
            f.suppression_reason = reason;
        }
    }
}
