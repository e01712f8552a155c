//! Rule catalog parser.
//!
//! Turns a Markdown + front-matter catalog into a [`Ruleset`]. The body is
//! split on `## ` category headings; a section whose heading contains
//! "cross-cutting" (any case) parses as [`CrossCuttingPattern`] blocks,
//! every other section as [`Rule`] blocks. Blocks are delimited by
//! `### ID: Title` sub-headings, fields by `**Label:**` markers whose value
//! runs until the next marker, sub-heading, or end of block. Severity and
//! tags are transcribed exactly as written; normalization is downstream.

use argus_core::ruleset::{CrossCuttingPattern, Rule, Ruleset, RulesetMeta};
use tracing::debug;

use crate::frontmatter;

#[derive(Debug, thiserror::Error)]
pub enum RulesetError {
    /// The document does not begin with a closed `---` front-matter block.
    /// This is the single fatal error of the pipeline.
    #[error("ruleset document has no front-matter block")]
    MissingFrontMatter,
}

/// Parse a rule catalog document.
pub fn parse_ruleset(text: &str) -> Result<Ruleset, RulesetError> {
    let (fm, body) = frontmatter::split(text).ok_or(RulesetError::MissingFrontMatter)?;

    let mut meta = RulesetMeta::default();
    for (key, value) in fm {
        match key.as_str() {
            "framework" => meta.framework = value.to_display_string(),
            "version" => meta.version = Some(value.to_display_string()),
            _ => {
                let _ = meta.extra.insert(key, value.to_display_string());
            }
        }
    }

    let mut rules = Vec::new();
    let mut cross_cutting = Vec::new();

    for section in split_on_heading(body, "## ") {
        let (heading, content) = section;
        let is_cross_cutting = heading.to_lowercase().contains("cross-cutting");

        for (block_heading, block) in split_on_heading(content, "### ") {
            let Some((id, title)) = block_heading.split_once(':') else {
                continue;
            };
            let id = id.trim().to_string();
            let title = title.trim().to_string();
            let fields = collect_fields(block);

            if is_cross_cutting {
                cross_cutting.push(CrossCuttingPattern {
                    id,
                    title,
                    scope: fields.text("Scope"),
                    relates_to: fields.csv("Relates to"),
                    objective: fields.text("Objective"),
                    checks: fields.bullets("What to verify"),
                });
            } else {
                rules.push(Rule {
                    id,
                    title,
                    category: heading.trim().to_string(),
                    severity: fields.text("Severity"),
                    applies_to: fields.csv("Applies to"),
                    compliant: fields.text("Compliant"),
                    violation: fields.text("Violation"),
                    what_to_look_for: fields.bullets("What to look for"),
                    guidance: fields.text("Guidance"),
                });
            }
        }
    }

    debug!(
        rules = rules.len(),
        cross_cutting = cross_cutting.len(),
        framework = %meta.framework,
        "ruleset parsed"
    );

    Ok(Ruleset {
        meta,
        rules,
        cross_cutting,
    })
}

/// Split text into (heading, content) pairs on lines starting with the
/// given prefix. Content before the first heading is dropped.
fn split_on_heading<'a>(text: &'a str, prefix: &str) -> Vec<(&'a str, &'a str)> {
    let mut out: Vec<(&str, usize, usize)> = Vec::new(); // heading, start, end
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if let Some(heading) = trimmed.strip_prefix(prefix) {
            if let Some(last) = out.last_mut() {
                last.2 = offset;
            }
            out.push((heading.trim(), offset + line.len(), text.len()));
        }
        offset += line.len();
    }

    out.into_iter()
        .map(|(heading, start, end)| (heading, &text[start..end]))
        .collect()
}

/// Ordered (label, raw lines) pairs recovered from one block.
struct BlockFields {
    fields: Vec<(String, Vec<String>)>,
}

impl BlockFields {
    fn raw(&self, label: &str) -> Option<&[String]> {
        self.fields
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(label))
            .map(|(_, lines)| lines.as_slice())
    }

    /// Multi-line text value, joined and trimmed.
    fn text(&self, label: &str) -> String {
        self.raw(label)
            .map(|lines| lines.join("\n").trim().to_string())
            .unwrap_or_default()
    }

    /// Comma-separated value list (e.g. `Applies to`, `Relates to`).
    fn csv(&self, label: &str) -> Vec<String> {
        self.text(label)
            .split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    }

    /// Bullet lines directly following the marker.
    fn bullets(&self, label: &str) -> Vec<String> {
        let Some(lines) = self.raw(label) else {
            return Vec::new();
        };
        lines
            .iter()
            .map(|l| l.trim())
            .filter_map(|l| l.strip_prefix("- ").or_else(|| l.strip_prefix("* ")))
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect()
    }
}

/// Walk a block's lines; a `**Label:** value` marker opens a field whose
/// value accumulates until the next marker or end of block. Inline
/// remainders land on the marker line itself, letting multi-line values
/// (e.g. `Guidance`) appear without explicit terminators.
fn collect_fields(block: &str) -> BlockFields {
    let mut fields: Vec<(String, Vec<String>)> = Vec::new();

    for line in block.lines() {
        if let Some((label, inline)) = parse_marker(line) {
            let mut lines = Vec::new();
            if !inline.is_empty() {
                lines.push(inline.to_string());
            }
            fields.push((label.to_string(), lines));
        } else if let Some((_, lines)) = fields.last_mut() {
            lines.push(line.to_string());
        }
    }

    BlockFields { fields }
}

/// Match `**Label:** rest` or `**Label**: rest`.
fn parse_marker(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim_start();
    let rest = trimmed.strip_prefix("**")?;
    // Either the colon is inside the bold span or right after it.
    if let Some((label, tail)) = rest.split_once(":**") {
        return Some((label.trim(), tail.trim()));
    }
    if let Some((label, tail)) = rest.split_once("**:") {
        return Some((label.trim(), tail.trim()));
    }
    None
}
