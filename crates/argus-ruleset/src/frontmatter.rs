//! `---`-delimited front-matter parsing.
//!
//! The block supports flat `key: value` pairs only: bare scalars, quoted
//! strings, and bracketed lists. The missing opening delimiter is the one
//! fatal error of the whole pipeline, since there is nothing to plan against.

use std::collections::BTreeMap;

/// A front-matter value: a scalar or a bracketed list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrontMatterValue {
    Scalar(String),
    List(Vec<String>),
}

impl FrontMatterValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::List(_) => None,
        }
    }

    /// Scalar as-is, list joined with ", ".
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Scalar(s) => s.clone(),
            Self::List(items) => items.join(", "),
        }
    }
}

/// Split a document into its front-matter map and remaining body.
///
/// Returns `None` when the document does not begin with a `---` line.
pub fn split(text: &str) -> Option<(BTreeMap<String, FrontMatterValue>, &str)> {
    let rest = text.strip_prefix("---")?;
    // Delimiter must be a full line.
    let rest = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n"))?;

    let mut map = BTreeMap::new();
    let mut consumed = 0;

    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if trimmed.trim() == "---" {
            consumed += line.len();
            let body = &rest[consumed..];
            return Some((map, body));
        }
        consumed += line.len();

        let Some((key, value)) = trimmed.split_once(':') else {
            continue; // tolerate stray lines, faithful transcription elsewhere
        };
        let key = key.trim().to_string();
        if key.is_empty() {
            continue;
        }
        map.insert(key, parse_value(value.trim()));
    }

    // Unterminated block: no closing delimiter means no front-matter.
    None
}

fn parse_value(raw: &str) -> FrontMatterValue {
    if let Some(inner) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        let items = inner
            .split(',')
            .map(|item| unquote(item.trim()).to_string())
            .filter(|item| !item.is_empty())
            .collect();
        return FrontMatterValue::List(items);
    }
    FrontMatterValue::Scalar(unquote(raw).to_string())
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    if s.len() >= 2 {
        if let Some(inner) = s.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
            return inner;
        }
        if let Some(inner) = s.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')) {
            return inner;
        }
    }
    s
}
