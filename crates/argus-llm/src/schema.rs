//! Machine-checkable output schema for constrained decoding.
//!
//! Backends that honor a JSON schema return the findings object in
//! `BackendResponse::structured`; the same shape is described in prose in
//! the system prompt for backends that don't.

use serde_json::{json, Value};

/// JSON schema of the expected findings object.
pub fn findings_schema() -> Value {
    json!({
        "type": "object",
        "required": ["findings"],
        "properties": {
            "findings": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["ruleId", "severity", "title", "description"],
                    "properties": {
                        "ruleId": { "type": "string" },
                        "severity": {
                            "type": "string",
                            "enum": ["critical", "high", "medium", "low", "informational"]
                        },
                        "title": { "type": "string" },
                        "description": { "type": "string" },
                        "locations": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "required": ["file", "startLine"],
                                "properties": {
                                    "file": { "type": "string" },
                                    "startLine": { "type": "integer", "minimum": 1 },
                                    "endLine": { "type": "integer", "minimum": 1 }
                                }
                            }
                        },
                        "evidence": { "type": "string" },
                        "remediation": { "type": "string" },
                        "confidence": { "type": "number", "minimum": 0, "maximum": 1 }
                    }
                }
            }
        }
    })
}

/// Prose rendering of the same shape, embedded in every system prompt.
pub const OUTPUT_DESCRIPTION: &str = r#"Respond with a single JSON object of this shape:
{
  "findings": [
    {
      "ruleId": "the id of the violated rule",
      "severity": "critical | high | medium | low | informational",
      "title": "one-line summary",
      "description": "what is wrong and why it violates the rule",
      "locations": [{ "file": "path/as/given", "startLine": 1, "endLine": 3 }],
      "evidence": "the offending code, quoted",
      "remediation": "how to fix it",
      "confidence": 0.9
    }
  ]
}
An empty findings list ({"findings": []}) is the correct answer when nothing violates the rules. Do not invent findings."#;
