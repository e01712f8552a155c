use argus_core::finding::{AuditFinding, Location};
use sha2::{Digest, Sha256};

/// Stable identity for a corroborated finding: sha256 over the rule id and
/// the canonical location. Survives re-runs as long as the issue stays on
/// the same lines.
pub fn fingerprint(finding: &AuditFinding) -> String {
    let location = finding.locations.first();
    let mut hasher = Sha256::new();
    hasher.update(finding.rule_id.as_bytes());
    hasher.update(b"|");
    if let Some(loc) = location {
        hasher.update(location_key(loc).as_bytes());
    }
    hex(&hasher.finalize())
}

fn location_key(loc: &Location) -> String {
    format!("{}:{}-{}", loc.file, loc.start_line, loc.end())
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}
