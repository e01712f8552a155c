//! Component discovery.
//!
//! Two strategies: **manifest mode**, where an external collaborator names
//! components with explicit paths and tags and files are assigned by path
//! containment (a file may stay unassigned); and **heuristic mode**, the
//! zero-configuration fallback that groups files by their first two path
//! segments (every file lands in exactly one component).

use std::collections::BTreeMap;

use argus_core::plan::AuditComponent;
use argus_core::source::SourceFile;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One externally-declared component.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestComponent {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// An externally supplied component/tag map.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentManifest {
    pub components: Vec<ManifestComponent>,
}

/// Partition files into components, preferring the manifest when given.
pub fn discover_components(
    files: &[SourceFile],
    manifest: Option<&ComponentManifest>,
) -> Vec<AuditComponent> {
    let components = match manifest {
        Some(m) => from_manifest(files, m),
        None => heuristic(files),
    };
    debug!(
        components = components.len(),
        files = files.len(),
        mode = if manifest.is_some() { "manifest" } else { "heuristic" },
        "components discovered"
    );
    components
}

fn from_manifest(files: &[SourceFile], manifest: &ComponentManifest) -> Vec<AuditComponent> {
    manifest
        .components
        .iter()
        .map(|mc| {
            let members: Vec<&SourceFile> = files
                .iter()
                .filter(|f| path_contains(&mc.path, &f.path))
                .collect();
            build_component(&mc.name, &mc.path, &members, mc.tags.clone())
        })
        .collect()
}

fn heuristic(files: &[SourceFile]) -> Vec<AuditComponent> {
    let mut groups: BTreeMap<String, Vec<&SourceFile>> = BTreeMap::new();
    for f in files {
        groups.entry(group_key(&f.path)).or_default().push(f);
    }
    groups
        .into_iter()
        .map(|(key, members)| build_component(&key, &key, &members, Vec::new()))
        .collect()
}

/// First two path segments, or the whole path when shorter.
fn group_key(path: &str) -> String {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    match (segments.next(), segments.next()) {
        (Some(a), Some(b)) => format!("{a}/{b}"),
        (Some(a), None) => a.to_string(),
        _ => String::new(),
    }
}

fn path_contains(component_path: &str, file_path: &str) -> bool {
    let prefix = component_path.trim_matches('/');
    if prefix.is_empty() {
        return true;
    }
    file_path == prefix || file_path.starts_with(&format!("{prefix}/"))
}

fn build_component(
    name: &str,
    path: &str,
    members: &[&SourceFile],
    tags: Vec<String>,
) -> AuditComponent {
    let mut languages: Vec<String> = members
        .iter()
        .filter_map(|f| f.language())
        .map(String::from)
        .collect();
    languages.sort_unstable();
    languages.dedup();

    AuditComponent {
        name: name.to_string(),
        path: path.to_string(),
        files: members.iter().map(|f| f.path.clone()).collect(),
        languages,
        estimated_tokens: members.iter().map(|f| f.estimated_tokens()).sum(),
        tags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files() -> Vec<SourceFile> {
        vec![
            SourceFile::new("api/routes/users.ts", "export const users = [];"),
            SourceFile::new("api/routes/orders.ts", "export const orders = [];"),
            SourceFile::new("api/middleware/auth.ts", "export function auth() {}"),
            SourceFile::new("web/pages/index.tsx", "<div />"),
            SourceFile::new("README.md", "# readme"),
        ]
    }

    // --- heuristic mode ---

    #[test]
    fn heuristic_groups_by_first_two_segments() {
        let comps = discover_components(&files(), None);
        let names: Vec<&str> = comps.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["README.md", "api/middleware", "api/routes", "web/pages"]);
    }

    #[test]
    fn heuristic_every_file_in_exactly_one_component() {
        let fs = files();
        let comps = discover_components(&fs, None);
        let mut assigned: Vec<&str> = comps
            .iter()
            .flat_map(|c| c.files.iter().map(String::as_str))
            .collect();
        assigned.sort_unstable();
        assert_eq!(assigned.len(), fs.len());
        let mut expected: Vec<&str> = fs.iter().map(|f| f.path.as_str()).collect();
        expected.sort_unstable();
        assert_eq!(assigned, expected);
    }

    #[test]
    fn heuristic_collects_languages() {
        let comps = discover_components(&files(), None);
        let api = comps.iter().find(|c| c.name == "api/routes").unwrap();
        assert_eq!(api.languages, vec!["typescript"]);
    }

    #[test]
    fn heuristic_sums_tokens() {
        let fs = vec![
            SourceFile::new("a/b/one.rs", "12345678"), // 2 tokens
            SourceFile::new("a/b/two.rs", "1234"),     // 1 token
        ];
        let comps = discover_components(&fs, None);
        assert_eq!(comps[0].estimated_tokens, 3);
    }

    // --- manifest mode ---

    #[test]
    fn manifest_assigns_by_path_containment() {
        let manifest = ComponentManifest {
            components: vec![
                ManifestComponent {
                    name: "API".into(),
                    path: "api".into(),
                    tags: vec!["API routes".into()],
                },
                ManifestComponent {
                    name: "Web".into(),
                    path: "web".into(),
                    tags: vec!["frontend".into()],
                },
            ],
        };
        let comps = discover_components(&files(), Some(&manifest));
        assert_eq!(comps.len(), 2);
        assert_eq!(comps[0].files.len(), 3);
        assert_eq!(comps[1].files.len(), 1);
        assert_eq!(comps[0].tags, vec!["API routes"]);
    }

    #[test]
    fn manifest_mode_may_leave_files_unassigned() {
        let manifest = ComponentManifest {
            components: vec![ManifestComponent {
                name: "API".into(),
                path: "api".into(),
                tags: vec![],
            }],
        };
        let comps = discover_components(&files(), Some(&manifest));
        let assigned: usize = comps.iter().map(|c| c.files.len()).sum();
        assert_eq!(assigned, 3); // README.md and web/ stay unassigned
    }

    #[test]
    fn path_containment_is_segment_aware() {
        assert!(path_contains("api", "api/routes.ts"));
        assert!(!path_contains("api", "apiary/routes.ts"));
        assert!(path_contains("api/routes", "api/routes"));
    }
}
