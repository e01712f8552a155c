use serde::{Deserialize, Serialize};

/// One file of the audited tree, held in memory. Discovery of the tree is
/// the caller's job; the planner and executor never touch the filesystem
/// for audited content.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    /// Path relative to the target root, forward slashes.
    pub path: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Rough token estimate from character count (4 chars ≈ 1 token).
    pub fn estimated_tokens(&self) -> u64 {
        crate::tokens::estimate_tokens(&self.content)
    }

    /// Best-effort language tag from the file extension.
    pub fn language(&self) -> Option<&'static str> {
        let ext = self.path.rsplit('.').next()?;
        Some(match ext {
            "rs" => "rust",
            "ts" | "tsx" => "typescript",
            "js" | "jsx" | "mjs" => "javascript",
            "py" => "python",
            "go" => "go",
            "java" => "java",
            "rb" => "ruby",
            "c" | "h" => "c",
            "cpp" | "cc" | "hpp" => "cpp",
            "cs" => "csharp",
            "php" => "php",
            "swift" => "swift",
            "kt" => "kotlin",
            "sql" => "sql",
            "sh" | "bash" => "shell",
            "yml" | "yaml" => "yaml",
            "json" => "json",
            "toml" => "toml",
            _ => return None,
        })
    }
}
