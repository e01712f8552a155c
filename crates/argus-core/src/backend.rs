use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::BackendError;
use crate::tokens::TokenUsage;

/// Options carried on each backend request.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendOptions {
    pub model: String,
    pub max_tokens: u32,
    /// Machine-checkable output schema for constrained decoding, when the
    /// backend supports it. The same shape is always described in prose in
    /// the system prompt for backends that don't.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_schema: Option<serde_json::Value>,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            model: "default".into(),
            max_tokens: 8192,
            json_schema: None,
        }
    }
}

/// One fully-built request: prompts plus options.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendRequest {
    pub system: String,
    pub user: String,
    pub options: BackendOptions,
}

/// One backend reply. `structured` is present only when constrained
/// decoding was honored; `usage`, when present, drives exact token
/// accounting (otherwise estimated from character counts).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendResponse {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// The injected analysis engine. Opaque and failure-transparent: this core
/// imposes no deadline or retry of its own; both are the implementation's
/// responsibility.
#[async_trait]
pub trait AuditBackend: Send + Sync {
    /// Human-readable backend name, for logging and report metadata.
    fn name(&self) -> &str;

    async fn complete(&self, request: &BackendRequest) -> Result<BackendResponse, BackendError>;
}
