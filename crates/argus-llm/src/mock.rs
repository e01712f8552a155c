//! Deterministic backend double for tests: no network, pre-programmed
//! replies served in call order.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use argus_core::backend::{AuditBackend, BackendRequest, BackendResponse};
use argus_core::errors::BackendError;
use argus_core::tokens::TokenUsage;
use async_trait::async_trait;
use parking_lot::Mutex;

/// Pre-programmed replies for deterministic testing without a live model.
pub enum MockReply {
    /// Return this response.
    Response(BackendResponse),
    /// Return an error from the call itself.
    Error(BackendError),
    /// Wait a duration, then serve the inner reply.
    Delay(Duration, Box<MockReply>),
}

impl MockReply {
    /// Convenience: a plain-text reply.
    pub fn text(text: &str) -> Self {
        Self::Response(BackendResponse {
            text: text.to_string(),
            structured: None,
            usage: None,
        })
    }

    /// Convenience: a findings object as fenced JSON text, with usage.
    pub fn findings_json(value: serde_json::Value) -> Self {
        let body = value.to_string();
        Self::Response(BackendResponse {
            text: format!("```json\n{body}\n```"),
            structured: None,
            usage: Some(TokenUsage {
                input_tokens: 100,
                output_tokens: body.len() as u64 / 4,
            }),
        })
    }

    /// Convenience: a reply honoring constrained decoding.
    pub fn structured(value: serde_json::Value) -> Self {
        Self::Response(BackendResponse {
            text: value.to_string(),
            structured: Some(value),
            usage: None,
        })
    }

    /// Convenience: wrap any reply with a delay.
    pub fn delayed(delay: Duration, inner: MockReply) -> Self {
        Self::Delay(delay, Box::new(inner))
    }
}

/// Mock backend that serves pre-programmed replies in sequence.
pub struct MockBackend {
    replies: Mutex<Vec<Option<MockReply>>>,
    call_count: AtomicUsize,
    requests: Mutex<Vec<BackendRequest>>,
}

impl MockBackend {
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Some).collect()),
            call_count: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A mock that answers every call with the same empty findings object.
    pub fn always_empty(calls: usize) -> Self {
        Self::new(
            (0..calls)
                .map(|_| MockReply::text(r#"{"findings": []}"#))
                .collect(),
        )
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Requests seen so far, in call order.
    pub fn requests(&self) -> Vec<BackendRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl AuditBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &BackendRequest) -> Result<BackendResponse, BackendError> {
        let idx = self.call_count.fetch_add(1, Ordering::Relaxed);
        self.requests.lock().push(request.clone());

        let reply = self.replies.lock().get_mut(idx).and_then(Option::take);
        let Some(reply) = reply else {
            return Err(BackendError::InvalidRequest(format!(
                "MockBackend: no reply configured for call {idx}"
            )));
        };

        resolve(reply).await
    }
}

/// Resolve a reply, sleeping through any Delay layers iteratively.
async fn resolve(reply: MockReply) -> Result<BackendResponse, BackendError> {
    let mut current = reply;
    loop {
        match current {
            MockReply::Response(resp) => return Ok(resp),
            MockReply::Error(e) => return Err(e),
            MockReply::Delay(duration, inner) => {
                tokio::time::sleep(duration).await;
                current = *inner;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_core::backend::BackendOptions;

    fn request() -> BackendRequest {
        BackendRequest {
            system: "sys".into(),
            user: "usr".into(),
            options: BackendOptions::default(),
        }
    }

    #[tokio::test]
    async fn serves_replies_in_sequence() {
        let mock = MockBackend::new(vec![MockReply::text("first"), MockReply::text("second")]);
        let r1 = mock.complete(&request()).await.unwrap();
        let r2 = mock.complete(&request()).await.unwrap();
        assert_eq!(r1.text, "first");
        assert_eq!(r2.text, "second");
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn error_reply() {
        let mock = MockBackend::new(vec![MockReply::Error(BackendError::Overloaded)]);
        let err = mock.complete(&request()).await.unwrap_err();
        assert!(matches!(err, BackendError::Overloaded));
    }

    #[tokio::test]
    async fn exhausted_replies_error() {
        let mock = MockBackend::new(vec![MockReply::text("only one")]);
        let _ = mock.complete(&request()).await;
        let err = mock.complete(&request()).await.unwrap_err();
        assert!(matches!(err, BackendError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn delayed_reply_waits() {
        let mock = MockBackend::new(vec![MockReply::delayed(
            Duration::from_millis(50),
            MockReply::text("after delay"),
        )]);
        let start = std::time::Instant::now();
        let resp = mock.complete(&request()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(40));
        assert_eq!(resp.text, "after delay");
    }

    #[tokio::test]
    async fn structured_reply_sets_both_fields() {
        let mock = MockBackend::new(vec![MockReply::structured(
            serde_json::json!({"findings": []}),
        )]);
        let resp = mock.complete(&request()).await.unwrap();
        assert!(resp.structured.is_some());
        assert!(resp.text.contains("findings"));
    }

    #[tokio::test]
    async fn records_requests() {
        let mock = MockBackend::always_empty(1);
        let _ = mock.complete(&request()).await.unwrap();
        let seen = mock.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].system, "sys");
    }

    #[test]
    fn backend_name() {
        let mock = MockBackend::new(vec![]);
        assert_eq!(mock.name(), "mock");
    }
}
