//! Chat-completion backend abstraction
//!
//! Provides a common interface over hosted-model providers plus the
//! deterministic scripted stand-in used for offline runs and tests.

mod error;
mod gemini;
mod openai;
mod registry;
mod scripted;
mod types;

pub use error::{BackendError, BackendErrorKind};
pub use gemini::GeminiBackend;
pub use openai::OpenAiBackend;
pub use registry::{build_backend, BackendConfig};
pub use scripted::ScriptedBackend;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for chat-completion backends
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Make a completion request
    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, BackendError>;

    /// Identifier for logging (provider/model)
    fn backend_id(&self) -> &str;
}

#[async_trait]
impl<T: ChatBackend + ?Sized> ChatBackend for Arc<T> {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        (**self).complete(request).await
    }

    fn backend_id(&self) -> &str {
        (**self).backend_id()
    }
}

/// Logging wrapper for chat backends
pub struct LoggingBackend {
    inner: Arc<dyn ChatBackend>,
    backend_id: String,
}

impl LoggingBackend {
    pub fn new(inner: Arc<dyn ChatBackend>) -> Self {
        let backend_id = inner.backend_id().to_string();
        Self { inner, backend_id }
    }
}

#[async_trait]
impl ChatBackend for LoggingBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(ChatReply::Final { text }) => {
                tracing::info!(
                    backend = %self.backend_id,
                    duration_ms = %duration.as_millis(),
                    reply_chars = text.len(),
                    "chat completion finished"
                );
            }
            Ok(ChatReply::ToolCalls { calls }) => {
                tracing::info!(
                    backend = %self.backend_id,
                    duration_ms = %duration.as_millis(),
                    tool_calls = calls.len(),
                    "chat completion requested tools"
                );
            }
            Err(e) => {
                tracing::error!(
                    backend = %self.backend_id,
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    error = %e.message,
                    "chat completion failed"
                );
            }
        }

        result
    }

    fn backend_id(&self) -> &str {
        &self.backend_id
    }
}
