//! Backend selection from configuration
//!
//! The provider is a construction-time choice; the orchestration core only
//! ever sees the [`ChatBackend`](super::ChatBackend) contract.

use super::{ChatBackend, GeminiBackend, LoggingBackend, OpenAiBackend, ScriptedBackend};
use std::sync::Arc;

/// Configuration for chat backends
#[derive(Debug, Clone, Default)]
pub struct BackendConfig {
    /// Explicit provider choice: "openai", "gemini" or "scripted"
    pub provider: Option<String>,
    pub openai_api_key: Option<String>,
    /// Override for OpenAI-compatible servers (local runners, gateways)
    pub openai_base_url: Option<String>,
    pub gemini_api_key: Option<String>,
    pub model_victim: Option<String>,
    pub model_moderator: Option<String>,
}

impl BackendConfig {
    pub fn from_env() -> Self {
        Self {
            provider: std::env::var("SCAMSIM_PROVIDER").ok(),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            openai_base_url: std::env::var("OPENAI_BASE_URL").ok(),
            gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
            model_victim: std::env::var("MODEL_VICTIM").ok(),
            model_moderator: std::env::var("MODEL_MODERATOR").ok(),
        }
    }

    fn resolved_provider(&self) -> &str {
        if let Some(p) = self.provider.as_deref() {
            return p;
        }
        if self.openai_api_key.is_some() {
            return "openai";
        }
        if self.gemini_api_key.is_some() {
            return "gemini";
        }
        "scripted"
    }
}

/// Build a backend for one role, wrapped with request logging.
///
/// Falls back to the scripted stand-in when the chosen provider is missing
/// its credentials, so a simulation can always start.
pub fn build_backend(config: &BackendConfig, model: Option<&str>) -> Arc<dyn ChatBackend> {
    let inner: Arc<dyn ChatBackend> = match config.resolved_provider() {
        "openai" => match &config.openai_api_key {
            Some(key) => Arc::new(OpenAiBackend::new(
                key.clone(),
                model,
                config.openai_base_url.as_deref(),
            )),
            None => {
                tracing::warn!("OPENAI_API_KEY missing, falling back to scripted backend");
                Arc::new(ScriptedBackend)
            }
        },
        "gemini" => match &config.gemini_api_key {
            Some(key) => Arc::new(GeminiBackend::new(key.clone(), model)),
            None => {
                tracing::warn!("GEMINI_API_KEY missing, falling back to scripted backend");
                Arc::new(ScriptedBackend)
            }
        },
        "scripted" => Arc::new(ScriptedBackend),
        other => {
            tracing::warn!(provider = %other, "unknown provider, falling back to scripted backend");
            Arc::new(ScriptedBackend)
        }
    };

    Arc::new(LoggingBackend::new(inner))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_keys_selects_scripted() {
        let config = BackendConfig::default();
        let backend = build_backend(&config, None);
        assert_eq!(backend.backend_id(), "scripted");
    }

    #[test]
    fn test_openai_key_selects_openai() {
        let config = BackendConfig {
            openai_api_key: Some("test-key".to_string()),
            ..Default::default()
        };
        let backend = build_backend(&config, Some("gpt-4.1-mini"));
        assert_eq!(backend.backend_id(), "openai/gpt-4.1-mini");
    }

    #[test]
    fn test_explicit_provider_without_key_degrades_to_scripted() {
        let config = BackendConfig {
            provider: Some("gemini".to_string()),
            ..Default::default()
        };
        let backend = build_backend(&config, None);
        assert_eq!(backend.backend_id(), "scripted");
    }

    #[test]
    fn test_explicit_scripted_ignores_keys() {
        let config = BackendConfig {
            provider: Some("scripted".to_string()),
            openai_api_key: Some("test-key".to_string()),
            ..Default::default()
        };
        let backend = build_backend(&config, None);
        assert_eq!(backend.backend_id(), "scripted");
    }
}
