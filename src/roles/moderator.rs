//! Moderator role: turns raw audience proposals into a three-choice ballot
//!
//! Whatever the backend returns, the caller always gets exactly three
//! non-empty choices: short output is padded with a fixed filler, long
//! output is truncated.

use crate::audience::DEFAULT_EVENTS;
use crate::llm::{ChatBackend, ChatMessage, ChatReply, ChatRequest};
use crate::prompts;
use std::sync::Arc;

/// Deterministic padding when the backend returns fewer than three lines
pub const FILLER_CHOICE: &str = "La télé est trop forte";

/// Audience moderator
pub struct Moderator {
    backend: Arc<dyn ChatBackend>,
}

impl Moderator {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// Filter proposals into exactly three well-formed choices
    pub async fn pick_three(&self, proposals: &[String], context: &str) -> Vec<String> {
        let prompt = prompts::moderator_prompt(proposals, context);
        let request = ChatRequest::new("", vec![ChatMessage::human(prompt)]);

        let mut lines: Vec<String> = match self.backend.complete(&request).await {
            Ok(ChatReply::Final { text }) => text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect(),
            Ok(ChatReply::ToolCalls { .. }) => {
                // No catalog was offered; treat as malformed output
                tracing::warn!("moderator backend requested tools, ignoring");
                vec![]
            }
            Err(e) => {
                tracing::warn!(error = %e, "moderator backend unavailable, using default ballot");
                return DEFAULT_EVENTS.iter().map(|s| (*s).to_string()).collect();
            }
        };

        while lines.len() < 3 {
            lines.push(FILLER_CHOICE.to_string());
        }
        lines.truncate(3);
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::BackendError;
    use crate::testing::MockBackend;

    fn proposals(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[tokio::test]
    async fn test_exact_three_lines_pass_through() {
        let backend = Arc::new(MockBackend::new());
        backend.queue_reply(ChatReply::final_text("Un\nDeux\nTrois"));
        let moderator = Moderator::new(backend);

        let choices = moderator
            .pick_three(&proposals(&["a", "b", "c"]), "Gagner du temps.")
            .await;
        assert_eq!(choices, vec!["Un", "Deux", "Trois"]);
    }

    #[tokio::test]
    async fn test_short_output_padded_with_filler() {
        let backend = Arc::new(MockBackend::new());
        backend.queue_reply(ChatReply::final_text("Seule idée"));
        let moderator = Moderator::new(backend);

        let choices = moderator.pick_three(&proposals(&["a"]), "ctx").await;
        assert_eq!(choices, vec!["Seule idée", FILLER_CHOICE, FILLER_CHOICE]);
    }

    #[tokio::test]
    async fn test_long_output_truncated_to_three() {
        let backend = Arc::new(MockBackend::new());
        backend.queue_reply(ChatReply::final_text("1\n2\n3\n4\n5"));
        let moderator = Moderator::new(backend);

        let choices = moderator.pick_three(&proposals(&["a"]), "ctx").await;
        assert_eq!(choices, vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_blank_and_whitespace_lines_dropped() {
        let backend = Arc::new(MockBackend::new());
        backend.queue_reply(ChatReply::final_text("Un\n\n   \nDeux\n"));
        let moderator = Moderator::new(backend);

        let choices = moderator.pick_three(&proposals(&["a"]), "ctx").await;
        assert_eq!(choices, vec!["Un", "Deux", FILLER_CHOICE]);
    }

    #[tokio::test]
    async fn test_backend_error_yields_default_ballot() {
        let backend = Arc::new(MockBackend::new());
        backend.queue_error(BackendError::unavailable("down"));
        let moderator = Moderator::new(backend);

        let choices = moderator.pick_three(&proposals(&["a"]), "ctx").await;
        assert_eq!(choices.len(), 3);
        assert_eq!(choices[0], DEFAULT_EVENTS[0]);
    }

    #[tokio::test]
    async fn test_empty_proposals_still_well_formed() {
        let backend = Arc::new(MockBackend::new());
        backend.queue_reply(ChatReply::final_text(""));
        let moderator = Moderator::new(backend);

        let choices = moderator.pick_three(&[], "ctx").await;
        assert_eq!(choices.len(), 3);
        assert!(choices.iter().all(|c| !c.trim().is_empty()));
    }
}
