//! Victim role: the stateful persona and its per-turn tool protocol
//!
//! One turn makes at most two backend calls: the first offers the soundboard
//! catalog; if the backend answers with tool calls, every call is resolved
//! sequentially in request order and a single follow-up call (no catalog) is
//! made for the final text. A backend that requests tools again on the
//! follow-up violates the protocol and the turn degrades to a fixed reply.

use crate::llm::{ChatBackend, ChatMessage, ChatReply, ChatRequest, ToolCallRequest, ToolResult};
use crate::prompts;
use crate::roles::ConversationHistory;
use crate::tools::Soundboard;
use std::sync::Arc;

/// Fixed degraded reply when the backend is unavailable
pub const APOLOGY_REPLY: &str =
    "Oh… pardon… ma ligne coupe tout le temps… vous pouvez redire ça ?";

/// Fixed reply when the backend requests a second tool round in one turn
pub const PROTOCOL_FALLBACK_REPLY: &str =
    "Euh… attendez… je me suis perdue… on reprend depuis le début ?";

/// The victim persona
pub struct Victim {
    backend: Arc<dyn ChatBackend>,
    soundboard: Soundboard,
    history: ConversationHistory,
}

impl Victim {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            soundboard: Soundboard,
            history: ConversationHistory::new(),
        }
    }

    /// Resolve one turn into a final reply.
    ///
    /// Exactly one (human, assistant) pair is appended to the history per
    /// call, whatever happened inside the turn.
    pub async fn respond(
        &mut self,
        scammer: &str,
        objective: &str,
        constraint: Option<&str>,
    ) -> String {
        let system = prompts::victim_system(objective, constraint);
        let mut messages = self.history.as_messages();
        messages.push(ChatMessage::human(scammer));

        let request = ChatRequest::new(system.clone(), messages.clone())
            .with_tools(self.soundboard.descriptors());

        let reply = match self.backend.complete(&request).await {
            Ok(ChatReply::Final { text }) => text,
            Ok(ChatReply::ToolCalls { calls }) => {
                self.resolve_tool_round(&system, messages, &calls).await
            }
            Err(e) => {
                tracing::warn!(error = %e, "victim backend unavailable, degrading turn");
                APOLOGY_REPLY.to_string()
            }
        };

        self.history.push(scammer, reply.clone());
        reply
    }

    /// One tool round: resolve the cues in request order, fold the results
    /// back, and ask for the final text with no catalog offered.
    async fn resolve_tool_round(
        &self,
        system: &str,
        mut messages: Vec<ChatMessage>,
        calls: &[ToolCallRequest],
    ) -> String {
        let results: Vec<ToolResult> = calls
            .iter()
            .map(|call| {
                let text = self.soundboard.invoke(&call.name).into_text();
                tracing::debug!(tool = %call.name, call_id = %call.id, result = %text, "sound cue resolved");
                ToolResult {
                    // id echoed exactly as issued so the backend can correlate
                    id: call.id.clone(),
                    text,
                }
            })
            .collect();

        messages.push(ChatMessage::assistant_tool_calls(calls));
        messages.push(ChatMessage::tool_results(&results));

        let request = ChatRequest::new(system, messages);
        match self.backend.complete(&request).await {
            Ok(ChatReply::Final { text }) => text,
            Ok(ChatReply::ToolCalls { .. }) => {
                tracing::warn!("backend requested tools twice in one turn, degrading turn");
                PROTOCOL_FALLBACK_REPLY.to_string()
            }
            Err(e) => {
                tracing::warn!(error = %e, "victim backend unavailable after tool round");
                APOLOGY_REPLY.to_string()
            }
        }
    }

    /// Number of messages the rolling history currently holds
    #[cfg(test)]
    pub fn history_len(&self) -> usize {
        self.history.message_count()
    }
}
