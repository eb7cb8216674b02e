//! Bounded conversation history owned by the victim role
//!
//! Stored as complete (human, assistant) exchanges so eviction can never
//! leave a dangling half-pair: the bound is enforced by the structure, not
//! by post-hoc truncation.

use crate::llm::ChatMessage;
use std::collections::VecDeque;

/// Maximum retained exchanges (8 pairs = 16 messages)
pub const MAX_EXCHANGES: usize = 8;

/// One completed turn
#[derive(Debug, Clone, PartialEq)]
struct Exchange {
    human: String,
    assistant: String,
}

/// Rolling pair-aligned history
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    exchanges: VecDeque<Exchange>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed exchange, evicting the oldest pair when full
    pub fn push(&mut self, human: impl Into<String>, assistant: impl Into<String>) {
        if self.exchanges.len() == MAX_EXCHANGES {
            self.exchanges.pop_front();
        }
        self.exchanges.push_back(Exchange {
            human: human.into(),
            assistant: assistant.into(),
        });
    }

    /// Flatten into an alternating human/assistant message sequence
    pub fn as_messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.exchanges.len() * 2);
        for ex in &self.exchanges {
            messages.push(ChatMessage::human(ex.human.clone()));
            messages.push(ChatMessage::assistant(ex.assistant.clone()));
        }
        messages
    }

    /// Number of messages the flattened view contains (always even)
    #[cfg(test)]
    pub fn message_count(&self) -> usize {
        self.exchanges.len() * 2
    }
}
