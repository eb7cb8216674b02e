//! Common types for chat-completion backends

use serde::{Deserialize, Serialize};

/// A chat-completion request
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// System/persona instruction, already fully substituted
    pub system: String,
    pub messages: Vec<ChatMessage>,
    /// Tool catalog offered for this call; empty means no tools may be requested
    pub tools: Vec<ToolDescriptor>,
}

impl ChatRequest {
    pub fn new(system: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            system: system.into(),
            messages,
            tools: vec![],
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDescriptor>) -> Self {
        self.tools = tools;
        self
    }
}

/// Message in conversation
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: Vec<ContentBlock>,
}

impl ChatMessage {
    pub fn human(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Human,
            content: vec![ContentBlock::text(text)],
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: vec![ContentBlock::text(text)],
        }
    }

    /// The assistant message carrying the tool calls, reconstructed so the
    /// backend sees its own requests when results are folded back in.
    pub fn assistant_tool_calls(calls: &[ToolCallRequest]) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: calls
                .iter()
                .map(|c| ContentBlock::ToolUse {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    arguments: c.arguments.clone(),
                })
                .collect(),
        }
    }

    /// Tool results ride in a human-role message, one block per resolved call.
    pub fn tool_results(results: &[ToolResult]) -> Self {
        Self {
            role: MessageRole::Human,
            content: results
                .iter()
                .map(|r| ContentBlock::ToolResult {
                    call_id: r.id.clone(),
                    content: r.text.clone(),
                })
                .collect(),
        }
    }

    /// Concatenated text content of the message
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Whether any block in this message is a tool result
    pub fn has_tool_result(&self) -> bool {
        self.content
            .iter()
            .any(|block| matches!(block, ContentBlock::ToolResult { .. }))
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    Human,
    Assistant,
}

/// Content block in a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        arguments: serde_json::Value,
    },
    ToolResult {
        call_id: String,
        content: String,
    },
}

impl ContentBlock {
    pub fn text(s: impl Into<String>) -> Self {
        ContentBlock::Text { text: s.into() }
    }
}

/// Tool advertised to the backend. All soundboard cues are zero-argument, so
/// a name + description pair is the whole catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
}

/// A backend-issued request to invoke one tool.
///
/// `id` is an opaque correlation token chosen by the backend; it must be
/// echoed back unmodified in the matching [`ToolResult`].
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

impl ToolCallRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

/// Result of one resolved tool call, ephemeral within a single turn
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub id: String,
    pub text: String,
}

/// Backend reply: either a final text or a request to invoke tools
#[derive(Debug, Clone, PartialEq)]
pub enum ChatReply {
    Final { text: String },
    ToolCalls { calls: Vec<ToolCallRequest> },
}

impl ChatReply {
    pub fn final_text(text: impl Into<String>) -> Self {
        ChatReply::Final { text: text.into() }
    }
}
