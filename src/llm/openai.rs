//! `OpenAI`-compatible provider implementation
//!
//! Also covers local-model runners and other chat-completions-compatible
//! servers through the base URL override.

use super::types::{
    ChatMessage, ChatReply, ChatRequest, ContentBlock, MessageRole, ToolCallRequest,
};
use super::{BackendError, ChatBackend};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// `OpenAI`-compatible backend
pub struct OpenAiBackend {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    backend_id: String,
}

impl OpenAiBackend {
    pub fn new(api_key: String, model: Option<&str>, base_url: Option<&str>) -> Self {
        let model = model.unwrap_or(DEFAULT_MODEL).to_string();
        let base_url = match base_url {
            Some(url) => format!("{}/chat/completions", url.trim_end_matches('/')),
            None => DEFAULT_BASE_URL.to_string(),
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        let backend_id = format!("openai/{model}");
        Self {
            client,
            api_key,
            model,
            base_url,
            backend_id,
        }
    }

    fn translate_request(&self, request: &ChatRequest) -> OpenAiRequest {
        let mut messages = Vec::new();

        if !request.system.is_empty() {
            messages.push(OpenAiMessage {
                role: "system".to_string(),
                content: Some(request.system.clone()),
                tool_calls: None,
                tool_call_id: None,
            });
        }

        for msg in &request.messages {
            messages.extend(Self::translate_message(msg));
        }

        let tools = if request.tools.is_empty() {
            None
        } else {
            Some(
                request
                    .tools
                    .iter()
                    .map(|t| OpenAiTool {
                        r#type: "function".to_string(),
                        function: OpenAiFunction {
                            name: t.name.clone(),
                            description: t.description.clone(),
                            // All soundboard cues are zero-argument
                            parameters: serde_json::json!({
                                "type": "object",
                                "properties": {}
                            }),
                        },
                    })
                    .collect(),
            )
        };

        OpenAiRequest {
            model: self.model.clone(),
            messages,
            tools,
            stream: false,
        }
    }

    /// Translate one message to `OpenAI` format. Returns a Vec because tool
    /// results need separate messages with role "tool".
    fn translate_message(msg: &ChatMessage) -> Vec<OpenAiMessage> {
        let role = match msg.role {
            MessageRole::Human => "user",
            MessageRole::Assistant => "assistant",
        };

        let mut text_parts = Vec::new();
        let mut tool_calls = Vec::new();
        let mut tool_results = Vec::new();

        for block in &msg.content {
            match block {
                ContentBlock::Text { text } => text_parts.push(text.clone()),
                ContentBlock::ToolUse {
                    id,
                    name,
                    arguments,
                } => {
                    tool_calls.push(OpenAiToolCall {
                        id: id.clone(),
                        r#type: "function".to_string(),
                        function: OpenAiFunctionCall {
                            name: name.clone(),
                            arguments: serde_json::to_string(arguments)
                                .unwrap_or_else(|_| "{}".to_string()),
                        },
                    });
                }
                ContentBlock::ToolResult { call_id, content } => {
                    tool_results.push((call_id.clone(), content.clone()));
                }
            }
        }

        let mut messages = Vec::new();

        if !text_parts.is_empty() || !tool_calls.is_empty() {
            messages.push(OpenAiMessage {
                role: role.to_string(),
                content: if text_parts.is_empty() {
                    None
                } else {
                    Some(text_parts.join("\n"))
                },
                tool_calls: if tool_calls.is_empty() {
                    None
                } else {
                    Some(tool_calls)
                },
                tool_call_id: None,
            });
        }

        // Tool results are separate messages with role "tool"; the correlation
        // id is echoed exactly as the backend issued it.
        for (call_id, content) in tool_results {
            messages.push(OpenAiMessage {
                role: "tool".to_string(),
                content: Some(content),
                tool_calls: None,
                tool_call_id: Some(call_id),
            });
        }

        if messages.is_empty() {
            messages.push(OpenAiMessage {
                role: role.to_string(),
                content: Some(String::new()),
                tool_calls: None,
                tool_call_id: None,
            });
        }

        messages
    }

    fn normalize_response(resp: OpenAiResponse) -> Result<ChatReply, BackendError> {
        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::unknown("No choices in response"))?;

        if let Some(tool_calls) = choice.message.tool_calls {
            let calls: Vec<ToolCallRequest> = tool_calls
                .into_iter()
                .filter(|tc| !tc.function.name.is_empty())
                .map(|tc| ToolCallRequest {
                    id: tc.id,
                    name: tc.function.name,
                    arguments: serde_json::from_str(&tc.function.arguments)
                        .unwrap_or_else(|_| serde_json::json!({})),
                })
                .collect();

            if !calls.is_empty() {
                return Ok(ChatReply::ToolCalls { calls });
            }
        }

        Ok(ChatReply::Final {
            text: choice.message.content.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        let openai_request = self.translate_request(request);

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::unavailable(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    BackendError::unavailable(format!("Connection failed: {e}"))
                } else {
                    BackendError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::unavailable(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            if let Ok(error_resp) = serde_json::from_str::<OpenAiErrorResponse>(&body) {
                let message = error_resp.error.message;
                return Err(match status.as_u16() {
                    401 | 403 => BackendError::auth(format!("Authentication failed: {message}")),
                    429 => BackendError::rate_limit(format!("Rate limit exceeded: {message}")),
                    400 => BackendError::invalid_request(format!("Invalid request: {message}")),
                    500..=599 => BackendError::unavailable(format!("Server error: {message}")),
                    _ => BackendError::unknown(format!("HTTP {status}: {message}")),
                });
            }
            return Err(BackendError::unknown(format!("HTTP {status} error: {body}")));
        }

        let openai_response: OpenAiResponse = serde_json::from_str(&body)
            .map_err(|e| BackendError::unknown(format!("Failed to parse response: {e}")))?;

        Self::normalize_response(openai_response)
    }

    fn backend_id(&self) -> &str {
        &self.backend_id
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAiTool>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct OpenAiTool {
    r#type: String,
    function: OpenAiFunction,
}

#[derive(Debug, Serialize)]
struct OpenAiFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiToolCall {
    id: String,
    r#type: String,
    function: OpenAiFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ToolDescriptor;

    fn backend() -> OpenAiBackend {
        OpenAiBackend::new("test-key".to_string(), None, None)
    }

    #[test]
    fn test_system_message_first() {
        let req = ChatRequest::new("persona", vec![ChatMessage::human("allô ?")]);
        let wire = backend().translate_request(&req);
        assert_eq!(wire.messages[0].role, "system");
        assert_eq!(wire.messages[0].content.as_deref(), Some("persona"));
        assert_eq!(wire.messages[1].role, "user");
    }

    #[test]
    fn test_tool_results_become_tool_role_messages() {
        let calls = vec![ToolCallRequest::new("call-7", "doorbell")];
        let results = vec![crate::llm::ToolResult {
            id: "call-7".to_string(),
            text: "[SOUND_EFFECT: DOORBELL]".to_string(),
        }];
        let req = ChatRequest::new(
            "persona",
            vec![
                ChatMessage::assistant_tool_calls(&calls),
                ChatMessage::tool_results(&results),
            ],
        );
        let wire = backend().translate_request(&req);

        let assistant = &wire.messages[1];
        assert_eq!(assistant.role, "assistant");
        assert_eq!(assistant.tool_calls.as_ref().unwrap()[0].id, "call-7");

        let tool = &wire.messages[2];
        assert_eq!(tool.role, "tool");
        assert_eq!(tool.tool_call_id.as_deref(), Some("call-7"));
        assert_eq!(tool.content.as_deref(), Some("[SOUND_EFFECT: DOORBELL]"));
    }

    #[test]
    fn test_zero_arg_tool_schema() {
        let req = ChatRequest::new("persona", vec![ChatMessage::human("hi")]).with_tools(vec![
            ToolDescriptor {
                name: "dog_bark".to_string(),
                description: "Joue un aboiement de chien.".to_string(),
            },
        ]);
        let wire = backend().translate_request(&req);
        let tools = wire.tools.unwrap();
        assert_eq!(tools[0].function.name, "dog_bark");
        assert_eq!(
            tools[0].function.parameters["properties"],
            serde_json::json!({})
        );
    }

    #[test]
    fn test_normalize_tool_call_reply() {
        let resp: OpenAiResponse = serde_json::from_value(serde_json::json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": { "name": "doorbell", "arguments": "{}" }
                    }]
                }
            }]
        }))
        .unwrap();

        match OpenAiBackend::normalize_response(resp).unwrap() {
            ChatReply::ToolCalls { calls } => {
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].id, "call_abc");
                assert_eq!(calls[0].name, "doorbell");
            }
            ChatReply::Final { .. } => panic!("expected tool calls"),
        }
    }

    #[test]
    fn test_normalize_final_reply() {
        let resp: OpenAiResponse = serde_json::from_value(serde_json::json!({
            "choices": [{ "message": { "content": "Allô oui ?" } }]
        }))
        .unwrap();

        assert_eq!(
            OpenAiBackend::normalize_response(resp).unwrap(),
            ChatReply::final_text("Allô oui ?")
        );
    }
}
