//! Google Gemini provider implementation

use super::types::{
    ChatMessage, ChatReply, ChatRequest, ContentBlock, MessageRole, ToolCallRequest,
};
use super::{BackendError, ChatBackend};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Gemini backend
pub struct GeminiBackend {
    client: Client,
    api_key: String,
    base_url: String,
    backend_id: String,
}

impl GeminiBackend {
    pub fn new(api_key: String, model: Option<&str>) -> Self {
        let model = model.unwrap_or(DEFAULT_MODEL);
        let base_url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent"
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        let backend_id = format!("gemini/{model}");
        Self {
            client,
            api_key,
            base_url,
            backend_id,
        }
    }

    fn translate_request(request: &ChatRequest) -> GeminiRequest {
        let system_instruction = if request.system.is_empty() {
            None
        } else {
            Some(GeminiContent {
                role: None,
                parts: vec![GeminiPart::Text {
                    text: request.system.clone(),
                }],
            })
        };

        let mut contents = Vec::new();
        for msg in &request.messages {
            let role = match msg.role {
                MessageRole::Human => "user",
                MessageRole::Assistant => "model",
            };

            let parts: Vec<GeminiPart> = msg
                .content
                .iter()
                .map(|block| match block {
                    ContentBlock::Text { text } => GeminiPart::Text { text: text.clone() },
                    ContentBlock::ToolUse {
                        id: _, // Gemini's wire format doesn't carry call ids
                        name,
                        arguments,
                    } => GeminiPart::FunctionCall {
                        function_call: GeminiFunctionCall {
                            name: name.clone(),
                            args: arguments.clone(),
                        },
                    },
                    ContentBlock::ToolResult { call_id: _, content } => {
                        GeminiPart::FunctionResponse {
                            function_response: GeminiFunctionResponse {
                                name: "function".to_string(),
                                response: serde_json::json!({ "result": content }),
                            },
                        }
                    }
                })
                .collect();

            if !parts.is_empty() {
                contents.push(GeminiContent {
                    role: Some(role.to_string()),
                    parts,
                });
            }
        }

        let tools = if request.tools.is_empty() {
            None
        } else {
            Some(vec![GeminiTools {
                function_declarations: request
                    .tools
                    .iter()
                    .map(|t| GeminiFunctionDecl {
                        name: t.name.clone(),
                        description: t.description.clone(),
                    })
                    .collect(),
            }])
        };

        GeminiRequest {
            system_instruction,
            contents,
            tools,
        }
    }

    fn normalize_response(resp: GeminiResponse) -> Result<ChatReply, BackendError> {
        let candidate = resp
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::unknown("No candidates in response"))?;

        let mut text_parts = Vec::new();
        let mut calls = Vec::new();

        for part in candidate.content.parts {
            match part {
                GeminiPart::Text { text } => text_parts.push(text),
                GeminiPart::FunctionCall { function_call } => {
                    // Gemini doesn't issue call ids; synthesize an opaque one
                    // so the correlation contract holds downstream.
                    calls.push(ToolCallRequest {
                        id: format!("gemini-{}", uuid::Uuid::new_v4()),
                        name: function_call.name,
                        arguments: function_call.args,
                    });
                }
                GeminiPart::FunctionResponse { .. } => {}
            }
        }

        if calls.is_empty() {
            Ok(ChatReply::Final {
                text: text_parts.join(""),
            })
        } else {
            Ok(ChatReply::ToolCalls { calls })
        }
    }
}

#[async_trait]
impl ChatBackend for GeminiBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        let gemini_request = Self::translate_request(request);

        let response = self
            .client
            .post(&self.base_url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    BackendError::unavailable(format!("Request failed: {e}"))
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
            return Err(match status.as_u16() {
                401 | 403 => BackendError::auth(format!("Authentication failed: {body}")),
                429 => BackendError::rate_limit(format!("Rate limit exceeded: {body}")),
                400 => BackendError::invalid_request(format!("Invalid request: {body}")),
                500..=599 => BackendError::unavailable(format!("Server error: {body}")),
                _ => BackendError::unknown(format!("HTTP {status}: {body}")),
            });
        }

        let gemini_response: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| BackendError::unknown(format!("Failed to parse response: {e}")))?;

        Self::normalize_response(gemini_response)
    }

    fn backend_id(&self) -> &str {
        &self.backend_id
    }
}

// Wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GeminiTools>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    FunctionCall {
        #[serde(rename = "functionCall")]
        function_call: GeminiFunctionCall,
    },
    FunctionResponse {
        #[serde(rename = "functionResponse")]
        function_response: GeminiFunctionResponse,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionResponse {
    name: String,
    response: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTools {
    function_declarations: Vec<GeminiFunctionDecl>,
}

#[derive(Debug, Serialize)]
struct GeminiFunctionDecl {
    name: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}
