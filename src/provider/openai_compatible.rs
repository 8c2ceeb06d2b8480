//! Provider for any OpenAI-compatible Chat Completions API.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::Result;
use crate::types::{Message, ResponseFormat, Role, ToolCall, Usage};

use super::http::{bearer_headers, shared_client, status_to_error};
use super::{ChatRequest, ChatResponse, ModelProvider};

/// Chat Completions client (OpenAI, OpenRouter, local gateways).
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    provider_name: String,
    model: String,
    api_key: String,
    base_url: String,
    response_format: ResponseFormat,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        provider_name: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            provider_name: provider_name.into(),
            model: model.into(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            response_format: ResponseFormat::Text,
        }
    }

    /// Request `json_object` responses instead of plain text.
    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_request_body(&self, request: &ChatRequest) -> Value {
        let mut body = Map::new();
        body.insert("model".into(), json!(self.model));
        body.insert(
            "messages".into(),
            Value::Array(request.messages.iter().map(message_to_openai).collect()),
        );

        let config = &request.config;
        let sampling = [
            ("temperature", config.temperature.map(Value::from)),
            ("max_tokens", config.max_tokens.map(Value::from)),
            ("top_p", config.top_p.map(Value::from)),
            ("frequency_penalty", config.frequency_penalty.map(Value::from)),
            ("presence_penalty", config.presence_penalty.map(Value::from)),
        ];
        for (key, value) in sampling {
            if let Some(value) = value {
                body.insert(key.into(), value);
            }
        }

        if !request.tools.is_empty() {
            let tools: Vec<Value> = request
                .tools
                .iter()
                .map(|t| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        }
                    })
                })
                .collect();
            body.insert("tools".into(), Value::Array(tools));
            body.insert("tool_choice".into(), json!("auto"));
        }

        body.insert(
            "response_format".into(),
            json!({ "type": request.response_format.to_string() }),
        );

        Value::Object(body)
    }
}

#[async_trait]
impl ModelProvider for OpenAiCompatibleProvider {
    fn provider_name(&self) -> &str {
        &self.provider_name
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    fn response_format(&self) -> ResponseFormat {
        self.response_format
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let body = self.build_request_body(request);
        let url = format!("{}/chat/completions", self.base_url);

        debug!(
            provider = %self.provider_name,
            model = %self.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Chat completion"
        );

        let resp = shared_client()
            .post(&url)
            .headers(bearer_headers(&self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status.as_u16(), &body_text));
        }

        let data: OpenAiChatResponse = resp.json().await?;
        let usage = data
            .usage
            .map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();
        let choice = data
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .map(OpenAiMessage::into_message);

        Ok(ChatResponse { usage, choice })
    }
}

fn message_to_openai(msg: &Message) -> Value {
    let mut obj = Map::new();
    obj.insert("role".into(), json!(msg.role.to_string()));
    obj.insert("content".into(), json!(msg.content));
    if let Some(name) = &msg.name {
        obj.insert("name".into(), json!(name));
    }
    if let Some(id) = &msg.tool_call_id {
        obj.insert("tool_call_id".into(), json!(id));
    }
    if !msg.tool_calls.is_empty() {
        let calls: Vec<Value> = msg
            .tool_calls
            .iter()
            .map(|tc| {
                json!({
                    "id": tc.id,
                    "type": "function",
                    "function": {
                        "name": tc.function.name,
                        "arguments": tc.function.arguments,
                    }
                })
            })
            .collect();
        obj.insert("tool_calls".into(), Value::Array(calls));
    }
    Value::Object(obj)
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: Option<OpenAiMessage>,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

impl OpenAiMessage {
    fn into_message(self) -> Message {
        let tool_calls = self
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCall::new(tc.id, tc.function.name, tc.function.arguments))
            .collect();
        Message {
            role: Role::Assistant,
            content: self.content.unwrap_or_default(),
            name: None,
            tool_call_id: None,
            tool_calls,
        }
    }
}

#[derive(Deserialize)]
struct OpenAiToolCall {
    id: String,
    function: OpenAiFunction,
}

#[derive(Deserialize)]
struct OpenAiFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Deserialize)]
struct OpenAiUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}
