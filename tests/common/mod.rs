//! Shared test helpers and a scripted mock provider.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use curia::error::{CuriaError, Result};
use curia::provider::{ChatRequest, ChatResponse, ModelProvider};
use curia::types::{Message, ResponseFormat, ToolCall, Usage};

/// A provider that replays queued responses and records every request.
pub struct MockProvider {
    model_id: String,
    response_format: ResponseFormat,
    responses: Mutex<VecDeque<Result<ChatResponse>>>,
    fallback: Mutex<Option<ChatResponse>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            model_id: "mock-model".to_string(),
            response_format: ResponseFormat::Text,
            responses: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Queue a final text answer.
    pub fn queue_text(&self, text: &str) {
        self.queue(Ok(response(Message::assistant(text))));
    }

    /// Queue an assistant turn requesting tool calls.
    pub fn queue_tool_calls(&self, calls: Vec<ToolCall>) {
        self.queue(Ok(response(Message::assistant_tool_calls("", calls))));
    }

    /// Queue an assistant message with neither content nor tool calls.
    pub fn queue_empty(&self) {
        self.queue(Ok(response(Message::assistant(""))));
    }

    pub fn queue_no_choice(&self) {
        self.queue(Ok(ChatResponse {
            usage: Usage::new(3, 0),
            choice: None,
        }));
    }

    pub fn queue_error(&self, err: CuriaError) {
        self.queue(Err(err));
    }

    /// Text returned once the queue is drained.
    pub fn fallback_text(&self, text: &str) {
        *self.fallback.lock().unwrap() = Some(response(Message::assistant(text)));
    }

    /// Tool call returned once the queue is drained.
    pub fn fallback_tool_call(&self, call: ToolCall) {
        *self.fallback.lock().unwrap() =
            Some(response(Message::assistant_tool_calls("", vec![call])));
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn queue(&self, response: Result<ChatResponse>) {
        self.responses.lock().unwrap().push_back(response);
    }
}

fn response(message: Message) -> ChatResponse {
    ChatResponse {
        usage: Usage::new(10, 5),
        choice: Some(message),
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn response_format(&self) -> ResponseFormat {
        self.response_format
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(next) = self.responses.lock().unwrap().pop_front() {
            return next;
        }
        match self.fallback.lock().unwrap().clone() {
            Some(response) => Ok(response),
            None => Err(CuriaError::provider("mock", "no scripted response left")),
        }
    }
}

/// Tool call with JSON arguments.
pub fn call(id: &str, name: &str, args: serde_json::Value) -> ToolCall {
    ToolCall::new(id, name, args.to_string())
}
