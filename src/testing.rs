//! Mock implementations for tests

use crate::llm::{BackendError, ChatBackend, ChatReply, ChatRequest};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Mock backend that returns queued replies and records every request
pub struct MockBackend {
    replies: Mutex<VecDeque<Result<ChatReply, BackendError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_reply(&self, reply: ChatReply) {
        self.replies.lock().unwrap().push_back(Ok(reply));
    }

    pub fn queue_error(&self, error: BackendError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::unavailable("no mock reply queued")))
    }

    fn backend_id(&self) -> &str {
        "mock"
    }
}
