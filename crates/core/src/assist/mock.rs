//! Scripted `ModelClient` for tests.

use super::client::{ChatRequest, ModelClient};
use crate::error::{LabError, LabResult};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

enum Scripted {
    Reply(String),
    Fail(String),
}

/// Replays queued replies in order and records every request
#[derive(Default)]
pub struct MockModelClient {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockModelClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: impl Into<String>) -> Self {
        self.script.lock().unwrap().push_back(Scripted::Reply(text.into()));
        self
    }

    pub fn fail(self, message: impl Into<String>) -> Self {
        self.script.lock().unwrap().push_back(Scripted::Fail(message.into()));
        self
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn complete(&self, request: ChatRequest) -> LabResult<String> {
        self.requests.lock().unwrap().push(request);
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Reply(text)) => Ok(text),
            Some(Scripted::Fail(message)) => Err(LabError::Provider(message)),
            None => Err(LabError::Provider("no scripted reply".into())),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
