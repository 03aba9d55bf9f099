//! Scripted generator for tests

use super::{GenerationRequest, Generator};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Scripted {
    Text(String),
    Fail(String),
}

#[derive(Debug, Clone, Copy)]
enum Fallback {
    Text,
    Fail,
    Stall(Duration),
}

/// Generator returning queued responses and recording every request.
///
/// Once the queue is drained it answers according to its fallback:
/// `"ok"`, a capability failure, or a sleep longer than any test timeout.
#[derive(Clone)]
pub struct MockGenerator {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
    fallback: Fallback,
}

impl MockGenerator {
    fn with_fallback(fallback: Fallback) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            fallback,
        }
    }

    pub fn new() -> Self {
        Self::with_fallback(Fallback::Text)
    }

    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mock = Self::new();
        for r in responses {
            mock.push_response(r);
        }
        mock
    }

    pub fn failing() -> Self {
        Self::with_fallback(Fallback::Fail)
    }

    pub fn stalling(delay: Duration) -> Self {
        Self::with_fallback(Fallback::Stall(delay))
    }

    pub fn push_response(&self, text: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Text(text.into()));
    }

    pub fn push_failure(&self, message: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Fail(message.into()));
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Text(text)) => Ok(text),
            Some(Scripted::Fail(message)) => Err(Error::Capability(message)),
            None => match self.fallback {
                Fallback::Text => Ok("ok".to_string()),
                Fallback::Fail => Err(Error::Capability("mock backend unavailable".to_string())),
                Fallback::Stall(delay) => {
                    tokio::time::sleep(delay).await;
                    Ok("late".to_string())
                }
            },
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
