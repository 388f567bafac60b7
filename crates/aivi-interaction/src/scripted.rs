//! A [`ChatCompletion`] that replays canned results, for tests and offline
//! runs.

use crate::gateway::{ChatCompletion, GatewayError};
use aivi_core::context::ContextDocument;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Returns queued results in order and records every request it receives.
/// Once the queue is drained every call fails with
/// [`GatewayError::EmptyResponse`].
#[derive(Debug, Default)]
pub struct ScriptedCompletion {
    script: Mutex<VecDeque<Result<String, GatewayError>>>,
    requests: Mutex<Vec<ContextDocument>>,
}

impl ScriptedCompletion {
    pub fn new(script: impl IntoIterator<Item = Result<String, GatewayError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queues a further result.
    pub fn push(&self, result: Result<String, GatewayError>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(result);
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<ContextDocument> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatCompletion for ScriptedCompletion {
    async fn complete(&self, request: &ContextDocument) -> Result<String, GatewayError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front())
            .unwrap_or(Err(GatewayError::EmptyResponse))
    }
}
