//! Testing utilities including a scripted model.
//!
//! Useful for exercising the analyzer, and code built on it, without
//! network access or API keys.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use crate::error::{TransportError, TransportErrorKind};
use crate::traits::vision::{VisionModel, VisionRequest};

/// A vision model that replays scripted responses in order.
///
/// Every request is recorded for later assertions. Once the script runs out,
/// calls fail with a [`TransportErrorKind::Other`] error. Clones share the
/// same script and request log.
#[derive(Default, Clone)]
pub struct MockVisionModel {
    /// Responses still to hand out, front first
    script: Arc<RwLock<VecDeque<Result<String, TransportError>>>>,

    /// Call tracking for assertions
    requests: Arc<RwLock<Vec<VisionRequest>>>,
}

impl MockVisionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw text response.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.script.write().unwrap().push_back(Ok(text.into()));
        self
    }

    /// Queue a JSON value, serialized as the model would send it.
    pub fn with_json(self, value: serde_json::Value) -> Self {
        self.with_response(value.to_string())
    }

    /// Queue a transport failure.
    pub fn with_error(self, error: TransportError) -> Self {
        self.script.write().unwrap().push_back(Err(error));
        self
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<VisionRequest> {
        self.requests.read().unwrap().clone()
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<VisionRequest> {
        self.requests.read().unwrap().last().cloned()
    }

    pub fn call_count(&self) -> usize {
        self.requests.read().unwrap().len()
    }

    /// Scripted responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.read().unwrap().len()
    }

    /// Clear recorded requests.
    pub fn clear_requests(&self) {
        self.requests.write().unwrap().clear();
    }
}

#[async_trait]
impl VisionModel for MockVisionModel {
    async fn complete(&self, request: VisionRequest) -> Result<String, TransportError> {
        self.requests.write().unwrap().push(request);
        self.script.write().unwrap().pop_front().unwrap_or_else(|| {
            Err(TransportError::new(
                TransportErrorKind::Other,
                "mock vision model has no scripted response left",
            ))
        })
    }
}
