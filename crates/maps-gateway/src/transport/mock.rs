//! Mock transport for testing

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde_json::Value;

use super::{TransportError, UpstreamResponse, UpstreamTransport};
use maps_core::UpstreamCall;

/// A scripted upstream reply
#[derive(Debug, Clone)]
pub enum MockReply {
    /// 200 with the given JSON body
    Json(Value),
    /// Arbitrary status and raw body
    Raw { status: StatusCode, body: String },
    /// Fail as if the request timed out
    Timeout,
    /// Fail as if nothing was listening
    ConnectionRefused,
}

impl MockReply {
    fn into_result(self) -> Result<UpstreamResponse, TransportError> {
        match self {
            MockReply::Json(value) => Ok(UpstreamResponse::new(StatusCode::OK, value.to_string())),
            MockReply::Raw { status, body } => Ok(UpstreamResponse::new(status, body)),
            MockReply::Timeout => Err(TransportError::Timeout(Duration::from_secs(10))),
            MockReply::ConnectionRefused => Err(TransportError::ConnectionFailed(
                "tcp connect error: Connection refused (os error 111)".to_string(),
            )),
        }
    }
}

/// Mock transport that records every call.
///
/// Scripted replies are consumed in order; once they run out the fallback
/// reply is used for every further call.
pub struct MockTransport {
    calls: Mutex<Vec<UpstreamCall>>,
    replies: Mutex<VecDeque<MockReply>>,
    fallback: Mutex<MockReply>,
}

impl MockTransport {
    /// Mock answering `{"status": "OK", "results": []}` to every call
    pub fn new() -> Self {
        Self::with_fallback(MockReply::Json(serde_json::json!({
            "status": "OK",
            "results": [],
        })))
    }

    pub fn with_fallback(fallback: MockReply) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            replies: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(fallback),
        }
    }

    /// Queue a reply for the next unanswered call
    pub fn push_reply(&self, reply: MockReply) {
        self.replies.lock().push_back(reply);
    }

    pub fn set_fallback(&self, reply: MockReply) {
        *self.fallback.lock() = reply;
    }

    /// Calls seen so far, oldest first
    pub fn calls(&self) -> Vec<UpstreamCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn last_call(&self) -> Option<UpstreamCall> {
        self.calls.lock().last().cloned()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UpstreamTransport for MockTransport {
    async fn get(&self, call: &UpstreamCall) -> Result<UpstreamResponse, TransportError> {
        self.calls.lock().push(call.clone());

        let reply = self
            .replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.lock().clone());

        reply.into_result()
    }
}
