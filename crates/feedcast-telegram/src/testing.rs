//! In-memory [`Transport`] for tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use crate::api::{ApiReply, Transport, BLOCKED_DESCRIPTION, METHOD_SEND_MESSAGE};
use crate::error::Result;

/// A call seen by [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub payload: Value,
}

impl RecordedCall {
    /// The payload's `chat_id`, if any.
    pub fn chat_id(&self) -> Option<i64> {
        self.payload.get("chat_id").and_then(Value::as_i64)
    }

    /// The payload's `text`, if any.
    pub fn text(&self) -> Option<&str> {
        self.payload.get("text").and_then(Value::as_str)
    }
}

/// Records every call and answers 200 unless told otherwise.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<RecordedCall>>,
    blocked_chats: Mutex<HashSet<i64>>,
    replies: Mutex<HashMap<String, ApiReply>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `sendMessage` to this chat with the 403 blocked reply.
    pub fn block_chat(&self, chat_id: i64) {
        lock(&self.blocked_chats).insert(chat_id);
    }

    /// Answers every call to `method` with `reply`.
    pub fn respond_to(&self, method: &str, reply: ApiReply) {
        lock(&self.replies).insert(method.to_string(), reply);
    }

    /// All calls so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Calls to one method, in order.
    pub fn calls_to(&self, method: &str) -> Vec<RecordedCall> {
        lock(&self.calls)
            .iter()
            .filter(|call| call.method == method)
            .cloned()
            .collect()
    }

    /// `sendMessage` texts addressed to one chat, in order.
    pub fn texts_to(&self, chat_id: i64) -> Vec<String> {
        self.calls_to(METHOD_SEND_MESSAGE)
            .iter()
            .filter(|call| call.chat_id() == Some(chat_id))
            .filter_map(|call| call.text().map(str::to_string))
            .collect()
    }

    /// Forgets recorded calls.
    pub fn clear(&self) {
        lock(&self.calls).clear();
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn call(&self, method: &str, payload: &Value) -> Result<ApiReply> {
        let call = RecordedCall {
            method: method.to_string(),
            payload: payload.clone(),
        };
        let chat_id = call.chat_id();
        lock(&self.calls).push(call);

        if method == METHOD_SEND_MESSAGE
            && chat_id.is_some_and(|id| lock(&self.blocked_chats).contains(&id))
        {
            return Ok(ApiReply::error(403, BLOCKED_DESCRIPTION));
        }
        if let Some(reply) = lock(&self.replies).get(method) {
            return Ok(reply.clone());
        }
        Ok(ApiReply::ok())
    }
}
