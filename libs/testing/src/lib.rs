//! Test support for reservation workflows.
//!
//! - [`ScriptedTransport`]: a [`Transport`] that replays canned replies per
//!   HTTP method and records every request it receives
//! - [`fixtures`]: JSON bodies shaped like real API responses

pub mod fixtures;

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use turbo_api::{Method, Transport, TransportError};

/// A canned transport reply.
#[derive(Debug, Clone)]
pub enum Reply {
    /// 2xx with a JSON body.
    Json(serde_json::Value),
    /// 2xx with a raw body (useful for malformed payloads).
    Raw(Bytes),
    /// 2xx with an empty body.
    Empty,
    /// 404.
    NotFound,
    /// 401.
    Unauthorized,
    /// Any other status.
    Status(u16, String),
}

impl Reply {
    pub fn json(value: serde_json::Value) -> Self {
        Self::Json(value)
    }

    pub fn raw(body: &'static str) -> Self {
        Self::Raw(Bytes::from_static(body.as_bytes()))
    }

    fn into_result(self, path: &str) -> Result<Bytes, TransportError> {
        match self {
            Self::Json(value) => Ok(Bytes::from(value.to_string())),
            Self::Raw(body) => Ok(body),
            Self::Empty => Ok(Bytes::new()),
            Self::NotFound => Err(TransportError::NotFound {
                path: path.to_string(),
            }),
            Self::Unauthorized => Err(TransportError::Unauthorized {
                status: 401,
                path: path.to_string(),
            }),
            Self::Status(status, body) => Err(TransportError::Status {
                status,
                path: path.to_string(),
                body,
            }),
        }
    }
}

/// A request observed by a [`ScriptedTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Vec<u8>>,
}

impl RecordedRequest {
    /// Parse the request body as JSON.
    pub fn json(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|body| serde_json::from_slice(body).ok())
    }
}

#[derive(Default)]
struct Script {
    replies: HashMap<Method, VecDeque<Reply>>,
    requests: Vec<RecordedRequest>,
}

/// Transport that replays scripted replies.
///
/// Replies are queued per method and consumed in order. The last reply of a
/// queue is sticky: once only one remains it is returned for every further
/// request, so "status stays IN_PROGRESS" is a single entry. A method with no
/// scripted replies answers 404.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<Script>,
    latency: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every reply by `latency` (on the tokio clock).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queue a reply for `method`.
    pub fn reply(self, method: Method, reply: Reply) -> Self {
        self.lock()
            .replies
            .entry(method)
            .or_default()
            .push_back(reply);
        self
    }

    /// Queue a reply for the create call.
    pub fn on_create(self, reply: Reply) -> Self {
        self.reply(Method::POST, reply)
    }

    /// Queue a reply for a status read.
    pub fn on_read(self, reply: Reply) -> Self {
        self.reply(Method::GET, reply)
    }

    /// Queue a reply for a delete.
    pub fn on_delete(self, reply: Reply) -> Self {
        self.reply(Method::DELETE, reply)
    }

    /// All requests received so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Number of requests received with `method`.
    pub fn count(&self, method: &Method) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|request| &request.method == method)
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_reply(&self, method: &Method, path: &str, body: Option<Vec<u8>>) -> Reply {
        let mut script = self.lock();
        script.requests.push(RecordedRequest {
            method: method.clone(),
            path: path.to_string(),
            body,
        });

        match script.replies.get_mut(method) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(Reply::NotFound),
            Some(queue) => queue.front().cloned().unwrap_or(Reply::NotFound),
            None => Reply::NotFound,
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Bytes, TransportError> {
        let reply = self.next_reply(&method, path, body);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        reply.into_result(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_replies_in_order_then_sticky() {
        let transport = ScriptedTransport::new()
            .on_read(Reply::json(json!({ "status": "LOADING" })))
            .on_read(Reply::json(json!({ "status": "IN_PROGRESS" })));

        let first = transport.send(Method::GET, "reservations/r-1", None).await.unwrap();
        let second = transport.send(Method::GET, "reservations/r-1", None).await.unwrap();
        let third = transport.send(Method::GET, "reservations/r-1", None).await.unwrap();

        assert!(first.starts_with(b"{\"status\":\"LOADING\""));
        assert_eq!(second, third);
        assert_eq!(transport.count(&Method::GET), 3);
    }

    #[tokio::test]
    async fn test_unscripted_method_is_not_found() {
        let transport = ScriptedTransport::new();
        let err = transport
            .send(Method::DELETE, "reservations/missing", None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(transport.requests()[0].path, "reservations/missing");
    }
}
