#![allow(dead_code)]

use std::future::Future;
use std::sync::{Arc, Mutex};

use chatline::api::models::{ChatMessage, Receiver, SendMessageResponse, User};
use chatline::api::MessageApi;
use chatline::error::{ApiError, TransportError};
use chatline::transport::{EventRegistry, Subscription, Transport};
use serde_json::Value;
use tokio::sync::{oneshot, Mutex as AsyncMutex};

/// In-memory transport: records emits, and lets the test play the server.
#[derive(Default)]
pub struct FakeTransport {
    pub registry: EventRegistry,
    emitted: Mutex<Vec<(String, Value)>>,
    /// Broadcast every `sendMsg` back, like the chat server does.
    pub echo: bool,
}

impl FakeTransport {
    pub fn echoing() -> Self {
        Self { echo: true, ..Self::default() }
    }

    pub fn emitted(&self) -> Vec<(String, Value)> {
        self.emitted.lock().unwrap().clone()
    }

    pub fn emitted_on(&self, event: &str) -> Vec<Value> {
        self.emitted().into_iter().filter(|(e, _)| e == event).map(|(_, v)| v).collect()
    }

    pub fn inject(&self, event: &str, payload: Value) -> usize {
        self.registry.deliver(event, &payload)
    }
}

impl Transport for FakeTransport {
    fn emit(&self, event: &str, payload: Value) -> Result<(), TransportError> {
        self.emitted.lock().unwrap().push((event.to_string(), payload.clone()));
        if self.echo && event == "sendMsg" {
            self.registry.deliver(event, &payload);
        }
        Ok(())
    }

    fn on(&self, event: &str) -> Subscription {
        self.registry.subscribe(event)
    }
}

type Reply = Result<SendMessageResponse, ApiError>;

/// Scripted backend. Each call takes the next queued reply; a call with no
/// reply queued waits until the test releases it through a gate.
#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<(ChatMessage, Option<String>)>>,
    replies: Mutex<Vec<Reply>>,
    gates: AsyncMutex<Vec<oneshot::Receiver<Reply>>>,
}

impl FakeApi {
    pub fn replying(replies: Vec<Reply>) -> Self {
        let mut replies = replies;
        replies.reverse();
        Self { replies: Mutex::new(replies), ..Self::default() }
    }

    /// The next call blocks until the returned sender fires.
    pub async fn gate(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().await.push(rx);
        tx
    }

    pub fn calls(&self) -> Vec<(ChatMessage, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl MessageApi for FakeApi {
    fn send_message(
        &self,
        payload: &ChatMessage,
        token: Option<&str>,
    ) -> impl Future<Output = Result<SendMessageResponse, ApiError>> + Send {
        self.calls.lock().unwrap().push((payload.clone(), token.map(str::to_string)));
        let queued = self.replies.lock().unwrap().pop();
        async move {
            if let Some(reply) = queued {
                return reply;
            }
            let gate = self.gates.lock().await.pop();
            match gate {
                Some(rx) => rx.await.unwrap_or(Err(ApiError::Status(599))),
                None => Ok(ok("Message sent")),
            }
        }
    }
}

pub fn ok(message: &str) -> SendMessageResponse {
    SendMessageResponse { success: true, message: message.into() }
}

pub fn rejected(message: &str) -> SendMessageResponse {
    SendMessageResponse { success: false, message: message.into() }
}

pub fn user(id: &str) -> User {
    User { id: id.into(), name: format!("user {id}"), email: None }
}

pub fn receiver(id: &str) -> Receiver {
    Receiver { id: id.into(), name: format!("receiver {id}") }
}
