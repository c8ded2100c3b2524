pub mod packet;
pub mod socket;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::TransportError;

pub use socket::SocketClient;

/// A bidirectional event channel to the chat server.
pub trait Transport: Send + Sync + 'static {
    /// Fire-and-forget. `Ok` means the event was queued, not delivered.
    fn emit(&self, event: &str, payload: Value) -> Result<(), TransportError>;

    /// Register a handler slot for `event`. Dropping the returned
    /// [`Subscription`] unregisters it.
    fn on(&self, event: &str) -> Subscription;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn emit(&self, event: &str, payload: Value) -> Result<(), TransportError> {
        (**self).emit(event, payload)
    }

    fn on(&self, event: &str) -> Subscription {
        (**self).on(event)
    }
}

#[derive(Default)]
struct Handlers {
    next_id: u64,
    by_event: HashMap<String, Vec<(u64, mpsc::UnboundedSender<Value>)>>,
}

/// Handler table shared between a transport and its subscriptions.
#[derive(Clone, Default)]
pub struct EventRegistry {
    inner: Arc<Mutex<Handlers>>,
}

fn lock(handlers: &Mutex<Handlers>) -> MutexGuard<'_, Handlers> {
    handlers.lock().unwrap_or_else(PoisonError::into_inner)
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, event: &str) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut handlers = lock(&self.inner);
        handlers.next_id += 1;
        let id = handlers.next_id;
        handlers.by_event.entry(event.to_string()).or_default().push((id, tx));
        log::debug!("subscribed to {event} (#{id})");
        Subscription {
            event: event.to_string(),
            id,
            registry: Arc::downgrade(&self.inner),
            rx,
        }
    }

    /// Hand `payload` to every live handler of `event`, in registration
    /// order. Returns how many handlers received it.
    pub fn deliver(&self, event: &str, payload: &Value) -> usize {
        let mut handlers = lock(&self.inner);
        let Some(slots) = handlers.by_event.get_mut(event) else {
            log::debug!("no handler for {event}, dropping");
            return 0;
        };
        slots.retain(|(_, tx)| tx.send(payload.clone()).is_ok());
        let delivered = slots.len();
        if slots.is_empty() {
            handlers.by_event.remove(event);
        }
        delivered
    }

    pub fn handler_count(&self, event: &str) -> usize {
        lock(&self.inner).by_event.get(event).map_or(0, Vec::len)
    }
}

/// One registered handler. Payloads arrive in receipt order.
pub struct Subscription {
    event: String,
    id: u64,
    registry: Weak<Mutex<Handlers>>,
    rx: mpsc::UnboundedReceiver<Value>,
}

impl Subscription {
    pub fn event(&self) -> &str {
        &self.event
    }

    pub async fn recv(&mut self) -> Option<Value> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Value> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(inner) = self.registry.upgrade() else { return };
        let mut handlers = lock(&inner);
        if let Some(slots) = handlers.by_event.get_mut(&self.event) {
            slots.retain(|(id, _)| *id != self.id);
            if slots.is_empty() {
                handlers.by_event.remove(&self.event);
            }
        }
        log::debug!("unsubscribed from {} (#{})", self.event, self.id);
    }
}
