use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::api::client::MessageApi;
use crate::api::events::SEND_MSG;
use crate::api::models::{ChatMessage, SendMessageResponse};
use crate::error::{ApiError, ChatError, TransportError};
use crate::notify::Notification;
use crate::store::ChatState;
use crate::transport::{Subscription, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// At least one persistence call has not resolved yet.
    Sending,
}

/// Sends the draft and collects inbound `sendMsg` broadcasts.
///
/// A submit is broadcast first and persisted second. Whatever the REST call
/// returns, the broadcast stands.
pub struct MessageDispatch<T, A> {
    transport: Arc<T>,
    api: Arc<A>,
    inbound: Subscription,
    in_flight: Arc<AtomicUsize>,
}

impl<T: Transport, A: MessageApi> MessageDispatch<T, A> {
    /// Registers the `sendMsg` handler. It lives exactly as long as the
    /// dispatch view.
    pub fn mount(transport: Arc<T>, api: Arc<A>) -> Self {
        let inbound = transport.on(SEND_MSG);
        Self { transport, api, inbound, in_flight: Arc::default() }
    }

    pub fn phase(&self) -> Phase {
        if self.in_flight() == 0 { Phase::Idle } else { Phase::Sending }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Validate, broadcast, and hand back the persistence call.
    ///
    /// Validation failures touch neither the transport nor the backend.
    pub fn submit(&mut self, state: &ChatState) -> Result<PendingSend<A>, ChatError> {
        if state.draft.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let user = state.user.as_ref().ok_or(ChatError::NotSignedIn)?;
        let receiver = state.receiver.as_ref().ok_or(ChatError::NoReceiver)?;

        let payload = ChatMessage::new(state.draft.clone(), user.id.clone(), receiver.id.clone());
        let live = serde_json::to_value(&payload).map_err(TransportError::from)?;
        if let Err(e) = self.transport.emit(SEND_MSG, live) {
            log::warn!("live broadcast dropped: {}", e);
        }

        Ok(PendingSend {
            api: Arc::clone(&self.api),
            payload,
            token: state.token.clone(),
            _in_flight: InFlight::enter(&self.in_flight),
        })
    }

    /// Turn a resolved persistence call into its notification.
    pub fn finish(&self, outcome: &SendOutcome) -> Notification {
        outcome.notification()
    }

    /// Next inbound broadcast, in receipt order. Nothing is filtered: the
    /// sender's own message comes back here too.
    pub async fn next_inbound(&mut self) -> Option<ChatMessage> {
        let payload = self.inbound.recv().await?;
        Some(ChatMessage::from_payload(&payload))
    }

    pub fn try_next_inbound(&mut self) -> Option<ChatMessage> {
        self.inbound.try_recv().map(|p| ChatMessage::from_payload(&p))
    }
}

/// Counts a send as in flight until the guard is dropped, whether the call
/// ran to completion or was abandoned.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// A persistence call for a message that was already broadcast.
pub struct PendingSend<A> {
    api: Arc<A>,
    payload: ChatMessage,
    token: Option<String>,
    _in_flight: InFlight,
}

impl<A: MessageApi> PendingSend<A> {
    pub fn payload(&self) -> &ChatMessage {
        &self.payload
    }

    pub async fn run(self) -> SendOutcome {
        match self.api.send_message(&self.payload, self.token.as_deref()).await {
            Ok(resp) => SendOutcome::Persisted(resp),
            Err(e) => SendOutcome::Failed(e),
        }
    }
}

#[derive(Debug)]
pub enum SendOutcome {
    Persisted(SendMessageResponse),
    Failed(ApiError),
}

impl SendOutcome {
    pub fn notification(&self) -> Notification {
        match self {
            SendOutcome::Persisted(resp) if resp.success => Notification::success(resp.message.clone()),
            SendOutcome::Persisted(resp) => {
                log::warn!("server rejected message: {}", resp.message);
                Notification::error(resp.message.clone())
            }
            SendOutcome::Failed(e) => {
                log::warn!("persisting message failed: {}", e);
                Notification::error("An error occurred")
            }
        }
    }
}
