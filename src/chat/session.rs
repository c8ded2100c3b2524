use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::sync::{mpsc, watch};

use crate::api::client::MessageApi;
use crate::api::models::{ChatMessage, Receiver, TypingSignal, User};
use crate::chat::dispatch::{MessageDispatch, PendingSend, SendOutcome};
use crate::chat::presence::PresenceAnnouncer;
use crate::notify::{Notification, Notifier};
use crate::store::{Action, ChatState, Store, Theme};
use crate::transport::Transport;

/// What a view can ask of the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login { user: User, token: Option<String> },
    Logout,
    SelectReceiver(Receiver),
    CloseChat,
    Draft(String),
    Submit,
    SetTheme(Theme),
    Typing { signal: Option<TypingSignal>, active: bool },
}

/// Owns the store and every component that writes to it.
pub struct ChatSession<T, A, N> {
    store: Store,
    dispatch: MessageDispatch<T, A>,
    presence: PresenceAnnouncer<T>,
    notifier: N,
}

impl<T: Transport, A: MessageApi, N: Notifier> ChatSession<T, A, N> {
    pub fn new(transport: Arc<T>, api: Arc<A>, notifier: N) -> Self {
        Self::with_state(transport, api, notifier, ChatState::default())
    }

    pub fn with_state(transport: Arc<T>, api: Arc<A>, notifier: N, state: ChatState) -> Self {
        let dispatch = MessageDispatch::mount(Arc::clone(&transport), api);
        let mut presence = PresenceAnnouncer::new(transport);
        presence.observe(state.user.as_ref());
        Self { store: Store::new(state), dispatch, presence, notifier }
    }

    pub fn state(&self) -> &ChatState {
        self.store.state()
    }

    pub fn watch(&self) -> watch::Receiver<Arc<ChatState>> {
        self.store.watch()
    }

    pub fn dispatch(&self) -> &MessageDispatch<T, A> {
        &self.dispatch
    }

    /// Apply one command. A successful submit has already been broadcast
    /// when this returns; the caller drives the returned persistence call.
    pub fn handle(&mut self, command: Command) -> Option<PendingSend<A>> {
        let pending = match command {
            Command::Submit => match self.dispatch.submit(self.store.state()) {
                Ok(pending) => {
                    self.store.dispatch(Action::ClearDraft);
                    self.store.dispatch(Action::SetTyping(false));
                    Some(pending)
                }
                Err(e) => {
                    log::debug!("submit rejected: {}", e);
                    self.notifier.notify(Notification::error(e.to_string()));
                    None
                }
            },
            Command::Login { user, token } => {
                self.store.dispatch(Action::Login { user, token });
                None
            }
            Command::Logout => {
                self.store.dispatch(Action::Logout);
                None
            }
            Command::SelectReceiver(receiver) => {
                self.store.dispatch(Action::SelectReceiver(receiver));
                None
            }
            Command::CloseChat => {
                self.store.dispatch(Action::CloseChat);
                None
            }
            Command::Draft(text) => {
                // the typing flag tracks whether the input box holds anything
                let typing = !text.is_empty();
                self.store.dispatch(Action::SetDraft(text));
                self.store.dispatch(Action::SetTyping(typing));
                None
            }
            Command::SetTheme(theme) => {
                self.store.dispatch(Action::SetTheme(theme));
                None
            }
            Command::Typing { signal, active } => {
                self.store.dispatch(Action::SetTyper(signal));
                self.store.dispatch(Action::SetTyping(active));
                None
            }
        };
        self.presence.observe(self.store.state().user.as_ref());
        pending
    }

    pub fn receive(&mut self, message: ChatMessage) {
        self.store.dispatch(Action::AppendMessage(message));
    }

    /// Append everything that already arrived, without waiting.
    pub fn drain_inbound(&mut self) -> usize {
        let mut appended = 0;
        while let Some(message) = self.dispatch.try_next_inbound() {
            self.receive(message);
            appended += 1;
        }
        appended
    }

    pub fn complete(&mut self, outcome: SendOutcome) {
        let notification = self.dispatch.finish(&outcome);
        self.notifier.notify(notification);
    }

    /// Cooperative loop: commands, inbound broadcasts and persistence
    /// results are handled one at a time. Returns once the command channel
    /// closes and every persistence call has resolved.
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let mut in_flight: FuturesUnordered<BoxFuture<'static, SendOutcome>> = FuturesUnordered::new();
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => {
                        if let Some(pending) = self.handle(command) {
                            in_flight.push(Box::pin(pending.run()));
                        }
                    }
                    None => break,
                },
                Some(message) = self.dispatch.next_inbound() => self.receive(message),
                Some(outcome) = in_flight.next(), if !in_flight.is_empty() => self.complete(outcome),
            }
        }
        while let Some(outcome) = in_flight.next().await {
            self.complete(outcome);
        }
        log::debug!("chat session stopped");
    }
}
