//! The view-model store.
//!
//! `ChatState` is owned by a single [`Store`], which is owned by a single
//! session. The only way to change it is [`Store::dispatch`]. Views get
//! immutable snapshots through a `watch` channel.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::api::models::{ChatMessage, Receiver, TypingSignal, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatState {
    pub user: Option<User>,
    pub token: Option<String>,
    pub receiver: Option<Receiver>,
    /// Whether the chat pane is open. Closing it keeps the receiver.
    pub chat_selected: bool,
    pub messages: Vec<ChatMessage>,
    /// Local input buffer.
    pub draft: String,
    pub typing: bool,
    pub typer: Option<TypingSignal>,
    pub theme: Theme,
    /// Bumped whenever the message list starts over for a new conversation
    /// view, so a renderer can tell a fresh list from a grown one.
    pub conversation: u64,
}

impl ChatState {
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }

    pub fn receiver_id(&self) -> Option<&str> {
        self.receiver.as_ref().map(|r| r.id.as_str())
    }

    fn start_conversation(&mut self, receiver: Option<Receiver>) {
        self.receiver = receiver;
        self.chat_selected = self.receiver.is_some();
        self.messages.clear();
        self.typer = None;
        self.typing = false;
        self.conversation = self.conversation.wrapping_add(1);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Login { user: User, token: Option<String> },
    Logout,
    SelectReceiver(Receiver),
    CloseChat,
    AppendMessage(ChatMessage),
    SetDraft(String),
    ClearDraft,
    SetTyping(bool),
    SetTyper(Option<TypingSignal>),
    SetTheme(Theme),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Login { .. } => "login",
            Action::Logout => "logout",
            Action::SelectReceiver(_) => "select_receiver",
            Action::CloseChat => "close_chat",
            Action::AppendMessage(_) => "append_message",
            Action::SetDraft(_) => "set_draft",
            Action::ClearDraft => "clear_draft",
            Action::SetTyping(_) => "set_typing",
            Action::SetTyper(_) => "set_typer",
            Action::SetTheme(_) => "set_theme",
        }
    }
}

/// Apply `action` to `state`. Returns whether anything changed.
///
/// Messages are only ever appended. The list is emptied when a different
/// receiver or user starts a new conversation view.
pub fn reduce(state: &mut ChatState, action: Action) -> bool {
    match action {
        Action::Login { user, token } => {
            if state.user.as_ref() == Some(&user) && state.token == token {
                return false;
            }
            if state.user_id() != Some(user.id.as_str()) {
                state.start_conversation(None);
            }
            state.user = Some(user);
            state.token = token;
            true
        }
        Action::Logout => {
            let cleared = ChatState {
                theme: state.theme,
                conversation: state.conversation,
                ..ChatState::default()
            };
            if *state == cleared {
                return false;
            }
            *state = ChatState { conversation: state.conversation.wrapping_add(1), ..cleared };
            true
        }
        Action::SelectReceiver(receiver) => {
            if state.receiver_id() == Some(receiver.id.as_str()) {
                let changed = !state.chat_selected || state.receiver.as_ref() != Some(&receiver);
                state.receiver = Some(receiver);
                state.chat_selected = true;
                changed
            } else {
                state.start_conversation(Some(receiver));
                true
            }
        }
        Action::CloseChat => std::mem::replace(&mut state.chat_selected, false),
        Action::AppendMessage(message) => {
            state.messages.push(message);
            true
        }
        Action::SetDraft(text) => {
            if state.draft == text {
                return false;
            }
            state.draft = text;
            true
        }
        Action::ClearDraft => {
            let changed = !state.draft.is_empty();
            state.draft.clear();
            changed
        }
        Action::SetTyping(on) => std::mem::replace(&mut state.typing, on) != on,
        Action::SetTyper(typer) => {
            if state.typer == typer {
                return false;
            }
            state.typer = typer;
            true
        }
        Action::SetTheme(theme) => std::mem::replace(&mut state.theme, theme) != theme,
    }
}

pub struct Store {
    state: ChatState,
    snapshots: watch::Sender<Arc<ChatState>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(ChatState::default())
    }
}

impl Store {
    pub fn new(state: ChatState) -> Self {
        let (snapshots, _) = watch::channel(Arc::new(state.clone()));
        Self { state, snapshots }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) -> bool {
        let name = action.name();
        let changed = reduce(&mut self.state, action);
        log::debug!("store: {} ({})", name, if changed { "changed" } else { "no-op" });
        if changed {
            self.snapshots.send_replace(Arc::new(self.state.clone()));
        }
        changed
    }

    /// Snapshots published after every state change.
    pub fn watch(&self) -> watch::Receiver<Arc<ChatState>> {
        self.snapshots.subscribe()
    }
}
