//! Transient notifications ("toasts") raised by the chat session.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub text: String,
}

impl Notification {
    pub fn success(text: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Success, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Error, text: text.into() }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Info, text: text.into() }
    }
}

pub trait Notifier: Send + 'static {
    fn notify(&self, notification: Notification);
}

/// Forwards to whoever renders toasts. A closed receiver just drops them.
impl Notifier for mpsc::UnboundedSender<Notification> {
    fn notify(&self, notification: Notification) {
        if self.send(notification).is_err() {
            log::debug!("notification dropped, no toast overlay listening");
        }
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    entries: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Notification> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, notification: Notification) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_notifier_forwards_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.notify(Notification::info("Not signed in"));
        tx.notify(Notification::error("An error occurred"));
        assert_eq!(rx.recv().await.unwrap().kind, NotificationKind::Info);
        assert_eq!(rx.recv().await.unwrap(), Notification::error("An error occurred"));

        drop(rx);
        tx.notify(Notification::success("dropped quietly"));
    }
}
