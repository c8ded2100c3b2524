use std::cell::Cell;

use chatline::chat::typing::partner_typing;
use chatline::{ChatState, Command};
use gtk4 as gtk;
use gtk4::prelude::*;
use tokio::sync::mpsc::UnboundedSender;

pub struct ChatView {
    root: gtk::Box,
    title: gtk::Label,
    typing: gtk::Label,
    scroller: gtk::ScrolledWindow,
    messages_box: gtk::Box,
    entry: gtk::Entry,
    input_row: gtk::Box,
    rendered: Cell<usize>,
    conversation: Cell<Option<u64>>,
    had_draft: Cell<bool>,
}

impl ChatView {
    pub fn new(commands: UnboundedSender<Command>) -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);

        // Header: partner name, typing hint, close
        let header = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        let heading = gtk::Box::new(gtk::Orientation::Vertical, 2);
        heading.set_hexpand(true);
        let title = gtk::Label::new(Some("No conversation selected"));
        title.add_css_class("heading");
        title.set_halign(gtk::Align::Start);
        let typing = gtk::Label::new(Some("Typing..."));
        typing.add_css_class("dim-label");
        typing.set_halign(gtk::Align::Start);
        typing.set_visible(false);
        heading.append(&title);
        heading.append(&typing);
        let close_btn = gtk::Button::with_label("Close");
        header.append(&heading);
        header.append(&close_btn);
        root.append(&header);

        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .hexpand(true)
            .build();
        let messages_box = gtk::Box::new(gtk::Orientation::Vertical, 6);
        scroller.set_child(Some(&messages_box));
        root.append(&scroller);

        // Input row
        let input_row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        let entry = gtk::Entry::new();
        entry.set_hexpand(true);
        entry.set_placeholder_text(Some("Type here"));
        let send_btn = gtk::Button::with_label("Send");
        send_btn.add_css_class("suggested-action");
        input_row.append(&entry);
        input_row.append(&send_btn);
        root.append(&input_row);

        {
            let commands = commands.clone();
            entry.connect_changed(move |e| {
                let _ = commands.send(Command::Draft(e.text().to_string()));
            });
        }
        {
            let commands = commands.clone();
            send_btn.connect_clicked(move |_| {
                let _ = commands.send(Command::Submit);
            });
        }
        {
            let commands = commands.clone();
            entry.connect_activate(move |_| {
                let _ = commands.send(Command::Submit);
            });
        }
        close_btn.connect_clicked(move |_| {
            let _ = commands.send(Command::CloseChat);
        });

        Self {
            root,
            title,
            typing,
            scroller,
            messages_box,
            entry,
            input_row,
            rendered: Cell::new(0),
            conversation: Cell::new(None),
            had_draft: Cell::new(false),
        }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn render(&self, state: &ChatState) {
        let open = state.chat_selected && state.receiver.is_some();
        match state.receiver.as_ref().filter(|_| open) {
            Some(receiver) => self.title.set_label(&receiver.name),
            None => self.title.set_label("No conversation selected"),
        }
        self.typing.set_visible(open && partner_typing(state));
        self.scroller.set_visible(open);
        self.input_row.set_sensitive(open);

        // Snapshots coalesce, so a new conversation can arrive already longer
        // than the one on screen. Start over whenever the epoch moves.
        let fresh_view = self.conversation.get() != Some(state.conversation);
        if fresh_view || state.messages.len() < self.rendered.get() {
            while let Some(child) = self.messages_box.first_child() {
                self.messages_box.remove(&child);
            }
            self.rendered.set(0);
            self.conversation.set(Some(state.conversation));
        }
        let me = state.user_id();
        let fresh = &state.messages[self.rendered.get()..];
        for message in fresh {
            let lbl = gtk::Label::new(Some(&message.message));
            lbl.set_wrap(true);
            let mine = me.is_some_and(|id| id == message.sender_id);
            lbl.set_halign(if mine { gtk::Align::End } else { gtk::Align::Start });
            self.messages_box.append(&lbl);
        }
        if !fresh.is_empty() {
            self.rendered.set(state.messages.len());
            let scroller = self.scroller.clone();
            glib::idle_add_local_once(move || {
                let adj = scroller.vadjustment();
                adj.set_value(adj.upper());
            });
        }

        // Only follow the store when it cleared the draft, so typing ahead of
        // a stale snapshot is never overwritten.
        if state.draft.is_empty() && self.had_draft.get() && !self.entry.text().is_empty() {
            self.entry.set_text("");
        }
        self.had_draft.set(!state.draft.is_empty());
    }
}
