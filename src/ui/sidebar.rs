use std::cell::RefCell;
use std::rc::Rc;

use chatline::api::models::Receiver;
use chatline::Command;
use gtk4 as gtk;
use gtk4::prelude::*;
use tokio::sync::mpsc::UnboundedSender;

pub struct Sidebar {
    root: gtk::Box,
    list: gtk::ListBox,
    items: Rc<RefCell<Vec<Receiver>>>,
}

impl Sidebar {
    pub fn new(commands: UnboundedSender<Command>) -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);
        root.set_width_request(220);

        let title = gtk::Label::new(Some("Conversations"));
        title.add_css_class("heading");
        title.set_halign(gtk::Align::Start);
        root.append(&title);

        let list = gtk::ListBox::new();
        list.set_vexpand(true);
        root.append(&list);

        let items: Rc<RefCell<Vec<Receiver>>> = Rc::default();
        {
            let items = items.clone();
            list.connect_row_activated(move |_, row| {
                let picked = usize::try_from(row.index()).ok().and_then(|i| items.borrow().get(i).cloned());
                if let Some(receiver) = picked {
                    let _ = commands.send(Command::SelectReceiver(receiver));
                }
            });
        }

        Self { root, list, items }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn set_items(&self, items: Vec<Receiver>) {
        while let Some(child) = self.list.first_child() {
            self.list.remove(&child);
        }
        for receiver in &items {
            let row = gtk::ListBoxRow::new();
            let label = gtk::Label::new(Some(&receiver.name));
            label.set_margin_top(8);
            label.set_margin_bottom(8);
            label.set_margin_start(8);
            label.set_margin_end(8);
            label.set_halign(gtk::Align::Start);
            row.set_child(Some(&label));
            self.list.append(&row);
        }
        *self.items.borrow_mut() = items;
    }

    /// Highlight the row of the selected receiver, if it is listed.
    pub fn highlight(&self, receiver_id: Option<&str>) {
        let index = receiver_id.and_then(|id| self.items.borrow().iter().position(|r| r.id == id));
        match index.and_then(|i| self.list.row_at_index(i as i32)) {
            Some(row) => self.list.select_row(Some(&row)),
            None => self.list.unselect_all(),
        }
    }
}
