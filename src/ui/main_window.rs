use std::rc::Rc;
use std::sync::Arc;

use adw::prelude::*;
use adw::Application;
use chatline::api::ApiClient;
use chatline::notify::{Notification, NotificationKind, Notifier};
use chatline::{ChatSession, ChatState, Command, Settings, SocketClient, Theme, TransportError};
use tokio::sync::{mpsc, watch};

use crate::ui::chat_view::ChatView;
use crate::ui::sidebar::Sidebar;

pub fn show_main_window(app: &Application) {
    let settings = Settings::load();
    apply_theme(settings.theme);

    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Chatline")
        .default_width(960)
        .default_height(640)
        .build();

    let overlay = adw::ToastOverlay::new();
    let (commands, commands_rx) = mpsc::unbounded_channel::<Command>();

    let split = gtk4::Paned::new(gtk4::Orientation::Horizontal);
    let sidebar = Rc::new(Sidebar::new(commands.clone()));
    sidebar.set_items(settings.contacts.clone());
    split.set_start_child(Some(&sidebar.widget()));
    split.set_shrink_start_child(false);

    let chat = Rc::new(ChatView::new(commands.clone()));
    split.set_end_child(Some(&chat.widget()));
    overlay.set_child(Some(&split));

    let container = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    let title = gtk4::Label::new(Some("Chatline"));
    header.set_title_widget(Some(&title));

    let theme_btn = gtk4::Button::with_label("Toggle theme");
    header.pack_end(&theme_btn);
    container.append(&header);
    container.append(&overlay);
    window.set_content(Some(&container));
    window.present();

    {
        let commands = commands.clone();
        theme_btn.connect_clicked(move |_| {
            let theme = if adw::StyleManager::default().is_dark() { Theme::Light } else { Theme::Dark };
            let _ = commands.send(Command::SetTheme(theme));
            let mut st = Settings::load();
            st.theme = theme;
            if let Err(e) = st.save() {
                log::warn!("Failed to save settings: {}", e);
            }
        });
    }

    let (toasts, toasts_rx) = mpsc::unbounded_channel::<Notification>();
    show_toasts(overlay.clone(), toasts_rx);

    if settings.session.is_none() {
        let path = Settings::path().map(|p| p.display().to_string()).unwrap_or_default();
        toasts.notify(Notification::info(format!("Not signed in. Add a [session] to {}", path)));
    }

    let base_url = settings.base_url.clone();
    let initial = settings.initial_state();
    let overlay_clone = overlay.clone();
    crate::ui::run_async_to_main(
        async move {
            let transport = Arc::new(SocketClient::connect(&base_url).await?);
            let api = Arc::new(ApiClient::new(&base_url));
            let session = ChatSession::with_state(transport, api, toasts, initial);
            let snapshots = session.watch();
            tokio::spawn(session.run(commands_rx));
            Ok::<_, TransportError>(snapshots)
        },
        move |res| match res {
            Ok(snapshots) => follow_store(snapshots, chat, sidebar),
            Err(err) => {
                log::error!("Could not connect: {}", err);
                overlay_clone.add_toast(adw::Toast::new(&format!("Could not connect: {}", err)));
            }
        },
    );
}

fn apply_theme(theme: Theme) {
    let scheme = match theme {
        Theme::Light => adw::ColorScheme::ForceLight,
        Theme::Dark => adw::ColorScheme::ForceDark,
    };
    adw::StyleManager::default().set_color_scheme(scheme);
}

/// Re-render on every published snapshot.
fn follow_store(mut snapshots: watch::Receiver<Arc<ChatState>>, chat: Rc<ChatView>, sidebar: Rc<Sidebar>) {
    glib::MainContext::default().spawn_local(async move {
        loop {
            let state = snapshots.borrow_and_update().clone();
            apply_theme(state.theme);
            chat.render(&state);
            sidebar.highlight(state.receiver_id().filter(|_| state.chat_selected));
            if snapshots.changed().await.is_err() {
                break;
            }
        }
    });
}

fn show_toasts(overlay: adw::ToastOverlay, mut notifications: mpsc::UnboundedReceiver<Notification>) {
    glib::MainContext::default().spawn_local(async move {
        while let Some(notification) = notifications.recv().await {
            let toast = adw::Toast::new(&notification.text);
            if notification.kind == NotificationKind::Error {
                toast.set_priority(adw::ToastPriority::High);
            }
            overlay.add_toast(toast);
        }
    });
}
