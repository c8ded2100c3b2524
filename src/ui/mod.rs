pub mod chat_view;
pub mod main_window;
pub mod sidebar;

use std::future::Future;

use once_cell::sync::Lazy;

pub static RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime")
});

/// Run `fut` on the tokio runtime, then hand its output to `done` on the
/// GTK main loop.
pub fn run_async_to_main<T, Fut, F>(fut: Fut, done: F)
where
    T: Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
    F: FnOnce(T) + 'static,
{
    let handle = RUNTIME.spawn(fut);
    glib::MainContext::default().spawn_local(async move {
        match handle.await {
            Ok(value) => done(value),
            Err(e) => log::error!("background task failed: {}", e),
        }
    });
}
