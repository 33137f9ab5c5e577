use glib::MainContext;
use once_cell::sync::Lazy;
use std::time::{SystemTime, UNIX_EPOCH};

pub static RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime")
});

pub fn spawn_async<F>(fut: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    RUNTIME.spawn(fut);
}

pub fn glib_channel<T: Send + 'static>() -> (glib::Sender<T>, glib::Receiver<T>) {
    MainContext::channel(glib::Priority::default())
}

/// Run a future on the tokio runtime and hand its output back to the GTK
/// main loop. The receiver fires exactly once.
pub fn run_async_to_main<T, Fut>(fut: Fut) -> glib::Receiver<T>
where
    T: Send + 'static,
    Fut: std::future::Future<Output = T> + Send + 'static,
{
    let (tx, rx) = glib_channel::<T>();
    spawn_async(async move {
        let out = fut.await;
        let _ = tx.send(out);
    });
    rx
}

pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Timestamp-derived entry id, e.g. `m-1714070512345`. Unique enough for a
/// single-user session; the UI never inserts two entries in the same tick.
pub fn entry_id(prefix: &str) -> String {
    format!("{}-{}", prefix, now_millis())
}

/// Wall-clock `HH:MM` label for chat bubbles.
pub fn clock_time() -> String {
    chrono::Local::now().format("%H:%M").to_string()
}

pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.trim_end_matches('/').to_string()
    } else {
        format!("https://{}", trimmed.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_ids_carry_their_prefix() {
        let id = entry_id("m");
        assert!(id.starts_with("m-"));
        assert!(id[2..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn normalize_url_defaults_to_https() {
        assert_eq!(normalize_url("myserver:8080"), "https://myserver:8080");
        assert_eq!(normalize_url("  http://a.b/ "), "http://a.b");
        assert_eq!(normalize_url(""), "");
    }
}
