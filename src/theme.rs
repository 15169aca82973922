use std::sync::Arc;

use serde::Serialize;
use strum_macros::EnumString;
use tokio::sync::watch;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

/// Document-root attribute that carries the site theme.
pub const THEME_ATTRIBUTE: &str = "data-theme";

/// Light or dark site theme.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    EnumString,
    strum_macros::Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum ColorScheme {
    Dark,
    #[default]
    Light,
}

impl ColorScheme {
    /// Dark only when the theme attribute is exactly `dark`.
    pub fn from_attribute(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }
}

/// Shared, observable theme flag.
///
/// The embedding host calls [`ThemeSignal::set_attribute`] whenever the
/// root attribute changes; widgets either read a receiver on render or
/// register an observer.
#[derive(Debug, Clone)]
pub struct ThemeSignal {
    tx: Arc<watch::Sender<ColorScheme>>,
}

impl ThemeSignal {
    pub fn new(initial: ColorScheme) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn from_attribute(value: Option<&str>) -> Self {
        Self::new(ColorScheme::from_attribute(value))
    }

    pub fn current(&self) -> ColorScheme {
        *self.tx.borrow()
    }

    /// Update from the raw attribute value. Observers are only notified
    /// when the resulting scheme actually changes.
    pub fn set_attribute(&self, value: Option<&str>) {
        self.set(ColorScheme::from_attribute(value));
    }

    pub fn set(&self, scheme: ColorScheme) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == scheme {
                false
            } else {
                *current = scheme;
                true
            }
        });
        if changed {
            debug!(%scheme, "theme changed");
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ColorScheme> {
        self.tx.subscribe()
    }

    /// Call `on_change` with the current scheme, then on every change until
    /// the returned observer is dropped. Must be called from within a Tokio
    /// runtime.
    pub fn observe<F>(&self, mut on_change: F) -> ThemeObserver
    where
        F: FnMut(ColorScheme) + Send + 'static,
    {
        let mut rx = self.subscribe();
        on_change(*rx.borrow_and_update());

        let token = CancellationToken::new();
        let cancelled = token.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let scheme = *rx.borrow_and_update();
                        on_change(scheme);
                    }
                }
            }
        });

        ThemeObserver {
            _guard: token.drop_guard(),
        }
    }
}

impl Default for ThemeSignal {
    fn default() -> Self {
        Self::new(ColorScheme::default())
    }
}

/// Registration handle returned by [`ThemeSignal::observe`]; dropping it
/// stops the observer.
#[derive(Debug)]
pub struct ThemeObserver {
    _guard: DropGuard,
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_from_attribute() {
        assert_eq!(ColorScheme::from_attribute(Some("dark")), ColorScheme::Dark);
        assert_eq!(ColorScheme::from_attribute(Some("light")), ColorScheme::Light);
        assert_eq!(ColorScheme::from_attribute(Some("Dark")), ColorScheme::Light);
        assert_eq!(ColorScheme::from_attribute(Some("sepia")), ColorScheme::Light);
        assert_eq!(ColorScheme::from_attribute(Some("")), ColorScheme::Light);
        assert_eq!(ColorScheme::from_attribute(None), ColorScheme::Light);
    }

    #[test]
    fn test_set_attribute_updates_current() {
        let signal = ThemeSignal::default();
        signal.set_attribute(Some("dark"));
        assert_eq!(signal.current(), ColorScheme::Dark);
    }

    #[tokio::test]
    async fn test_receiver_only_notified_on_change() {
        let signal = ThemeSignal::from_attribute(Some("dark"));
        let mut rx = signal.subscribe();

        signal.set_attribute(Some("dark"));
        assert!(!rx.has_changed().unwrap());

        signal.set_attribute(None);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), ColorScheme::Light);
    }

    #[tokio::test(start_paused = true)]
    async fn test_observer_follows_changes_until_dropped() {
        let signal = ThemeSignal::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let observer = signal.observe(move |scheme| sink.lock().unwrap().push(scheme));

        signal.set(ColorScheme::Dark);
        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(observer);
        tokio::time::sleep(Duration::from_millis(10)).await;
        signal.set(ColorScheme::Light);
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![ColorScheme::Light, ColorScheme::Dark]
        );
    }
}
