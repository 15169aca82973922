use std::time::Duration;

use tokio::runtime::{Handle, TryCurrentError};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::trace;

/// Refresh cadence of time-dependent widget lines.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Recomputes a value at a fixed cadence until dropped.
///
/// The first value is computed synchronously in [`Ticker::spawn`]; later
/// values are published on every tick. Dropping the ticker cancels the
/// background task, so replacing a ticker never leaves the old one running.
#[derive(Debug)]
pub struct Ticker<T> {
    rx: watch::Receiver<T>,
    _guard: DropGuard,
}

impl<T> Ticker<T>
where
    T: Send + Sync + 'static,
{
    /// Start ticking on the current Tokio runtime.
    ///
    /// Fails without calling `compute` when there is no runtime.
    pub fn spawn<F>(period: Duration, compute: F) -> Result<Self, TryCurrentError>
    where
        F: FnMut() -> T + Send + 'static,
    {
        Ok(Self::spawn_on(&Handle::try_current()?, period, compute))
    }

    /// Start ticking on `handle`.
    pub fn spawn_on<F>(handle: &Handle, period: Duration, mut compute: F) -> Self
    where
        F: FnMut() -> T + Send + 'static,
    {
        let (tx, rx) = watch::channel(compute());
        let token = CancellationToken::new();
        let cancelled = token.clone();

        handle.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately and was covered above.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = interval.tick() => {
                        if tx.send(compute()).is_err() {
                            break;
                        }
                    }
                }
            }
            trace!("ticker stopped");
        });

        Self {
            rx,
            _guard: token.drop_guard(),
        }
    }

    /// Receiver that observes every published value.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.rx.clone()
    }
}

impl<T: Clone> Ticker<T> {
    /// Latest computed value.
    pub fn current(&self) -> T {
        self.rx.borrow().clone()
    }
}
