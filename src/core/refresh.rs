//! Periodic ceiling refresh.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;

use super::{AdmissionError, Ceiling, CeilingHandle};

/// Abstraction for spawning background work on a runtime.
pub trait Spawn {
    /// Spawn an async task that returns a future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Where refreshed ceiling values come from.
#[async_trait]
pub trait CeilingSource: Send + Sync + 'static {
    /// Fetch the current configured ceiling.
    async fn fetch_ceiling(&self) -> Result<Ceiling, AdmissionError>;
}

/// Reads the ceiling from an environment variable on every fetch.
#[derive(Debug, Clone)]
pub struct EnvCeilingSource {
    var: String,
}

impl EnvCeilingSource {
    /// Read from `var`.
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait]
impl CeilingSource for EnvCeilingSource {
    async fn fetch_ceiling(&self) -> Result<Ceiling, AdmissionError> {
        let raw = std::env::var(&self.var).ok();
        crate::config::parse_ceiling(&self.var, raw.as_deref())
    }
}

/// Fetch once and store the value if it is valid.
///
/// On failure the previous ceiling stays in force.
pub async fn refresh_once<C>(handle: &CeilingHandle, source: &C) -> Result<Ceiling, AdmissionError>
where
    C: CeilingSource + ?Sized,
{
    let fetched = source.fetch_ceiling().await;
    let stored = fetched.and_then(|ceiling| handle.set(ceiling).map(|previous| (previous, ceiling)));
    match stored {
        Ok((previous, ceiling)) => {
            if previous != ceiling {
                tracing::info!("ceiling refreshed: {} -> {}", previous, ceiling);
            }
            Ok(ceiling)
        }
        Err(err) => {
            tracing::warn!("ceiling refresh failed, keeping {}: {}", handle.get(), err);
            Err(err)
        }
    }
}

/// Background task that re-reads the ceiling on an interval.
///
/// Polling stops when the refresher is dropped or [`Self::shutdown`] is
/// called. Binding it to `_` stops it immediately; hold it for as long as
/// the ceiling should follow its source.
#[must_use = "the refresher stops polling when dropped"]
pub struct CeilingRefresher {
    stop: Arc<Notify>,
}

impl CeilingRefresher {
    /// Start polling `source` every `interval` and storing into `handle`.
    ///
    /// The first fetch happens one interval after spawning; the ceiling given
    /// at construction is already current.
    #[must_use = "the refresher stops polling when dropped"]
    pub fn spawn<C, S>(handle: CeilingHandle, source: C, interval: Duration, spawner: &S) -> Self
    where
        C: CeilingSource,
        S: Spawn,
    {
        let stop = Arc::new(Notify::new());
        let stopped = Arc::clone(&stop);
        let interval = interval.max(Duration::from_millis(1));

        spawner.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                tokio::select! {
                    () = stopped.notified() => {
                        tracing::debug!("ceiling refresher shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        let _ = refresh_once(&handle, &source).await;
                    }
                }
            }
        });

        Self { stop }
    }

    /// Stop polling. Safe to call more than once.
    pub fn shutdown(&self) {
        self.stop.notify_one();
    }
}

impl Drop for CeilingRefresher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
