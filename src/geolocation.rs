//! Device position tracking.
//!
//! [`GeolocationWatcher`] subscribes to a [`LocationProvider`] and keeps the
//! latest fix in a `watch` channel. Stopping (or dropping) the watcher clears
//! the subscription; a callback the provider still delivers afterwards is
//! ignored.

use crate::alert::AlertSink;
use crate::constants::{FALLBACK_LAT, FALLBACK_LON};
use crate::models::Coordinates;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeolocationErrorKind {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeolocationError {
    pub kind: GeolocationErrorKind,
    pub message: String,
}

impl GeolocationError {
    pub fn new(kind: GeolocationErrorKind, message: impl Into<String>) -> Self {
        GeolocationError {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for GeolocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

pub type PositionResult = std::result::Result<Coordinates, GeolocationError>;
pub type PositionCallback = Box<dyn Fn(PositionResult) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub u64);

/// Source of continuous position updates.
pub trait LocationProvider: Send + Sync {
    fn watch_position(&self, callback: PositionCallback) -> WatchId;
    fn clear_watch(&self, id: WatchId);
}

/// Position the watcher reports before the first fix.
pub fn fallback_position() -> Coordinates {
    Coordinates {
        lat: FALLBACK_LAT,
        lon: FALLBACK_LON,
    }
}

pub struct GeolocationWatcher {
    provider: Arc<dyn LocationProvider>,
    watch_id: Option<WatchId>,
    active: Arc<AtomicBool>,
    position: Arc<watch::Sender<Coordinates>>,
}

impl GeolocationWatcher {
    /// Subscribe to `provider`. Errors of every kind are passed to `alerts`
    /// with the platform message.
    pub fn start(provider: Arc<dyn LocationProvider>, alerts: Arc<dyn AlertSink>) -> Self {
        let (tx, _rx) = watch::channel(fallback_position());
        let position = Arc::new(tx);
        let active = Arc::new(AtomicBool::new(true));

        let callback: PositionCallback = {
            let position = position.clone();
            let active = active.clone();
            Box::new(move |result| {
                if !active.load(Ordering::SeqCst) {
                    tracing::debug!("Dropping position update delivered after teardown");
                    return;
                }
                match result {
                    Ok(coords) => {
                        position.send_replace(coords);
                    }
                    // TODO: permission-denied is reported like any transient failure;
                    // it should stop the watch instead of alerting on every retry
                    Err(e) => alerts.alert(&e.message),
                }
            })
        };

        let watch_id = provider.watch_position(callback);
        tracing::debug!("Started geolocation watch {:?}", watch_id);

        GeolocationWatcher {
            provider,
            watch_id: Some(watch_id),
            active,
            position,
        }
    }

    /// Latest known position (the fallback until a fix arrives).
    pub fn current(&self) -> Coordinates {
        *self.position.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Coordinates> {
        self.position.subscribe()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Unsubscribe. Idempotent.
    pub fn stop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(id) = self.watch_id.take() {
            self.provider.clear_watch(id);
            tracing::debug!("Cleared geolocation watch {:?}", id);
        }
    }
}

impl Drop for GeolocationWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Provider driven by explicit [`push`](ManualLocationProvider::push) calls,
/// for embedding hosts that receive fixes from elsewhere.
#[derive(Default)]
pub struct ManualLocationProvider {
    next_id: AtomicU64,
    watchers: Mutex<HashMap<WatchId, Arc<PositionCallback>>>,
}

impl ManualLocationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a fix or an error to every active watch.
    pub fn push(&self, result: PositionResult) {
        let callbacks: Vec<Arc<PositionCallback>> = match self.watchers.lock() {
            Ok(w) => w.values().cloned().collect(),
            Err(_) => return,
        };
        for callback in callbacks {
            callback(result.clone());
        }
    }

    pub fn watcher_count(&self) -> usize {
        self.watchers.lock().map(|w| w.len()).unwrap_or(0)
    }
}

impl LocationProvider for ManualLocationProvider {
    fn watch_position(&self, callback: PositionCallback) -> WatchId {
        let id = WatchId(self.next_id.fetch_add(1, Ordering::Relaxed));
        if let Ok(mut watchers) = self.watchers.lock() {
            watchers.insert(id, Arc::new(callback));
        }
        id
    }

    fn clear_watch(&self, id: WatchId) {
        if let Ok(mut watchers) = self.watchers.lock() {
            watchers.remove(&id);
        }
    }
}
