//! The controller owns one state tree and tells an observer about every mutation.
//!
//! A `Controller` is not synchronized. Callers that share one across requests put it
//! behind a lock so each setter's read-modify-write stays atomic.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;

use crate::error::AppError;

/// Wire tag for state snapshots pushed to subscribers.
pub const STATE_UPDATE: &str = "state_update";

/// Receives the full state after every successful mutation.
///
/// Implementations must not block: the controller calls this inline and ignores whatever
/// happens downstream.
pub trait StateObserver<T>: Send + Sync {
    fn state_changed(&self, state: &T);
}

impl<T, F> StateObserver<T> for F
where
    F: Fn(&T) + Send + Sync,
{
    fn state_changed(&self, state: &T) {
        self(state);
    }
}

/// A snapshot as published to subscribers: `{"type": "state_update", "state": {...}}`.
#[derive(Debug, Clone, Serialize)]
pub struct StateUpdate {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub state: serde_json::Value,
}

impl StateUpdate {
    pub fn of<T: Serialize>(state: &T) -> Self {
        Self {
            kind: STATE_UPDATE,
            state: serde_json::to_value(state).unwrap_or(serde_json::Value::Null),
        }
    }
}

/// Publishes snapshots on a broadcast channel. Sending with no live receivers is not an
/// error worth reporting.
#[derive(Clone)]
pub struct SnapshotBroadcaster {
    tx: broadcast::Sender<StateUpdate>,
}

impl SnapshotBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateUpdate> {
        self.tx.subscribe()
    }
}

impl<T: Serialize> StateObserver<T> for SnapshotBroadcaster {
    fn state_changed(&self, state: &T) {
        if self.tx.send(StateUpdate::of(state)).is_err() {
            tracing::trace!("state update dropped, no subscribers");
        }
    }
}

pub struct Controller<T> {
    state: T,
    observer: Option<Arc<dyn StateObserver<T>>>,
}

impl<T: Default> Default for Controller<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Controller<T> {
    pub fn new(state: T) -> Self {
        Self {
            state,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn StateObserver<T>>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn set_observer(&mut self, observer: Option<Arc<dyn StateObserver<T>>>) {
        self.observer = observer;
    }

    /// Read-only view. Never notifies.
    pub fn state(&self) -> &T {
        &self.state
    }

    /// Apply a mutation, then notify.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        let out = f(&mut self.state);
        self.notify();
        out
    }

    /// Apply a fallible mutation. The observer only hears about `Ok`; on `Err` the closure
    /// must have left the state untouched.
    pub fn try_update<R>(
        &mut self,
        f: impl FnOnce(&mut T) -> Result<R, AppError>,
    ) -> Result<R, AppError> {
        let out = f(&mut self.state)?;
        self.notify();
        Ok(out)
    }

    fn notify(&self) {
        if let Some(observer) = &self.observer {
            observer.state_changed(&self.state);
        }
    }
}

impl<T: Serialize> Controller<T> {
    /// Full state as plain JSON, enum values rendered as their labels.
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(&self.state).unwrap_or(serde_json::Value::Null)
    }
}
