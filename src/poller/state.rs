//! Published poll state and the gate that guards it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// What a view reads from its poller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollState<T> {
    /// Latest result, or the default shape if that cycle failed.
    pub data: Option<T>,
    /// True until the first cycle completes.
    pub loading: bool,
    /// Error from the most recent cycle, cleared by the next success.
    pub last_error: Option<String>,
    /// Cycle that produced `data`.
    pub cycle: u64,
    pub updated_at: Option<DateTime<Utc>>,
    /// Results dropped because a newer cycle had already published.
    pub superseded: u64,
}

impl<T> Default for PollState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: true,
            last_error: None,
            cycle: 0,
            updated_at: None,
            superseded: 0,
        }
    }
}

/// Owns the watch sender. The check against the stopped flag and the last
/// published cycle happens under the same lock as the send.
pub(crate) struct Publisher<T> {
    name: String,
    inner: Mutex<Gate<T>>,
}

struct Gate<T> {
    /// `None` once the poller is stopped.
    tx: Option<watch::Sender<PollState<T>>>,
    last_cycle: u64,
    superseded: u64,
}

impl<T: Default> Publisher<T> {
    pub(crate) fn new(name: &str, tx: watch::Sender<PollState<T>>) -> Self {
        Self {
            name: name.to_string(),
            inner: Mutex::new(Gate {
                tx: Some(tx),
                last_cycle: 0,
                superseded: 0,
            }),
        }
    }

    /// Publish the outcome of `cycle`. Returns false if it was discarded.
    pub(crate) fn publish<E: fmt::Display>(&self, cycle: u64, outcome: Result<T, E>) -> bool {
        let mut gate = self.lock();

        if gate.tx.is_none() {
            tracing::debug!("Poller {}: dropping cycle {} after stop", self.name, cycle);
            return false;
        }

        if cycle <= gate.last_cycle {
            gate.superseded += 1;
            tracing::debug!(
                "Poller {}: dropping cycle {}, cycle {} already published",
                self.name,
                cycle,
                gate.last_cycle
            );
            return false;
        }

        let (data, last_error) = match outcome {
            Ok(data) => (data, None),
            Err(e) => {
                tracing::warn!("Poller {}: cycle {} failed: {}", self.name, cycle, e);
                (T::default(), Some(e.to_string()))
            }
        };

        gate.last_cycle = cycle;
        let superseded = gate.superseded;
        if let Some(tx) = gate.tx.as_ref() {
            tx.send_replace(PollState {
                data: Some(data),
                loading: false,
                last_error,
                cycle,
                updated_at: Some(Utc::now()),
                superseded,
            });
        }
        true
    }
}

impl<T> Publisher<T> {
    /// Close the gate. Returns true on the first call only.
    pub(crate) fn close(&self) -> bool {
        let closed = self.lock().tx.take().is_some();
        if closed {
            tracing::info!("Poller {}: stopping", self.name);
        }
        closed
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.lock().tx.is_none()
    }

    fn lock(&self) -> MutexGuard<'_, Gate<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
