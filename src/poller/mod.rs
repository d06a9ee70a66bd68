//! Poller that keeps a view's data fresh.
//!
//! A poller owns one background task. Each tick runs a fetch-and-adapt
//! operation (a poll cycle) and publishes the outcome to a watch channel.
//! Stopping the poller, or dropping its handle, ends the task and closes the
//! publish gate so nothing lands after teardown.

mod state;

pub use state::PollState;

use state::Publisher;

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;

/// How often a poller runs its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// First cycle immediately, then one per period.
    Every(Duration),
    /// One cycle on start, for list and detail views.
    Once,
}

/// What happens when a tick fires while the previous cycle is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    /// Wait for the running cycle; ticks missed meanwhile are delayed.
    #[default]
    Serialize,
    /// Start a new cycle on every tick. A result older than the last
    /// published one is dropped.
    Independent,
}

impl FromStr for OverlapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serialize" => Ok(Self::Serialize),
            "independent" => Ok(Self::Independent),
            other => Err(format!("unknown overlap policy: {}", other)),
        }
    }
}

impl fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serialize => write!(f, "serialize"),
            Self::Independent => write!(f, "independent"),
        }
    }
}

/// Poller configuration. Call [`Poller::spawn`] to start it.
#[derive(Debug, Clone)]
pub struct Poller {
    name: String,
    cadence: Cadence,
    overlap: OverlapPolicy,
}

impl Poller {
    pub fn new(name: &str, cadence: Cadence) -> Self {
        Self {
            name: name.to_string(),
            cadence,
            overlap: OverlapPolicy::default(),
        }
    }

    pub fn overlap(mut self, overlap: OverlapPolicy) -> Self {
        self.overlap = overlap;
        self
    }

    /// Start polling with `op` and return the handle that owns the task.
    ///
    /// A failed cycle publishes `T::default()` together with the error
    /// message, so readers always see a complete value.
    pub fn spawn<T, E, F, Fut>(self, op: F) -> PollerHandle<T>
    where
        T: Default + Clone + Send + Sync + 'static,
        E: fmt::Display + Send + 'static,
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(PollState::default());
        let publisher = Arc::new(Publisher::new(&self.name, tx));
        let (stop_tx, _) = broadcast::channel(1);

        tracing::info!(
            "Poller {}: starting ({:?}, overlap={})",
            self.name,
            self.cadence,
            self.overlap
        );

        tokio::spawn(run_poll_loop(
            self,
            op,
            publisher.clone(),
            stop_tx.subscribe(),
        ));

        PollerHandle {
            rx,
            publisher,
            stop_tx,
        }
    }
}

/// Owning handle for a running poller.
pub struct PollerHandle<T> {
    rx: watch::Receiver<PollState<T>>,
    publisher: Arc<Publisher<T>>,
    stop_tx: broadcast::Sender<()>,
}

impl<T: Clone> PollerHandle<T> {
    /// Latest published state.
    pub fn snapshot(&self) -> PollState<T> {
        self.rx.borrow().clone()
    }

    /// A receiver that is notified on every publish.
    pub fn subscribe(&self) -> watch::Receiver<PollState<T>> {
        self.rx.clone()
    }

    /// Wait for the first cycle to complete.
    ///
    /// Returns `None` if the poller was stopped before that happened.
    pub async fn loaded(&self) -> Option<PollState<T>> {
        let mut rx = self.rx.clone();
        let state = rx.wait_for(|s| !s.loading).await.ok()?;
        Some(state.clone())
    }

    pub fn is_stopped(&self) -> bool {
        self.publisher.is_stopped()
    }

    /// Cancel the timer and any in-flight cycle. Idempotent.
    pub fn stop(&self) {
        if self.publisher.close() {
            let _ = self.stop_tx.send(());
        }
    }
}

impl<T> Drop for PollerHandle<T> {
    fn drop(&mut self) {
        if self.publisher.close() {
            let _ = self.stop_tx.send(());
        }
    }
}

/// Run cycles until told to stop or, for [`Cadence::Once`], until the
/// single cycle is done.
async fn run_poll_loop<T, E, F, Fut>(
    poller: Poller,
    op: F,
    publisher: Arc<Publisher<T>>,
    mut stop_rx: broadcast::Receiver<()>,
) where
    T: Default + Clone + Send + Sync + 'static,
    E: fmt::Display + Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    let period = match poller.cadence {
        Cadence::Every(period) => period,
        Cadence::Once => {
            tokio::select! {
                _ = stop_rx.recv() => {}
                outcome = op() => {
                    publisher.publish(1, outcome);
                }
            }
            tracing::debug!("Poller {}: one-shot cycle finished", poller.name);
            return;
        }
    };

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Cycles started under the independent policy. Dropping the set on exit
    // aborts whatever is still running.
    let mut in_flight = JoinSet::new();
    let mut cycle: u64 = 0;

    loop {
        tokio::select! {
            _ = stop_rx.recv() => {
                break;
            }
            _ = interval.tick() => {
                cycle += 1;

                match poller.overlap {
                    OverlapPolicy::Serialize => {
                        tokio::select! {
                            _ = stop_rx.recv() => break,
                            outcome = op() => {
                                publisher.publish(cycle, outcome);
                            }
                        }
                    }
                    OverlapPolicy::Independent => {
                        while in_flight.try_join_next().is_some() {}

                        let fut = op();
                        let publisher = publisher.clone();
                        let this_cycle = cycle;
                        in_flight.spawn(async move {
                            let outcome = fut.await;
                            publisher.publish(this_cycle, outcome);
                        });
                    }
                }
            }
        }
    }

    tracing::info!("Poller {}: stopped after {} cycles", poller.name, cycle);
}
