//! Periodically refetch an event and its responses and publish the
//! recomputed summary to subscribers.
//!
//! Polling is the only way concurrent edits from other participants
//! become visible, so a poller keeps going through fetch errors and
//! only stops when its handle is stopped or dropped.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::schedule::error::Result;
use crate::schedule::{
    Event, EventSummary, ResponseMap, ScheduleError, ScheduleStore, service,
    summarize_response_map,
};

mod http;

pub use http::HttpSource;

/// Where a poller reads an event and its responses from
#[async_trait]
pub trait ResponseSource: Send + Sync {
    async fn fetch(&self, event_id: &str) -> Result<(Event, ResponseMap)>;
}

/// Reads straight from a store in the same process
pub struct StoreSource<S> {
    store: S,
}

impl<S: ScheduleStore> StoreSource<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: ScheduleStore> ResponseSource for StoreSource<S> {
    async fn fetch(&self, event_id: &str) -> Result<(Event, ResponseMap)> {
        service::get_event_with_responses(&self.store, event_id).await
    }
}

/// The latest state seen by a poller
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PollSnapshot {
    pub event: Option<Event>,
    /// Last successfully computed summary. Kept when a later fetch fails.
    pub summary: Option<EventSummary>,
    /// Error from the most recent fetch, cleared by the next success
    pub last_error: Option<ScheduleError>,
}

/// Shortest delay between two fetches. Shorter intervals, including
/// zero, are raised to this.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct ResponsePoller;

impl ResponsePoller {
    /// Start polling `event_id` every `interval`. The first fetch happens
    /// immediately.
    pub fn spawn(
        source: Arc<dyn ResponseSource>,
        event_id: &str,
        interval: Duration,
    ) -> PollerHandle {
        let (tx, rx) = watch::channel(PollSnapshot::default());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let event_id = event_id.to_string();
        if interval < MIN_POLL_INTERVAL {
            tracing::warn!(
                "Poll interval {:?} is too short, using {:?}",
                interval,
                MIN_POLL_INTERVAL
            );
        }
        let interval = interval.max(MIN_POLL_INTERVAL);

        let task = tokio::spawn(poll_loop(source, event_id, interval, tx, shutdown_rx));

        PollerHandle {
            rx,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

async fn poll_loop(
    source: Arc<dyn ResponseSource>,
    event_id: String,
    interval: Duration,
    tx: watch::Sender<PollSnapshot>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            // Resolves on an explicit stop or when the handle is dropped
            _ = &mut shutdown => {
                tracing::debug!("Stopped polling event {}", event_id);
                break;
            }
            _ = ticker.tick() => {
                let result = source.fetch(&event_id).await;
                if publish(&tx, result) {
                    tracing::debug!("Published new snapshot for event {}", event_id);
                }
            }
        }
    }
}

/// Fold a fetch result into the current snapshot. Returns true when
/// subscribers were notified.
fn publish(tx: &watch::Sender<PollSnapshot>, result: Result<(Event, ResponseMap)>) -> bool {
    tx.send_if_modified(|snapshot| match result {
        Ok((event, responses)) => {
            let summary = summarize_response_map(&event, responses);
            let changed = snapshot.last_error.is_some()
                || snapshot.event.as_ref() != Some(&event)
                || snapshot.summary.as_ref() != Some(&summary);
            if changed {
                snapshot.event = Some(event);
                snapshot.summary = Some(summary);
                snapshot.last_error = None;
            }
            changed
        }
        Err(err) => {
            tracing::warn!("Polling failed: {}", err);
            if snapshot.last_error.as_ref() == Some(&err) {
                false
            } else {
                snapshot.last_error = Some(err);
                true
            }
        }
    })
}

/// Owns a running poller. Dropping the handle stops the poll loop.
pub struct PollerHandle {
    rx: watch::Receiver<PollSnapshot>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// A receiver that is notified every time the snapshot changes
    pub fn subscribe(&self) -> watch::Receiver<PollSnapshot> {
        self.rx.clone()
    }

    pub fn latest(&self) -> PollSnapshot {
        self.rx.borrow().clone()
    }

    /// Stop polling and wait for an in flight fetch to finish
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            // The loop may already be gone
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracing::error!("Poller task failed: {}", err);
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
