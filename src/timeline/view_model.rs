//! Screen-owned timeline state with cancellable refresh cycles

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::timeline::core::{SourceNotice, TimelineService, TimelineSnapshot};
use crate::traits::*;
use crate::types::*;

/// What the screen renders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineState {
    pub loading: bool,
    pub snapshot: Option<TimelineSnapshot>,
}

impl TimelineState {
    pub fn entries(&self) -> &[DisplayRecord] {
        self.snapshot
            .as_ref()
            .map(|s| s.entries.as_slice())
            .unwrap_or(&[])
    }

    pub fn notices(&self) -> &[SourceNotice] {
        self.snapshot
            .as_ref()
            .map(|s| s.notices.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Default)]
struct Shared {
    state: TimelineState,
    generation: u64,
    closed: bool,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// View model owned by one screen for its visible lifetime
///
/// Each [`refresh`](Self::refresh) supersedes the previous cycle. Once the
/// model is closed (or dropped) no cycle writes state again, even if its
/// requests were already in flight.
pub struct TimelineViewModel<S: TimelineSource + 'static> {
    service: Arc<TimelineService<S>>,
    shared: Arc<Mutex<Shared>>,
    in_flight: Option<JoinHandle<()>>,
}

impl<S: TimelineSource + 'static> TimelineViewModel<S> {
    /// Create a view model over a data source
    pub fn new(source: S) -> Self {
        Self {
            service: Arc::new(TimelineService::new(source)),
            shared: Arc::new(Mutex::new(Shared::default())),
            in_flight: None,
        }
    }

    /// Current state snapshot
    pub fn state(&self) -> TimelineState {
        lock(&self.shared).state.clone()
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.shared).closed
    }

    /// Start a new fetch cycle on the current tokio runtime
    ///
    /// Returns the cycle's generation number.
    pub fn refresh(&mut self) -> TimelineResult<u64> {
        let generation = {
            let mut shared = lock(&self.shared);
            if shared.closed {
                return Err(TimelineError::Cancelled);
            }
            shared.generation += 1;
            shared.state.loading = true;
            shared.generation
        };

        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }

        let service = Arc::clone(&self.service);
        let shared = Arc::clone(&self.shared);
        self.in_flight = Some(tokio::spawn(async move {
            let snapshot = service.load().await;

            let mut guard = lock(&shared);
            if guard.closed || guard.generation != generation {
                debug!(generation, "discarding result of a stale timeline cycle");
                return;
            }
            guard.state.loading = false;
            guard.state.snapshot = Some(snapshot);
        }));

        debug!(generation, "timeline refresh started");
        Ok(generation)
    }

    /// Wait for the current cycle to finish
    pub async fn wait(&mut self) -> TimelineResult<()> {
        match self.in_flight.take() {
            Some(handle) => match handle.await {
                Ok(()) => Ok(()),
                Err(err) if err.is_cancelled() => Err(TimelineError::Cancelled),
                Err(err) => {
                    warn!(error = %err, "timeline cycle panicked");
                    Err(TimelineError::Unavailable(err.to_string()))
                }
            },
            None => Ok(()),
        }
    }

    /// Cancel outstanding work; the model stops accepting writes
    pub fn close(&mut self) {
        {
            let mut shared = lock(&self.shared);
            shared.closed = true;
            shared.state.loading = false;
        }
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

impl<S: TimelineSource + 'static> Drop for TimelineViewModel<S> {
    fn drop(&mut self) {
        self.close();
    }
}
