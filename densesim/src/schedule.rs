// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Debounced background recomputation of circuit statistics.
//!
//! Interactive edits arrive in bursts, and every edit invalidates the
//! published statistics wholesale. The scheduler absorbs a burst into a
//! single recomputation: an edit arms a debounce window, further edits
//! inside the window replace the pending circuit without re-arming it, and
//! at most one evaluation is ever in flight. An edit that lands while an
//! evaluation is running is remembered and triggers exactly one follow-up
//! pass once the running one completes.

use std::sync::{Arc, Condvar, Mutex, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::circuit::Circuit;
use crate::error::Error;
use crate::evaluate::{EvalOptions, Evaluator};
use crate::stats::{extract_statistics, CircuitStats};

/// Where the scheduler is in its recompute cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No work pending and nothing running.
    Idle,
    /// An edit armed the debounce window; the next pass has not started.
    Scheduled,
    /// A recomputation is in flight.
    Running,
}

/// The most recent publication: statistics from the last successful pass,
/// plus the error from the last pass if it failed.
///
/// A failed pass never unpublishes earlier statistics. Readers keep seeing
/// the last good snapshot alongside the error until a later pass succeeds.
#[derive(Debug, Clone, Default)]
pub struct Published {
    pub stats: Option<Arc<CircuitStats>>,
    pub error: Option<Error>,
}

#[derive(Debug)]
struct Pending {
    circuit: Option<Circuit>,
    phase: Phase,
    shutdown: bool,
}

type Observer = Box<dyn FnMut(&Published) + Send>;

struct Shared {
    pending: Mutex<Pending>,
    wake: Condvar,
    latest: RwLock<Published>,
    observer: Mutex<Option<Observer>>,
}

/// Coalescing scheduler that recomputes statistics on a worker thread.
///
/// Edits are submitted with [`schedule`](Self::schedule) and results read
/// back with [`latest`](Self::latest); neither call blocks on evaluation.
/// Dropping the scheduler stops the worker, abandoning any pending edit.
pub struct RecomputeScheduler {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl RecomputeScheduler {
    /// Starts a scheduler evaluating circuits from the zero state with the
    /// standard gate set.
    #[must_use]
    pub fn new(debounce: Duration) -> Self {
        let mut evaluator = Evaluator::default();
        Self::with_compute(debounce, move |circuit: &Circuit| {
            evaluator
                .evaluate(circuit, &EvalOptions::default())
                .map(|evaluation| extract_statistics(&evaluation.output))
        })
    }

    /// Starts a scheduler with a custom compute function. The function runs
    /// on the worker thread, one invocation at a time.
    #[must_use]
    pub fn with_compute<C>(debounce: Duration, compute: C) -> Self
    where
        C: FnMut(&Circuit) -> Result<CircuitStats, Error> + Send + 'static,
    {
        let shared = Arc::new(Shared {
            pending: Mutex::new(Pending {
                circuit: None,
                phase: Phase::Idle,
                shutdown: false,
            }),
            wake: Condvar::new(),
            latest: RwLock::new(Published::default()),
            observer: Mutex::new(None),
        });
        let worker = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || worker_loop(&shared, debounce, compute))
        };
        Self {
            shared,
            worker: Some(worker),
        }
    }

    /// Submits an edited circuit, replacing any not-yet-started submission.
    ///
    /// From `Idle` this arms the debounce window. From `Scheduled` the
    /// window keeps its original deadline, so a steady stream of edits
    /// cannot postpone recomputation forever. From `Running` the circuit is
    /// queued for exactly one follow-up pass.
    ///
    /// # Panics
    ///
    /// Panics if the worker thread panicked while holding the scheduler lock.
    pub fn schedule(&self, circuit: Circuit) {
        let mut pending = self.shared.pending.lock().expect("scheduler lock poisoned");
        pending.circuit = Some(circuit);
        if pending.phase == Phase::Idle {
            pending.phase = Phase::Scheduled;
            self.shared.wake.notify_one();
        }
    }

    /// The current recompute phase.
    ///
    /// # Panics
    ///
    /// Panics if the worker thread panicked while holding the scheduler lock.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.shared
            .pending
            .lock()
            .expect("scheduler lock poisoned")
            .phase
    }

    /// The most recently published statistics and error.
    ///
    /// # Panics
    ///
    /// Panics if the worker thread panicked while holding the scheduler lock.
    #[must_use]
    pub fn latest(&self) -> Published {
        self.shared
            .latest
            .read()
            .expect("scheduler lock poisoned")
            .clone()
    }

    /// Registers a callback invoked on the worker thread after every
    /// publication, successful or failed, with the snapshot just published.
    /// Replaces any previously registered observer.
    ///
    /// # Panics
    ///
    /// Panics if the worker thread panicked while holding the scheduler lock.
    pub fn set_observer(&self, observer: impl FnMut(&Published) + Send + 'static) {
        *self
            .shared
            .observer
            .lock()
            .expect("scheduler lock poisoned") = Some(Box::new(observer));
    }

    /// Blocks until no submission is pending and nothing is running.
    ///
    /// Intended for tests and batch callers; interactive callers poll
    /// [`latest`](Self::latest) instead.
    ///
    /// # Panics
    ///
    /// Panics if the worker thread panicked while holding the scheduler lock.
    pub fn wait_until_idle(&self) {
        let mut pending = self.shared.pending.lock().expect("scheduler lock poisoned");
        while pending.phase != Phase::Idle || pending.circuit.is_some() {
            pending = self
                .shared
                .wake
                .wait(pending)
                .expect("scheduler lock poisoned");
        }
    }
}

impl Drop for RecomputeScheduler {
    fn drop(&mut self) {
        {
            let mut pending = self.shared.pending.lock().expect("scheduler lock poisoned");
            pending.shutdown = true;
            self.shared.wake.notify_all();
        }
        if let Some(worker) = self.worker.take() {
            // A panicking worker already surfaced its failure; nothing more
            // to do with the join result here.
            drop(worker.join());
        }
    }
}

fn worker_loop<C>(shared: &Shared, debounce: Duration, mut compute: C)
where
    C: FnMut(&Circuit) -> Result<CircuitStats, Error>,
{
    loop {
        let circuit = {
            let mut pending = shared.pending.lock().expect("scheduler lock poisoned");
            loop {
                if pending.shutdown {
                    return;
                }
                if pending.phase == Phase::Scheduled {
                    break;
                }
                pending = shared.wake.wait(pending).expect("scheduler lock poisoned");
            }
            drop(pending);

            // The window runs from the edit that armed it. Later edits
            // replace the pending circuit but never extend the window.
            thread::sleep(debounce);

            let mut pending = shared.pending.lock().expect("scheduler lock poisoned");
            if pending.shutdown {
                return;
            }
            pending.phase = Phase::Running;
            pending
                .circuit
                .take()
                .expect("scheduled phase implies a pending circuit")
        };

        debug!(wire_count = circuit.wire_count, "recomputing statistics");
        let result = compute(&circuit);
        let published = {
            let mut latest = shared.latest.write().expect("scheduler lock poisoned");
            match result {
                Ok(stats) => {
                    latest.stats = Some(Arc::new(stats));
                    latest.error = None;
                }
                Err(error) => {
                    warn!(%error, "recomputation failed; keeping last good statistics");
                    latest.error = Some(error);
                }
            }
            latest.clone()
        };
        if let Some(observer) = shared
            .observer
            .lock()
            .expect("scheduler lock poisoned")
            .as_mut()
        {
            observer(&published);
        }

        let mut pending = shared.pending.lock().expect("scheduler lock poisoned");
        // An edit that arrived mid-run goes straight back to Scheduled so the
        // next iteration picks it up after one more debounce window.
        pending.phase = if pending.circuit.is_some() {
            Phase::Scheduled
        } else {
            Phase::Idle
        };
        shared.wake.notify_all();
    }
}
