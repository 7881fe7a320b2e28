use std::fmt;
use std::fmt::Formatter;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use log::{debug, error};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{self, MissedTickBehavior};
use crate::errors::PollError;

/// The polling routines driven by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routine {
    Status,
    Connection,
}

impl Routine {
    /// Id of the element used to surface failures of this routine
    pub fn alert_id(&self) -> &'static str {
        match self {
            Routine::Status => "status-alert",
            Routine::Connection => "connection-alert",
        }
    }
}

/// Implementation of the Display Trait for pretty print
impl fmt::Display for Routine {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Routine::Status => write!(f, "BMS status"),
            Routine::Connection => write!(f, "Connection status"),
        }
    }
}

/// Result of a single poll
#[derive(Debug)]
pub enum PollOutcome {
    /// The response was written to the document
    Updated,
    /// The poll failed, whatever state the routine shows on failure has been written
    Failed(PollError),
    /// A newer response had already been written, this one was discarded
    Stale { generation: u64 },
}

/// Caller supplied receiver of every poll outcome
pub type OutcomeHandler = Arc<dyn Fn(Routine, &PollOutcome) + Send + Sync>;

/// Orders the responses of one routine.
///
/// Every tick is issued a new generation. A response may only be written if its
/// generation is newer than the last one written, so a slow response can never
/// overwrite a fresher one. Callers must hold the document lock across
/// `try_commit` and the write.
#[derive(Debug, Default)]
pub struct RequestGuard {
    issued: AtomicU64,
    committed: AtomicU64,
}

impl RequestGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next generation
    pub fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Marks the generation as written, returns false if a newer one already was
    ///
    /// # Arguments
    ///
    /// * 'generation' - generation of the response about to be written
    pub fn try_commit(&self, generation: u64) -> bool {
        self.committed.fetch_max(generation, Ordering::SeqCst) < generation
    }

    pub fn latest_issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }
}

/// A routine the poller can repeat
pub trait PollTask: Send + Sync + 'static {
    fn routine(&self) -> Routine;
    fn guard(&self) -> &RequestGuard;
    fn poll(&self, generation: u64) -> impl Future<Output = PollOutcome> + Send;
}

/// Owns the repeating timers of the dashboard.
///
/// Each timer polls immediately when started and then once every period, without
/// waiting for earlier polls to finish. Stopping or dropping the poller aborts all
/// timers together with their in-flight polls.
pub struct Poller {
    handler: OutcomeHandler,
    timers: Vec<(Routine, JoinHandle<()>)>,
}

impl Poller {
    /// Returns a new instance of the Poller struct
    ///
    /// # Arguments
    ///
    /// * 'handler' - receives the outcome of every poll
    pub fn new(handler: OutcomeHandler) -> Self {
        Self { handler, timers: Vec::new() }
    }

    /// Starts a repeating timer for the given task, must be called within a tokio runtime
    ///
    /// # Arguments
    ///
    /// * 'task' - the routine to repeat
    /// * 'period' - time between polls
    pub fn start<T: PollTask>(&mut self, task: Arc<T>, period: Duration) {
        let routine = task.routine();
        debug!("starting {} timer, period {} ms", routine, period.as_millis());

        let handle = tokio::spawn(run_timer(task, period, self.handler.clone()));
        self.timers.push((routine, handle));
    }

    /// Aborts all timers and their in-flight polls
    pub fn stop(&mut self) {
        for (routine, handle) in self.timers.drain(..) {
            debug!("stopping {} timer", routine);
            handle.abort();
        }
    }

    /// Number of timers still running
    pub fn active_timers(&self) -> usize {
        self.timers.iter().filter(|(_, h)| !h.is_finished()).count()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Timer loop, spawns one poll per tick and reaps finished polls
///
/// # Arguments
///
/// * 'task' - the routine to repeat
/// * 'period' - time between polls
/// * 'handler' - receives the outcome of every poll
async fn run_timer<T: PollTask>(task: Arc<T>, period: Duration, handler: OutcomeHandler) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let generation = task.guard().issue();
                let task = task.clone();
                let handler = handler.clone();
                in_flight.spawn(async move {
                    let outcome = task.poll(generation).await;
                    handler(task.routine(), &outcome);
                });
            }
            Some(joined) = in_flight.join_next() => {
                if let Err(e) = joined {
                    if e.is_panic() {
                        error!("{} poll panicked: {}", task.routine(), e);
                    }
                }
            }
        }
    }
}
