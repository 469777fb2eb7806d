//! Scheduler for the crawl frontier
//!
//! This module handles:
//! - Admission of discovered tasks through the deduplication set
//! - The priority retry queue of tasks awaiting a worker
//! - The in-flight bound (never more than `worker_count` dispatched tasks)
//! - Retry bookkeeping and retirement of exhausted tasks
//! - Termination once nothing is queued or in flight
//!
//! The scheduler runs as a single task and is the only owner of the queue,
//! the seen set and the in-flight counter, so none of them need locks.

use crate::config::CrawlConfig;
use crate::crawler::dedup::SeenSet;
use crate::crawler::events::CrawlEvent;
use crate::crawler::queue::{PriorityRetryQueue, TaskQueue};
use crate::crawler::task::Task;
use crate::output::{CrawlReport, RetiredTask};
use crate::state::TaskState;
use std::time::Instant;
use tokio::sync::mpsc;

/// Completions between two progress log lines
const PROGRESS_INTERVAL: u64 = 25;

/// Scheduler owns the frontier and decides what runs next
///
/// The scheduler coordinates:
/// - Admission of new tasks (each identifier at most once)
/// - Dispatch up to the worker pool size
/// - Re-queueing failed tasks until `max_attempts` is reached
/// - Detecting that the crawl is finished
pub struct Scheduler<Q: TaskQueue = PriorityRetryQueue> {
    /// Tasks waiting for a worker
    queue: Q,

    /// Every identifier admitted so far
    seen: SeenSet,

    /// Dispatched tasks whose completion has not arrived yet
    in_flight: usize,

    /// Upper bound on `in_flight`
    worker_count: usize,

    /// Attempts allowed per task
    max_attempts: usize,

    report: CrawlReport,

    started: Instant,
}

impl Scheduler {
    /// Creates a scheduler with the priority retry queue from `config`
    pub fn new(config: &CrawlConfig) -> Self {
        Self::with_queue(PriorityRetryQueue::new(config.queue_order), config)
    }
}

impl<Q: TaskQueue> Scheduler<Q> {
    /// Creates a scheduler around an arbitrary queue implementation
    pub fn with_queue(queue: Q, config: &CrawlConfig) -> Self {
        Self {
            queue,
            seen: SeenSet::new(),
            in_flight: 0,
            worker_count: config.worker_count.max(1),
            max_attempts: config.max_attempts,
            report: CrawlReport::default(),
            started: Instant::now(),
        }
    }

    /// Admits a newly found task
    ///
    /// Returns true if the task was queued, false if its identifier had
    /// already been admitted.
    pub fn discover(&mut self, task: Task) -> bool {
        if !self.seen.admit(task.identifier()) {
            tracing::trace!("Duplicate discovery: {}", task.identifier());
            self.report.duplicates += 1;
            return false;
        }

        tracing::debug!(
            "Admitted {} ({})",
            task.identifier(),
            if task.is_leaf() { "leaf" } else { "page" }
        );
        self.report.admitted += 1;
        self.queue.push(task);
        true
    }

    /// Takes back a task whose attempt failed
    ///
    /// The task is re-queued while it has attempts left; otherwise it is
    /// retired and its first error is logged. The in-flight counter is left
    /// alone: the matching completion event decrements it.
    pub fn handle_failure(&mut self, mut task: Task) {
        if task.can_retry(self.max_attempts) {
            if let Err(e) = task.transition_to(TaskState::Queued) {
                tracing::warn!("Dropping failed task: {}", e);
                return;
            }
            tracing::debug!(
                "Re-queueing {} after {} failed attempt(s)",
                task.identifier(),
                task.error_count()
            );
            self.report.retried += 1;
            self.queue.push(task);
            return;
        }

        if let Err(e) = task.transition_to(TaskState::RetiredFailed) {
            tracing::warn!("Dropping failed task: {}", e);
            return;
        }

        let first_error = task
            .first_error()
            .map(|attempt| attempt.error.to_string())
            .unwrap_or_else(|| "unknown error".to_string());

        tracing::warn!(
            "Failed to process {} after {} attempts: {}",
            task.identifier(),
            task.error_count(),
            first_error
        );

        self.report.retired_failed.push(RetiredTask {
            identifier: task.identifier().to_string(),
            attempts: task.error_count(),
            first_error,
        });
    }

    /// Records that a dispatched attempt finished
    pub fn handle_completion(&mut self, identifier: &str, succeeded: bool) {
        if self.in_flight == 0 {
            tracing::warn!(
                "Completion for {} arrived with nothing in flight",
                identifier
            );
            return;
        }

        self.in_flight -= 1;
        self.report.completed += 1;
        if succeeded {
            self.report.succeeded += 1;
        }
        tracing::trace!("Completed {} (success: {})", identifier, succeeded);

        if self.report.completed % PROGRESS_INTERVAL == 0 {
            let elapsed = self.started.elapsed();
            let rate = self.report.completed as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
            tracing::info!(
                "Progress: {} attempts done, {} queued, {} in flight, {:.2} tasks/sec",
                self.report.completed,
                self.queue.len(),
                self.in_flight,
                rate
            );
        }
    }

    /// Applies one event from the workers
    pub fn handle_event(&mut self, event: CrawlEvent) {
        match event {
            CrawlEvent::Discovered(task) => {
                self.discover(task);
            }
            CrawlEvent::Failed(task) => self.handle_failure(task),
            CrawlEvent::Completed {
                identifier,
                succeeded,
            } => self.handle_completion(&identifier, succeeded),
        }
    }

    /// Pops the next task if a worker slot is free
    ///
    /// The returned task is counted as in flight.
    pub fn next_dispatch(&mut self) -> Option<Task> {
        while self.in_flight < self.worker_count {
            let mut task = self.queue.pop()?;
            if let Err(e) = task.transition_to(TaskState::InFlight) {
                tracing::warn!("Skipping task that cannot be dispatched: {}", e);
                continue;
            }

            self.in_flight += 1;
            self.report.dispatched += 1;
            self.report.peak_in_flight = self.report.peak_in_flight.max(self.in_flight);
            tracing::debug!(
                "Dispatching {} (attempt {}, {} in flight)",
                task.identifier(),
                task.error_count() + 1,
                self.in_flight
            );
            return Some(task);
        }
        None
    }

    /// True when nothing is queued and nothing is in flight
    pub fn is_finished(&self) -> bool {
        self.in_flight == 0 && self.queue.is_empty()
    }

    /// Number of dispatched tasks without a completion
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Number of tasks waiting in the queue
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Number of identifiers admitted so far
    pub fn seen_len(&self) -> usize {
        self.seen.len()
    }

    /// Runs the event loop until the crawl is exhausted
    ///
    /// Each iteration fills free worker slots from the queue, then blocks on
    /// the event channel for exactly one event. When nothing is queued or in
    /// flight, the dispatch channel is closed (which lets the workers drain
    /// and exit) and the report is returned.
    ///
    /// If every event sender is gone while work remains, the workers have
    /// died; the loop stops and counts the leftover tasks as abandoned.
    pub async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<CrawlEvent>,
        dispatch: mpsc::Sender<Task>,
    ) -> CrawlReport {
        tracing::info!(
            "Scheduler started with {} worker slots, {} attempts per task",
            self.worker_count,
            self.max_attempts
        );

        'crawl: loop {
            while let Some(task) = self.next_dispatch() {
                if let Err(returned) = dispatch.send(task).await {
                    tracing::error!(
                        "Dispatch channel closed before {} could be sent",
                        returned.0.identifier()
                    );
                    self.in_flight -= 1;
                    self.abandon_remaining();
                    break 'crawl;
                }
            }

            if self.is_finished() {
                tracing::info!("Queue empty and nothing in flight, crawl complete");
                break;
            }

            match events.recv().await {
                Some(event) => {
                    tracing::trace!("Received {} event", event.kind());
                    self.handle_event(event);
                }
                None => {
                    tracing::error!(
                        "All workers exited with {} task(s) in flight and {} queued",
                        self.in_flight,
                        self.queue.len()
                    );
                    self.abandon_remaining();
                    break;
                }
            }
        }

        drop(dispatch);
        self.report.elapsed = self.started.elapsed();
        self.report
    }

    fn abandon_remaining(&mut self) {
        self.report.abandoned += (self.in_flight + self.queue.len()) as u64;
        self.in_flight = 0;
        while self.queue.pop().is_some() {}
    }
}
