//! Crawl task definition
//!
//! A [`Task`] is one URL plus its retry history. Tasks move by value between
//! the scheduler and the workers, so at any moment exactly one component
//! owns a given task.

use crate::state::TaskState;
use crate::HarvestError;
use chrono::{DateTime, Utc};
use std::time::Instant;
use url::Url;

/// One failed attempt at executing a task
#[derive(Debug)]
pub struct AttemptError {
    /// What went wrong
    pub error: HarvestError,

    /// Wall-clock time the attempt failed
    pub occurred_at: DateTime<Utc>,
}

/// A unit of crawl work
#[derive(Debug)]
pub struct Task {
    /// Canonical string form of `url`
    identifier: String,

    /// Target of the task
    url: Url,

    /// One record per failed attempt, oldest first
    attempt_errors: Vec<AttemptError>,

    /// Monotonic time of the most recent failure
    last_attempt: Option<Instant>,

    /// Downloadable resource rather than a page to scan
    is_leaf: bool,

    /// Slot in the retry queue's heap while queued
    pub(crate) queue_position: Option<usize>,

    state: TaskState,
}

impl Task {
    /// Creates a new queued task for a canonical URL
    pub fn new(url: Url, is_leaf: bool) -> Self {
        Self {
            identifier: url.as_str().to_string(),
            url,
            attempt_errors: Vec::new(),
            last_attempt: None,
            is_leaf,
            queue_position: None,
            state: TaskState::Queued,
        }
    }

    /// Creates a page task (fetched and scanned for links)
    pub fn page(url: Url) -> Self {
        Self::new(url, false)
    }

    /// Creates a leaf task (downloaded to disk)
    pub fn leaf(url: Url) -> Self {
        Self::new(url, true)
    }

    /// The identifier used for deduplication
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Number of failed attempts so far
    pub fn error_count(&self) -> usize {
        self.attempt_errors.len()
    }

    /// Failure history, oldest first
    pub fn attempt_errors(&self) -> &[AttemptError] {
        &self.attempt_errors
    }

    /// The first recorded failure, which is what gets reported on retirement
    pub fn first_error(&self) -> Option<&AttemptError> {
        self.attempt_errors.first()
    }

    /// Time of the most recent failure, `None` if the task never failed
    pub fn last_attempt(&self) -> Option<Instant> {
        self.last_attempt
    }

    /// Whether another attempt is allowed under `max_attempts`
    pub fn can_retry(&self, max_attempts: usize) -> bool {
        self.attempt_errors.len() < max_attempts
    }

    /// Appends a failure and stamps the attempt time
    pub fn record_failure(&mut self, error: HarvestError) {
        self.record_failure_at(error, Instant::now());
    }

    pub(crate) fn record_failure_at(&mut self, error: HarvestError, at: Instant) {
        self.attempt_errors.push(AttemptError {
            error,
            occurred_at: Utc::now(),
        });
        self.last_attempt = Some(at);
    }

    #[cfg(test)]
    pub(crate) fn with_history(url: &str, errors: usize, last_attempt: Option<Instant>) -> Self {
        let mut task = Self::page(Url::parse(url).expect("test url"));
        for _ in 0..errors {
            task.attempt_errors.push(AttemptError {
                error: HarvestError::MalformedTask {
                    url: url.to_string(),
                },
                occurred_at: Utc::now(),
            });
        }
        task.last_attempt = last_attempt;
        task
    }

    /// Moves the task to `next`, rejecting transitions outside the lifecycle
    pub(crate) fn transition_to(&mut self, next: TaskState) -> Result<(), HarvestError> {
        if !self.state.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                identifier: self.identifier.clone(),
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }
}
