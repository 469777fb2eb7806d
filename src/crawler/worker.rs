//! Worker pool loop
//!
//! Every worker runs the same loop: take the next task from the shared
//! dispatch channel, route it to the backend, report the outcome to the
//! scheduler. A worker exits once the dispatch channel is closed and empty.

use crate::crawler::backend::CrawlBackend;
use crate::crawler::events::CrawlEvent;
use crate::crawler::task::Task;
use crate::state::TaskState;
use crate::HarvestError;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Receiving end of the dispatch channel, shared by all workers
pub type DispatchReceiver = Arc<Mutex<mpsc::Receiver<Task>>>;

/// A single execution unit of the pool
pub struct Worker {
    id: usize,
    backend: Arc<dyn CrawlBackend>,
    dispatch: DispatchReceiver,
    events: mpsc::UnboundedSender<CrawlEvent>,
    dry_run: bool,
}

impl Worker {
    pub fn new(
        id: usize,
        backend: Arc<dyn CrawlBackend>,
        dispatch: DispatchReceiver,
        events: mpsc::UnboundedSender<CrawlEvent>,
        dry_run: bool,
    ) -> Self {
        Self {
            id,
            backend,
            dispatch,
            events,
            dry_run,
        }
    }

    /// Processes tasks until the dispatch channel is exhausted
    ///
    /// Returns the number of attempts this worker executed.
    pub async fn run(self) -> usize {
        let mut attempts = 0;

        loop {
            let next = {
                let mut dispatch = self.dispatch.lock().await;
                dispatch.recv().await
            };

            let Some(task) = next else {
                break;
            };

            self.execute(task).await;
            attempts += 1;
        }

        tracing::debug!("Worker {} exiting after {} attempts", self.id, attempts);
        attempts
    }

    /// Runs one attempt and emits its events
    ///
    /// On success the discoveries go out one by one, then the completion.
    /// On failure the task records the error and goes back to the scheduler,
    /// then the completion follows. The attempt runs on its own tokio task;
    /// a panic there is recorded as a failed attempt.
    async fn execute(&self, task: Task) {
        let identifier = task.identifier().to_string();
        let backend = Arc::clone(&self.backend);
        let dry_run = self.dry_run;

        let task = Arc::new(task);
        let attempt_task = Arc::clone(&task);
        let attempt = tokio::spawn(async move {
            process(backend.as_ref(), &attempt_task, dry_run).await
        });

        // The spawned future has been dropped once its result is in, so
        // this is the only remaining handle
        let outcome = match attempt.await {
            Ok(result) => result,
            Err(e) => Err(HarvestError::AttemptPanicked {
                url: identifier.clone(),
                message: e.to_string(),
            }),
        };
        let Ok(mut task) = Arc::try_unwrap(task) else {
            tracing::error!("Worker {}: lost ownership of {}", self.id, identifier);
            self.emit(CrawlEvent::Completed {
                identifier,
                succeeded: false,
            });
            return;
        };

        let succeeded = match outcome {
            Ok(discovered) => {
                for found in discovered {
                    self.emit(CrawlEvent::Discovered(found));
                }
                if let Err(e) = task.transition_to(TaskState::RetiredSuccess) {
                    tracing::warn!("Worker {}: {}", self.id, e);
                }
                true
            }
            Err(error) => {
                tracing::debug!(
                    "Worker {}: attempt {} on {} failed: {}",
                    self.id,
                    task.error_count() + 1,
                    identifier,
                    error
                );
                task.record_failure(error);
                self.emit(CrawlEvent::Failed(task));
                false
            }
        };

        self.emit(CrawlEvent::Completed {
            identifier,
            succeeded,
        });
    }

    fn emit(&self, event: CrawlEvent) {
        if self.events.send(event).is_err() {
            tracing::warn!("Worker {}: scheduler is gone, dropping event", self.id);
        }
    }
}

/// Routes leaves to the downloader and pages to the extractor
async fn process(
    backend: &dyn CrawlBackend,
    task: &Task,
    dry_run: bool,
) -> Result<Vec<Task>, HarvestError> {
    if dry_run {
        tracing::info!("link: {}", task.url());
    }

    if task.is_leaf() {
        if dry_run {
            tracing::info!("Would download {}", task.url());
            return Ok(Vec::new());
        }
        backend.download_leaf(task).await?;
        Ok(Vec::new())
    } else {
        backend.fetch_and_extract(task).await
    }
}
