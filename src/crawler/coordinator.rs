//! Crawler coordinator - wires the scheduler to the worker pool
//!
//! This module owns the lifecycle of a crawl:
//! - Creating the dispatch and event channels
//! - Spawning `worker_count` workers over one shared backend
//! - Seeding the scheduler and running it to exhaustion
//! - Waiting for every worker to exit before returning the report

use crate::config::{validate_output_directory, Config, CrawlConfig};
use crate::crawler::backend::{CrawlBackend, HttpBackend};
use crate::crawler::events::CrawlEvent;
use crate::crawler::scheduler::Scheduler;
use crate::crawler::task::Task;
use crate::crawler::worker::Worker;
use crate::output::CrawlReport;
use crate::url::parse_seed;
use crate::HarvestError;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: CrawlConfig,
    backend: Arc<dyn CrawlBackend>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawl settings
    /// * `backend` - Fetch/extract and download collaborators shared by all workers
    pub fn new(config: CrawlConfig, backend: Arc<dyn CrawlBackend>) -> Self {
        Self { config, backend }
    }

    /// Runs a crawl from `seed` until no work remains
    ///
    /// The dispatch channel holds at most `worker_count` tasks, and the
    /// scheduler never has more than `worker_count` dispatched, so a send to
    /// it never waits on a worker.
    pub async fn run(self, seed: Task) -> CrawlReport {
        let worker_count = self.config.worker_count.max(1);

        let (dispatch_tx, dispatch_rx) = mpsc::channel::<Task>(worker_count);
        let (event_tx, event_rx) = mpsc::unbounded_channel::<CrawlEvent>();
        let dispatch_rx = Arc::new(Mutex::new(dispatch_rx));

        let mut workers = JoinSet::new();
        for id in 0..worker_count {
            let worker = Worker::new(
                id,
                Arc::clone(&self.backend),
                Arc::clone(&dispatch_rx),
                event_tx.clone(),
                self.config.dry_run,
            );
            workers.spawn(worker.run());
        }
        // Only workers hold senders, so the event channel closes when they all exit
        drop(event_tx);

        tracing::info!(
            "Starting crawl at {} with {} workers",
            seed.identifier(),
            worker_count
        );

        let mut scheduler = Scheduler::new(&self.config);
        scheduler.discover(seed);
        let report = scheduler.run(event_rx, dispatch_tx).await;

        let mut attempts = 0;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(count) => attempts += count,
                Err(e) => tracing::error!("Worker task failed: {}", e),
            }
        }

        tracing::info!(
            "Crawl finished: {} attempts across {} workers in {:?}",
            attempts,
            worker_count,
            report.elapsed
        );

        report
    }
}

/// Runs the scheduling engine with a caller-supplied backend
///
/// Returns once every discovered task has either succeeded or exhausted its
/// attempts, and every worker has exited.
pub async fn start_crawl(
    seed: Task,
    config: &CrawlConfig,
    backend: Arc<dyn CrawlBackend>,
) -> CrawlReport {
    Coordinator::new(config.clone(), backend).run(seed).await
}

/// Runs a complete crawl over HTTP
///
/// This is the main entry point for the command-line tool. It will:
/// 1. Parse and canonicalize the seed URL
/// 2. Check the output directory (skipped for dry runs)
/// 3. Build the HTTP backend
/// 4. Run the scheduler and worker pool to exhaustion
///
/// # Errors
///
/// Only setup failures are returned; per-task failures end up in the report.
pub async fn crawl(seed_url: &str, config: &Config) -> Result<CrawlReport, HarvestError> {
    let seed = parse_seed(seed_url)?;
    validate_output_directory(&config.crawler.output_directory, config.crawler.dry_run)?;

    let backend = HttpBackend::new(seed.clone(), &config.crawler, &config.user_agent)?;

    Ok(start_crawl(Task::page(seed), &config.crawler, Arc::new(backend)).await)
}
