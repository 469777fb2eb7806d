//! End-of-crawl report
//!
//! The scheduler fills a [`CrawlReport`] as it handles events and hands it
//! back to the caller once all work is exhausted.

use std::time::Duration;

/// A task that used up its retry budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetiredTask {
    /// Canonical URL of the task
    pub identifier: String,

    /// Number of failed attempts
    pub attempts: usize,

    /// The first recorded error, rendered for display
    pub first_error: String,
}

/// Crawl counters
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Tasks admitted into the queue (seed included)
    pub admitted: u64,

    /// Discoveries rejected because the identifier was already seen
    pub duplicates: u64,

    /// Tasks handed to a worker, retries included
    pub dispatched: u64,

    /// Completion events received
    pub completed: u64,

    /// Attempts that succeeded
    pub succeeded: u64,

    /// Failed attempts that were put back in the queue
    pub retried: u64,

    /// Tasks retired after exhausting their attempts
    pub retired_failed: Vec<RetiredTask>,

    /// Highest number of simultaneously in-flight tasks
    pub peak_in_flight: usize,

    /// Tasks left queued or in flight when the worker pool disappeared
    pub abandoned: u64,

    /// Wall time of the crawl
    pub elapsed: Duration,
}

impl CrawlReport {
    /// Number of tasks retired as failed
    pub fn failed(&self) -> usize {
        self.retired_failed.len()
    }

    /// True when every admitted task ended in success
    pub fn is_clean(&self) -> bool {
        self.retired_failed.is_empty() && self.abandoned == 0
    }
}

/// Prints the report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Harvest Summary ===\n");

    println!("Overview:");
    println!("  Tasks admitted: {}", report.admitted);
    println!("  Duplicate discoveries: {}", report.duplicates);
    println!("  Attempts dispatched: {}", report.dispatched);
    println!("  Attempts succeeded: {}", report.succeeded);
    println!("  Retries: {}", report.retried);
    println!("  Peak in flight: {}", report.peak_in_flight);
    println!("  Elapsed: {:.2?}", report.elapsed);
    println!();

    if !report.retired_failed.is_empty() {
        println!("Failed Tasks ({}):", report.retired_failed.len());
        for retired in &report.retired_failed {
            println!(
                "  - {} ({} attempts): {}",
                retired.identifier, retired.attempts, retired.first_error
            );
        }
        println!();
    }

    if report.abandoned > 0 {
        println!("Abandoned tasks: {}", report.abandoned);
        println!();
    }

    let success_rate = if report.admitted > 0 {
        (report.succeeded as f64 / report.admitted as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} tasks)",
        success_rate, report.succeeded, report.admitted
    );
}
