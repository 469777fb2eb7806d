//! Messages sent from workers to the scheduler
//!
//! All three kinds travel over one channel. A worker sends the events of one
//! attempt in a fixed order (discoveries, then the failure if any, then the
//! completion), so the scheduler always sees a task's follow-up work before
//! it sees that task complete.

use crate::crawler::task::Task;

/// Event consumed by the scheduler
#[derive(Debug)]
pub enum CrawlEvent {
    /// A task found while processing a page
    Discovered(Task),

    /// A dispatched task whose attempt errored; ownership returns to the scheduler
    Failed(Task),

    /// Sent exactly once per dispatch, whatever the outcome
    Completed { identifier: String, succeeded: bool },
}

impl CrawlEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            CrawlEvent::Discovered(_) => "discovered",
            CrawlEvent::Failed(_) => "failed",
            CrawlEvent::Completed { .. } => "completed",
        }
    }
}
