//! Crawler module: the scheduling engine and its HTTP collaborators
//!
//! This module contains the core crawling logic, including:
//! - Tasks, the priority retry queue and the deduplication set
//! - The scheduler and the event protocol it consumes
//! - The bounded worker pool
//! - HTTP fetching, HTML link extraction and leaf downloads
//! - Overall crawl coordination

mod backend;
mod coordinator;
mod dedup;
mod downloader;
mod events;
mod fetcher;
mod parser;
mod queue;
mod scheduler;
mod task;
mod worker;

pub use backend::{CrawlBackend, HttpBackend};
pub use coordinator::{crawl, start_crawl, Coordinator};
pub use dedup::SeenSet;
pub use downloader::{derive_file_name, download_to_directory};
pub use events::CrawlEvent;
pub use fetcher::{build_http_client, fetch_page};
pub use parser::{parse_html, ExtractedLink, LinkKind, ParsedPage};
pub use queue::{PriorityRetryQueue, TaskQueue};
pub use scheduler::Scheduler;
pub use task::{AttemptError, Task};
pub use worker::{DispatchReceiver, Worker};
