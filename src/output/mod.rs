//! Output module for crawl results
//!
//! This module holds the report produced at the end of a crawl and the
//! console summary printed by the command-line tool.

mod report;

pub use report::{print_report, CrawlReport, RetiredTask};
