//! Deduplication set
//!
//! Records every identifier the scheduler has ever admitted. Only the
//! scheduler task touches it, so there is no locking.

use std::collections::HashSet;

/// Set of identifiers admitted during this crawl
#[derive(Debug, Default)]
pub struct SeenSet {
    seen: HashSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `identifier` and returns true if it was not seen before
    ///
    /// Returns false without mutating the set for duplicates.
    pub fn admit(&mut self, identifier: &str) -> bool {
        self.seen.insert(identifier.to_owned())
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.seen.contains(identifier)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
