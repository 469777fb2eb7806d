//! Priority retry queue
//!
//! Tasks waiting for a worker live here. The queue is a binary heap driven by
//! a `precedes` predicate rather than `Ord`, because the default policy is
//! not a total order: a task goes first only if it was attempted earlier
//! *and* has fewer errors. Pairs where neither condition set holds keep
//! whatever position the heap gave them, which is deterministic for a given
//! sequence of pushes and pops.

use crate::config::QueueOrder;
use crate::crawler::task::Task;

/// Holding area for tasks awaiting dispatch
pub trait TaskQueue {
    /// Inserts a task in O(log n)
    fn push(&mut self, task: Task);

    /// Removes the highest-priority task in O(log n)
    fn pop(&mut self) -> Option<Task>;

    /// Number of queued tasks in O(1)
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl QueueOrder {
    /// Returns true if `a` must be dispatched before `b`
    pub fn precedes(&self, a: &Task, b: &Task) -> bool {
        match self {
            QueueOrder::Conjunctive => {
                a.last_attempt() < b.last_attempt() && a.error_count() < b.error_count()
            }
            QueueOrder::FewestErrorsFirst => {
                (a.error_count(), a.last_attempt()) < (b.error_count(), b.last_attempt())
            }
        }
    }
}

/// Heap-backed [`TaskQueue`] ordered by a [`QueueOrder`]
#[derive(Debug)]
pub struct PriorityRetryQueue {
    heap: Vec<Task>,
    order: QueueOrder,
}

impl PriorityRetryQueue {
    pub fn new(order: QueueOrder) -> Self {
        Self {
            heap: Vec::new(),
            order,
        }
    }

    pub fn order(&self) -> QueueOrder {
        self.order
    }

    fn less(&self, i: usize, j: usize) -> bool {
        self.order.precedes(&self.heap[i], &self.heap[j])
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.heap.swap(i, j);
        self.heap[i].queue_position = Some(i);
        self.heap[j].queue_position = Some(j);
    }

    fn sift_up(&mut self, mut child: usize) {
        while child > 0 {
            let parent = (child - 1) / 2;
            if !self.less(child, parent) {
                break;
            }
            self.swap(parent, child);
            child = parent;
        }
    }

    fn sift_down(&mut self, mut parent: usize, len: usize) {
        loop {
            let left = 2 * parent + 1;
            if left >= len {
                break;
            }

            let mut best = left;
            let right = left + 1;
            if right < len && self.less(right, left) {
                best = right;
            }

            if !self.less(best, parent) {
                break;
            }
            self.swap(parent, best);
            parent = best;
        }
    }
}

impl Default for PriorityRetryQueue {
    fn default() -> Self {
        Self::new(QueueOrder::default())
    }
}

impl TaskQueue for PriorityRetryQueue {
    fn push(&mut self, mut task: Task) {
        let index = self.heap.len();
        task.queue_position = Some(index);
        self.heap.push(task);
        self.sift_up(index);
    }

    fn pop(&mut self) -> Option<Task> {
        let last = self.heap.len().checked_sub(1)?;
        self.swap(0, last);
        self.sift_down(0, last);

        let mut task = self.heap.pop()?;
        task.queue_position = None;
        Some(task)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}
