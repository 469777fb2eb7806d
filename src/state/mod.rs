//! State module for tracking task progress
//!
//! A task is always in exactly one [`TaskState`]. The scheduler is the only
//! component that moves a task between `Queued` and `InFlight`.

mod task_state;

pub use task_state::TaskState;
