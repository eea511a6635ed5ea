//! Collaborator traits defined in `toolbox-core` and implemented by other crates.

pub mod scheduler;
pub mod storage;

pub use scheduler::{DelayedTaskScheduler, ScheduledAction, TaskOutcome};
pub use storage::StorageProvider;
