//! Delayed execution collaborator.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;

use crate::result::AppResult;

/// What a scheduled action reports back after running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The work is finished; the task is dropped.
    Completed,
    /// The work is not due yet; run again at or after the given instant.
    Reschedule(DateTime<Utc>),
}

/// Work executed by a [`DelayedTaskScheduler`].
///
/// The action may run more than once (late firing, retries after an
/// error), so it must be idempotent.
pub type ScheduledAction = Arc<dyn Fn() -> BoxFuture<'static, AppResult<TaskOutcome>> + Send + Sync>;

/// Runs an action at or after a deadline, at least once.
pub trait DelayedTaskScheduler: Send + Sync + std::fmt::Debug + 'static {
    /// Arrange for `action` to run once `deadline` has passed.
    ///
    /// Registering the same `task_id` again supersedes the earlier
    /// registration. Fire-and-forget: failures are handled by the
    /// scheduler's retry policy, not reported to the caller.
    fn after(&self, task_id: String, deadline: DateTime<Utc>, action: ScheduledAction);

    /// Number of tasks that have not completed yet.
    fn pending(&self) -> usize;
}
